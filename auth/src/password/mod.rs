pub mod errors;
pub mod hasher;
pub mod salt;

pub use errors::PasswordError;
pub use hasher::Credential;
pub use hasher::PasswordHasher;
pub use hasher::DEFAULT_COST;
pub use salt::Salt;

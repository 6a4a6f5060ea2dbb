pub mod claims;
pub mod clock;
pub mod errors;
pub mod expiry;
pub mod handler;

pub use claims::Claims;
pub use claims::TokenClaims;
pub use clock::Clock;
pub use clock::SystemClock;
pub use errors::JwtError;
pub use expiry::ExpiresIn;
pub use handler::JwtHandler;
pub use handler::DEFAULT_SECRET;

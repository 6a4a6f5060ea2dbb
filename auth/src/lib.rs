//! Authentication utilities library
//!
//! Provides the authentication primitives used by the identity service:
//! - Password hashing (bcrypt with persisted salt strings)
//! - JWT access token issuance and verification
//! - Route visibility declarations
//! - The request guard combining the two
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(4);
//! let credential = hasher.hash_password("my_password").unwrap();
//! let is_valid = hasher
//!     .verify("my_password", &credential.salt, &credential.hash)
//!     .unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{ExpiresIn, JwtHandler, TokenClaims};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", "1h".parse().unwrap());
//! let claims = TokenClaims::new("subject-id", "alice");
//! let token = handler.issue(&claims).unwrap();
//! assert_eq!(handler.verify(&token).unwrap(), claims);
//! # let _ = ExpiresIn::default();
//! ```
//!
//! ## Guarding Routes
//! ```
//! use std::sync::Arc;
//!
//! use auth::{AuthGuard, ExpiresIn, GuardOutcome, JwtHandler, RouteKey, Visibility, VisibilityTable};
//!
//! let table = VisibilityTable::builder()
//!     .group("health", Some(Visibility::Public))
//!     .route("health", RouteKey::new("GET", "/health"), None)
//!     .build();
//! let jwt = Arc::new(JwtHandler::new(b"secret_key_at_least_32_bytes_long!", ExpiresIn::default()));
//! let guard = AuthGuard::new(Arc::new(table), jwt);
//!
//! assert!(guard.evaluate(&RouteKey::new("GET", "/health"), None).is_allowed());
//! assert!(!guard.evaluate(&RouteKey::new("GET", "/private"), None).is_allowed());
//! ```

pub mod guard;
pub mod jwt;
pub mod password;
pub mod visibility;

// Re-export commonly used items
pub use guard::AuthGuard;
pub use guard::GuardOutcome;
pub use guard::RejectionReason;
pub use jwt::Clock;
pub use jwt::ExpiresIn;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SystemClock;
pub use jwt::TokenClaims;
pub use password::Credential;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use visibility::RouteKey;
pub use visibility::Visibility;
pub use visibility::VisibilityTable;
pub use visibility::VisibilityTableBuilder;

use async_trait::async_trait;
use auth::Credential;
use auth::PasswordError;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::NewPrincipal;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::SignInCommand;
use crate::domain::principal::models::SignInResult;
use crate::domain::principal::models::Subject;
use crate::domain::principal::models::Username;

/// Port for principal domain service operations.
#[async_trait]
pub trait PrincipalServicePort: Send + Sync + 'static {
    /// Verify a username and password and issue an access token.
    ///
    /// # Arguments
    /// * `command` - Raw username and plaintext password
    ///
    /// # Returns
    /// Access token for the principal
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (indistinguishable)
    /// * `Password` - Stored credential is unusable
    /// * `Token` - Token issuance failed
    /// * `DatabaseError` - Database operation failed
    async fn sign_in(&self, command: SignInCommand) -> Result<SignInResult, PrincipalError>;

    /// Register a new principal.
    ///
    /// Does not sign the principal in.
    ///
    /// # Arguments
    /// * `command` - Validated names, email, username and plaintext password
    ///
    /// # Returns
    /// Created principal entity
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Principal, PrincipalError>;

    /// Retrieve principal by subject.
    ///
    /// # Errors
    /// * `NotFound` - No principal with this subject
    /// * `DatabaseError` - Database operation failed
    async fn get_by_subject(&self, sub: &Subject) -> Result<Principal, PrincipalError>;
}

/// Persistence operations for the principal aggregate.
///
/// Implementations own uniqueness of `username` and `sub`.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + 'static {
    /// Persist new principal to storage.
    ///
    /// # Arguments
    /// * `principal` - Fields of the principal to create
    ///
    /// # Returns
    /// Created principal with store-assigned id and timestamps
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, principal: NewPrincipal) -> Result<Principal, PrincipalError>;

    /// Retrieve principal by username.
    ///
    /// # Returns
    /// Optional principal entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Principal>, PrincipalError>;

    /// Retrieve principal by subject.
    ///
    /// # Returns
    /// Optional principal entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_subject(&self, sub: &Subject) -> Result<Option<Principal>, PrincipalError>;
}

/// Password hashing used by the authentication flows.
///
/// Implementations are expected to keep the CPU-heavy work off the async
/// executor threads.
#[async_trait]
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hash a plaintext password with a fresh salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    async fn hash_password(&self, password: String) -> Result<Credential, PasswordError>;

    /// Check a plaintext password against a stored credential.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `InvalidSalt` - Stored salt is malformed
    /// * `HashingFailed` - Hashing operation failed
    async fn verify(&self, password: String, credential: Credential)
        -> Result<bool, PasswordError>;
}

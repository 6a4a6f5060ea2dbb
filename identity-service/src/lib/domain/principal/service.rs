use std::sync::Arc;

use async_trait::async_trait;
use auth::Credential;
use auth::JwtHandler;
use auth::TokenClaims;
use tokio::sync::OnceCell;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::NewPrincipal;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::SignInCommand;
use crate::domain::principal::models::SignInResult;
use crate::domain::principal::models::Subject;
use crate::domain::principal::models::Username;
use crate::domain::principal::ports::CredentialHasher;
use crate::domain::principal::ports::PrincipalRepository;
use crate::domain::principal::ports::PrincipalServicePort;

/// Domain service implementation for sign-in and registration.
///
/// Concrete implementation of PrincipalServicePort with dependency injection.
pub struct PrincipalService<PR, CH>
where
    PR: PrincipalRepository,
    CH: CredentialHasher,
{
    repository: Arc<PR>,
    credential_hasher: Arc<CH>,
    jwt_handler: Arc<JwtHandler>,
    decoy_credential: OnceCell<Credential>,
}

/// Plaintext behind the decoy credential. Never stored.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-usernames";

impl<PR, CH> PrincipalService<PR, CH>
where
    PR: PrincipalRepository,
    CH: CredentialHasher,
{
    /// Create a new principal service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Principal persistence implementation
    /// * `credential_hasher` - Password hashing implementation
    /// * `jwt_handler` - Access token issuer
    ///
    /// # Returns
    /// Configured principal service instance
    pub fn new(
        repository: Arc<PR>,
        credential_hasher: Arc<CH>,
        jwt_handler: Arc<JwtHandler>,
    ) -> Self {
        Self {
            repository,
            credential_hasher,
            jwt_handler,
            decoy_credential: OnceCell::new(),
        }
    }

    /// Run one password verification against a throwaway credential.
    ///
    /// Sign-in for an unknown username then costs the same bcrypt work as a
    /// wrong password. The decoy is hashed once, at the configured cost.
    async fn verify_decoy(&self, password: String) {
        let decoy = self
            .decoy_credential
            .get_or_try_init(|| {
                self.credential_hasher
                    .hash_password(DECOY_PASSWORD.to_string())
            })
            .await;

        match decoy {
            Ok(credential) => {
                let _ = self
                    .credential_hasher
                    .verify(password, credential.clone())
                    .await;
            }
            Err(e) => tracing::warn!(error = %e, "Decoy credential unavailable"),
        }
    }

    async fn find_for_sign_in(
        &self,
        username: String,
    ) -> Result<Option<Principal>, PrincipalError> {
        match Username::new(username) {
            Ok(username) => self.repository.find_by_username(&username).await,
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl<PR, CH> PrincipalServicePort for PrincipalService<PR, CH>
where
    PR: PrincipalRepository,
    CH: CredentialHasher,
{
    async fn sign_in(&self, command: SignInCommand) -> Result<SignInResult, PrincipalError> {
        let Some(principal) = self.find_for_sign_in(command.username).await? else {
            self.verify_decoy(command.password).await;
            tracing::debug!(reason = "unknown_username", "Sign-in rejected");
            return Err(PrincipalError::InvalidCredentials);
        };

        let is_valid = self
            .credential_hasher
            .verify(command.password, principal.credential.clone())
            .await?;

        if !is_valid {
            tracing::debug!(sub = %principal.sub, reason = "wrong_password", "Sign-in rejected");
            return Err(PrincipalError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.issue(&TokenClaims::new(
            principal.sub,
            principal.username.as_str(),
        ))?;

        tracing::info!(sub = %principal.sub, "Principal signed in");

        Ok(SignInResult { access_token })
    }

    async fn register(&self, command: RegisterCommand) -> Result<Principal, PrincipalError> {
        let credential = self
            .credential_hasher
            .hash_password(command.password)
            .await?;

        let new_principal = NewPrincipal {
            sub: Subject::generate(),
            username: command.username,
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            credential,
        };

        let created = self.repository.create(new_principal).await?;

        tracing::info!(
            sub = %created.sub,
            username = %created.username,
            "Principal registered"
        );

        Ok(created)
    }

    async fn get_by_subject(&self, sub: &Subject) -> Result<Principal, PrincipalError> {
        self.repository
            .find_by_subject(sub)
            .await?
            .ok_or(PrincipalError::NotFound(sub.to_string()))
    }
}

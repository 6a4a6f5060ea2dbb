use async_trait::async_trait;
use auth::Credential;
use auth::PasswordError;
use auth::PasswordHasher;

use crate::domain::principal::ports::CredentialHasher;

/// bcrypt-backed credential hasher.
///
/// Each hash or verification runs on tokio's blocking pool so that the key
/// expansion does not stall the async worker threads.
#[derive(Debug, Clone, Copy)]
pub struct BcryptCredentialHasher {
    hasher: PasswordHasher,
}

impl BcryptCredentialHasher {
    /// # Arguments
    /// * `cost` - bcrypt cost factor used for newly generated salts
    pub fn new(cost: u32) -> Self {
        Self {
            hasher: PasswordHasher::with_cost(cost),
        }
    }
}

impl Default for BcryptCredentialHasher {
    fn default() -> Self {
        Self {
            hasher: PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl CredentialHasher for BcryptCredentialHasher {
    async fn hash_password(&self, password: String) -> Result<Credential, PasswordError> {
        let hasher = self.hasher;

        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(
        &self,
        password: String,
        credential: Credential,
    ) -> Result<bool, PasswordError> {
        let hasher = self.hasher;

        tokio::task::spawn_blocking(move || {
            hasher.verify(&password, &credential.salt, &credential.hash)
        })
        .await
        .map_err(|e| PasswordError::HashingFailed(format!("Verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_off_thread() {
        let hasher = BcryptCredentialHasher::new(4);

        let credential = hasher
            .hash_password("password123".to_string())
            .await
            .expect("Failed to hash password");

        assert!(credential.salt.starts_with("$2b$04$"));
        assert!(hasher
            .verify("password123".to_string(), credential.clone())
            .await
            .expect("Failed to verify password"));
        assert!(!hasher
            .verify("password124".to_string(), credential)
            .await
            .expect("Failed to verify password"));
    }

    #[tokio::test]
    async fn test_verify_reuses_stored_salt() {
        let hasher = BcryptCredentialHasher::new(4);
        let salt = PasswordHasher::with_cost(4).generate_salt();
        let hash = PasswordHasher::with_cost(4)
            .hash("password123", &salt)
            .unwrap();

        let is_valid = hasher
            .verify("password123".to_string(), Credential { salt, hash })
            .await
            .expect("Failed to verify password");

        assert!(is_valid);
    }

    #[tokio::test]
    async fn test_verify_malformed_salt() {
        let hasher = BcryptCredentialHasher::new(4);

        let result = hasher
            .verify(
                "password123".to_string(),
                Credential {
                    salt: "test-salt".to_string(),
                    hash: "whatever".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(PasswordError::InvalidSalt(_))));
    }
}

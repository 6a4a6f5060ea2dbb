use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::NewPrincipal;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::Subject;
use crate::domain::principal::models::Username;
use crate::domain::principal::ports::PrincipalRepository;

/// Process-local principal store.
///
/// Used when no database is configured and by the HTTP integration tests.
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryPrincipalRepository {
    principals: RwLock<HashMap<Subject, Principal>>,
}

impl InMemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalRepository {
    async fn create(&self, principal: NewPrincipal) -> Result<Principal, PrincipalError> {
        // Uniqueness check and insert happen under one write lock.
        let mut principals = self.principals.write().await;

        if principals
            .values()
            .any(|existing| existing.username == principal.username)
        {
            return Err(PrincipalError::DuplicateUsername(
                principal.username.as_str().to_string(),
            ));
        }

        if principals.contains_key(&principal.sub) {
            return Err(PrincipalError::DatabaseError(format!(
                "Subject already exists: {}",
                principal.sub
            )));
        }

        let now = Utc::now();
        let created = Principal {
            id: PrincipalId::new(),
            sub: principal.sub,
            username: principal.username,
            first_name: principal.first_name,
            last_name: principal.last_name,
            email: principal.email,
            credential: principal.credential,
            created_at: now,
            updated_at: now,
        };
        principals.insert(created.sub, created.clone());

        Ok(created)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Principal>, PrincipalError> {
        let principals = self.principals.read().await;

        Ok(principals
            .values()
            .find(|principal| &principal.username == username)
            .cloned())
    }

    async fn find_by_subject(&self, sub: &Subject) -> Result<Option<Principal>, PrincipalError> {
        Ok(self.principals.read().await.get(sub).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use auth::Credential;

    use super::*;
    use crate::domain::principal::models::EmailAddress;
    use crate::domain::principal::models::PersonName;

    fn new_principal(username: &str) -> NewPrincipal {
        NewPrincipal {
            sub: Subject::generate(),
            username: Username::new(username.to_string()).unwrap(),
            first_name: PersonName::new("John".to_string()).unwrap(),
            last_name: PersonName::new("Doe".to_string()).unwrap(),
            email: EmailAddress::new("john@example.com".to_string()).unwrap(),
            credential: Credential {
                salt: "test-salt".to_string(),
                hash: "test-hash".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryPrincipalRepository::new();

        let created = repository
            .create(new_principal("johndoe"))
            .await
            .expect("Failed to create principal");

        let by_username = repository
            .find_by_username(&created.username)
            .await
            .unwrap();
        assert_eq!(by_username, Some(created.clone()));

        let by_subject = repository.find_by_subject(&created.sub).await.unwrap();
        assert_eq!(by_subject, Some(created));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repository = InMemoryPrincipalRepository::new();

        let username = Username::new("nobody".to_string()).unwrap();
        assert_eq!(repository.find_by_username(&username).await.unwrap(), None);
        assert_eq!(
            repository
                .find_by_subject(&Subject::generate())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let repository = InMemoryPrincipalRepository::new();

        repository.create(new_principal("johndoe")).await.unwrap();
        let result = repository.create(new_principal("johndoe")).await;

        assert!(matches!(result, Err(PrincipalError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_with_same_username() {
        let repository = Arc::new(InMemoryPrincipalRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.create(new_principal("johndoe")).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(PrincipalError::DuplicateUsername(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
    }
}

use async_trait::async_trait;
use auth::Credential;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::NewPrincipal;
use crate::domain::principal::models::PersonName;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::Subject;
use crate::domain::principal::models::Username;
use crate::domain::principal::ports::PrincipalRepository;

const USERNAME_CONSTRAINT: &str = "principals_username_key";

pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    sub: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    password_salt: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = PrincipalError;

    fn try_from(r: PrincipalRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(r.id),
            sub: Subject(r.sub),
            username: Username::new(r.username)?,
            first_name: PersonName::new(r.first_name)?,
            last_name: PersonName::new(r.last_name)?,
            email: EmailAddress::new(r.email)?,
            credential: Credential {
                salt: r.password_salt,
                hash: r.password_hash,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn create(&self, principal: NewPrincipal) -> Result<Principal, PrincipalError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            INSERT INTO principals (sub, username, first_name, last_name, email, password_salt, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sub, username, first_name, last_name, email, password_salt, password_hash, created_at, updated_at
            "#,
        )
        .bind(principal.sub.0)
        .bind(principal.username.as_str())
        .bind(principal.first_name.as_str())
        .bind(principal.last_name.as_str())
        .bind(principal.email.as_str())
        .bind(&principal.credential.salt)
        .bind(&principal.credential.hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_CONSTRAINT)
                {
                    return PrincipalError::DuplicateUsername(
                        principal.username.as_str().to_string(),
                    );
                }
            }
            PrincipalError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Principal>, PrincipalError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, sub, username, first_name, last_name, email, password_salt, password_hash, created_at, updated_at
            FROM principals
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PrincipalError::DatabaseError(e.to_string()))?;

        row.map(Principal::try_from).transpose()
    }

    async fn find_by_subject(&self, sub: &Subject) -> Result<Option<Principal>, PrincipalError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, sub, username, first_name, last_name, email, password_salt, password_hash, created_at, updated_at
            FROM principals
            WHERE sub = $1
            "#,
        )
        .bind(sub.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PrincipalError::DatabaseError(e.to_string()))?;

        row.map(Principal::try_from).transpose()
    }
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::PersonName;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Username;
use crate::inbound::http::router::AppState;

/// Register a new principal. The response never carries the credential.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .principal_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::CREATED, principal.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    first_name: String,
    last_name: String,
    email: String,
    username: String,
    password: String,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let first_name = PersonName::new(self.first_name).map_err(PrincipalError::from)?;
        let last_name = PersonName::new(self.last_name).map_err(PrincipalError::from)?;
        let email = EmailAddress::new(self.email).map_err(PrincipalError::from)?;
        let username = Username::new(self.username).map_err(PrincipalError::from)?;

        if self.password.is_empty() {
            return Err(ApiError::UnprocessableEntity(
                "Password must not be empty".to_string(),
            ));
        }

        Ok(RegisterCommand::new(
            first_name,
            last_name,
            email,
            username,
            self.password,
        ))
    }
}

/// Public view of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalData {
    pub id: String,
    pub sub: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            sub: principal.sub.to_string(),
            username: principal.username.as_str().to_string(),
            first_name: principal.first_name.as_str().to_string(),
            last_name: principal.last_name.as_str().to_string(),
            email: principal.email.as_str().to_string(),
            created_at: principal.created_at,
            updated_at: principal.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(username: &str, password: &str) -> RegisterRequestBody {
        RegisterRequestBody {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@example.com".to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_body_becomes_command() {
        let command = body("johndoe", "password").try_into_command().unwrap();

        assert_eq!(command.username.as_str(), "johndoe");
        assert_eq!(command.password, "password");
    }

    #[test]
    fn test_invalid_fields_are_unprocessable() {
        assert!(matches!(
            body("j d", "password").try_into_command(),
            Err(ApiError::UnprocessableEntity(_))
        ));
        assert_eq!(
            body("johndoe", "").try_into_command().unwrap_err(),
            ApiError::UnprocessableEntity("Password must not be empty".to_string())
        );
    }
}

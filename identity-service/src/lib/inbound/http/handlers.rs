use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::principal::errors::PrincipalError;

pub mod get_principal;
pub mod get_profile;
pub mod health;
pub mod register;
pub mod sign_in;

/// Message returned for every failed sign-in, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Message returned when the guard rejects a request.
pub const UNAUTHORIZED: &str = "Unauthorized";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<PrincipalError> for ApiError {
    fn from(err: PrincipalError) -> Self {
        match err {
            PrincipalError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            PrincipalError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PrincipalError::DuplicateUsername(_) => ApiError::Conflict(err.to_string()),
            PrincipalError::InvalidId(_)
            | PrincipalError::InvalidUsername(_)
            | PrincipalError::InvalidEmail(_)
            | PrincipalError::InvalidName(_) => ApiError::UnprocessableEntity(err.to_string()),
            PrincipalError::Password(_)
            | PrincipalError::Token(_)
            | PrincipalError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use auth::JwtError;
    use auth::PasswordError;

    use super::*;
    use crate::domain::principal::errors::UsernameError;

    #[test]
    fn test_invalid_credentials_maps_to_generic_unauthorized() {
        assert_eq!(
            ApiError::from(PrincipalError::InvalidCredentials),
            ApiError::Unauthorized("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_domain_errors_map_to_status() {
        assert!(matches!(
            ApiError::from(PrincipalError::DuplicateUsername("johndoe".to_string())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(PrincipalError::NotFound("x".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(PrincipalError::InvalidUsername(
                UsernameError::InvalidCharacters
            )),
            ApiError::UnprocessableEntity(_)
        ));
    }

    #[test]
    fn test_internal_errors_do_not_leak_details() {
        let errors = [
            PrincipalError::Password(PasswordError::InvalidSalt("bad".to_string())),
            PrincipalError::Token(JwtError::EncodingFailed("bad key".to_string())),
            PrincipalError::DatabaseError("connection refused".to_string()),
        ];

        for err in errors {
            assert_eq!(
                ApiError::from(err),
                ApiError::InternalServerError("Internal server error".to_string())
            );
        }
    }

    #[test]
    fn test_error_body_envelope() {
        let body = ApiResponseBody::new_error(StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "status_code": 401, "data": { "message": "Unauthorized" } })
        );
    }
}

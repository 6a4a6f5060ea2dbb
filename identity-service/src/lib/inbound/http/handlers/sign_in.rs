use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::models::SignInCommand;
use crate::inbound::http::router::AppState;

/// Exchange a username and password for an access token.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequestBody>,
) -> Result<ApiSuccess<SignInResponseData>, ApiError> {
    let command = SignInCommand::new(body.username, body.password);

    state
        .principal_service
        .sign_in(command)
        .await
        .map_err(ApiError::from)
        .map(|result| {
            ApiSuccess::new(
                StatusCode::OK,
                SignInResponseData {
                    access_token: result.access_token,
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInRequestBody {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInResponseData {
    pub access_token: String,
}

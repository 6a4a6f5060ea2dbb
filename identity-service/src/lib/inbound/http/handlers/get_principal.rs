use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::register::PrincipalData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::models::Subject;
use crate::inbound::http::router::AppState;

pub async fn get_principal(
    State(state): State<AppState>,
    Path(sub): Path<String>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    let sub = Subject::from_string(&sub).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .principal_service
        .get_by_subject(&sub)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::register::PrincipalData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::principal::models::Subject;
use crate::inbound::http::middleware::AuthenticatedPrincipal;
use crate::inbound::http::router::AppState;

/// Profile of the principal named by the verified token.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedPrincipal>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    let sub = Subject::from_string(&authenticated.claims.sub)
        .map_err(|_| ApiError::Unauthorized(super::UNAUTHORIZED.to_string()))?;

    state
        .principal_service
        .get_by_subject(&sub)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}

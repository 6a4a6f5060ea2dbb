use auth::GuardOutcome;
use auth::RouteKey;
use auth::TokenClaims;
use axum::extract::MatchedPath;
use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use super::handlers::UNAUTHORIZED;
use crate::inbound::http::router::AppState;

/// Extension type carrying the verified token identity into handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub claims: TokenClaims,
}

/// Middleware that runs the authentication guard on every request
///
/// Public routes pass through untouched. Protected routes need a valid bearer
/// token, whose identity is added to the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let route = route_key(&req);
    let authorization = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.guard.evaluate(&route, authorization) {
        GuardOutcome::Allowed { principal } => {
            if let Some(claims) = principal {
                tracing::debug!(sub = %claims.sub, route = %route, "Request authenticated");
                req.extensions_mut()
                    .insert(AuthenticatedPrincipal { claims });
            }
            Ok(next.run(req).await)
        }
        GuardOutcome::Rejected(reason) => {
            tracing::warn!(route = %route, reason = %reason, "Request rejected");
            Err(ApiError::Unauthorized(UNAUTHORIZED.to_string()))
        }
    }
}

/// Key of the matched route template, or of the raw path when nothing matched
///
/// HEAD is served by the GET handler, so it shares the GET declaration.
fn route_key(req: &Request) -> RouteKey {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let method = if req.method() == Method::HEAD {
        Method::GET
    } else {
        req.method().clone()
    };

    RouteKey::new(method.as_str(), path)
}

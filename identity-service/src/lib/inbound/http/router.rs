use std::sync::Arc;
use std::time::Duration;

use auth::AuthGuard;
use auth::JwtHandler;
use auth::RouteKey;
use auth::Visibility;
use auth::VisibilityTable;
use auth::VisibilityTableBuilder;
use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::MethodRouter;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_principal::get_principal;
use super::handlers::get_profile::get_profile;
use super::handlers::health::health;
use super::handlers::register::register;
use super::handlers::sign_in::sign_in;
use super::middleware::authenticate as auth_middleware;
use crate::domain::principal::ports::PrincipalServicePort;

#[derive(Clone)]
pub struct AppState {
    pub principal_service: Arc<dyn PrincipalServicePort>,
    pub guard: Arc<AuthGuard>,
}

/// Routes together with their visibility declarations.
///
/// Every route is registered in the router and in the visibility table at the
/// same time, so the guard sees exactly the routes that are served.
struct RouteRegistry {
    router: Router<AppState>,
    visibility: VisibilityTableBuilder,
}

impl RouteRegistry {
    fn new() -> Self {
        Self {
            router: Router::new(),
            visibility: VisibilityTable::builder(),
        }
    }

    fn group(mut self, name: &str, visibility: Option<Visibility>) -> Self {
        self.visibility = self.visibility.group(name, visibility);
        self
    }

    fn route(
        mut self,
        group: &str,
        method: Method,
        path: &str,
        handler: MethodRouter<AppState>,
        visibility: Option<Visibility>,
    ) -> Self {
        self.router = self.router.route(path, handler);
        self.visibility =
            self.visibility
                .route(group, RouteKey::new(method.as_str(), path), visibility);
        self
    }

    fn finish(self) -> (Router<AppState>, VisibilityTable) {
        (self.router, self.visibility.build())
    }
}

fn routes() -> (Router<AppState>, VisibilityTable) {
    RouteRegistry::new()
        .group("auth", Some(Visibility::Public))
        .route("auth", Method::POST, "/api/auth/sign-in", post(sign_in), None)
        .route("auth", Method::POST, "/api/auth/register", post(register), None)
        .route(
            "auth",
            Method::GET,
            "/api/auth/profile",
            get(get_profile),
            Some(Visibility::Protected),
        )
        .group("principals", None)
        .route(
            "principals",
            Method::GET,
            "/api/principals/:sub",
            get(get_principal),
            None,
        )
        .group("health", Some(Visibility::Public))
        .route("health", Method::GET, "/api/health", get(health), None)
        .finish()
}

pub fn create_router(
    principal_service: Arc<dyn PrincipalServicePort>,
    jwt_handler: Arc<JwtHandler>,
) -> Router {
    let (routes, visibility) = routes();
    tracing::debug!(routes = visibility.len(), "Route visibility table built");

    let state = AppState {
        principal_service,
        guard: Arc::new(AuthGuard::new(Arc::new(visibility), jwt_handler)),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str);

            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                matched_path,
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    // Applied with `layer` rather than `route_layer` so that unmatched paths
    // are guarded too.
    routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use auth::ExpiresIn;
    use auth::TokenClaims;
    use axum::http::header;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::principal::service::PrincipalService;
    use crate::outbound::repositories::InMemoryPrincipalRepository;
    use crate::outbound::BcryptCredentialHasher;

    const SECRET: &[u8] = b"router-test-secret";

    fn app() -> (Router, Arc<JwtHandler>) {
        let jwt_handler = Arc::new(JwtHandler::new(SECRET, ExpiresIn::default()));
        let service = PrincipalService::new(
            Arc::new(InMemoryPrincipalRepository::new()),
            Arc::new(BcryptCredentialHasher::new(4)),
            Arc::clone(&jwt_handler),
        );

        (create_router(Arc::new(service), Arc::clone(&jwt_handler)), jwt_handler)
    }

    fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_visibility_declarations() {
        let (_, table) = routes();

        assert_eq!(table.len(), 5);
        assert!(table.is_public(&RouteKey::new("POST", "/api/auth/sign-in")));
        assert!(table.is_public(&RouteKey::new("POST", "/api/auth/register")));
        assert!(table.is_public(&RouteKey::new("GET", "/api/health")));
        assert!(!table.is_public(&RouteKey::new("GET", "/api/auth/profile")));
        assert!(!table.is_public(&RouteKey::new("GET", "/api/principals/:sub")));
    }

    #[tokio::test]
    async fn test_public_route_needs_no_token() {
        let (app, _) = app();

        let response = app
            .oneshot(request(Method::GET, "/api/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_on_public_route_needs_no_token() {
        let (app, _) = app();

        let response = app
            .oneshot(request(Method::HEAD, "/api/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_on_protected_route_needs_token() {
        let (app, _) = app();

        let response = app
            .oneshot(request(Method::HEAD, "/api/auth/profile", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_missing_token() {
        let (app, _) = app();

        let response = app
            .oneshot(request(Method::GET, "/api/auth/profile", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_protected() {
        let (app, jwt_handler) = app();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/unknown", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = jwt_handler
            .issue(&TokenClaims::new("some-sub", "someone"))
            .unwrap();
        let response = app
            .oneshot(request(Method::GET, "/api/unknown", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_unmarked_group() {
        let (app, jwt_handler) = app();
        let token = jwt_handler
            .issue(&TokenClaims::new(uuid::Uuid::new_v4(), "someone"))
            .unwrap();

        let response = app
            .oneshot(request(
                Method::GET,
                &format!("/api/principals/{}", uuid::Uuid::new_v4()),
                Some(&token),
            ))
            .await
            .unwrap();

        // Past the guard, the subject simply does not exist.
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Request-time access decision.
//!
//! The guard only produces an outcome; turning a rejection into a response is
//! left to the HTTP layer, which must not reveal the [`RejectionReason`].

use std::fmt;
use std::sync::Arc;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenClaims;
use crate::visibility::RouteKey;
use crate::visibility::VisibilityTable;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// No usable `Authorization: Bearer <token>` header
    MissingToken,
    /// Token failed signature, format or expiry checks
    InvalidToken(JwtError),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingToken => write!(f, "missing bearer token"),
            RejectionReason::InvalidToken(e) => write!(f, "invalid token: {}", e),
        }
    }
}

/// Result of evaluating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Request may proceed. `principal` is set when a token was verified,
    /// and `None` for public routes.
    Allowed { principal: Option<TokenClaims> },
    Rejected(RejectionReason),
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardOutcome::Allowed { .. })
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Only `Bearer <token>` is accepted: case-sensitive scheme, one space, and
/// a non-empty token. The token ends at the next space.
pub fn extract_bearer_token(authorization: Option<&str>) -> Option<&str> {
    let token = authorization?
        .strip_prefix(BEARER_PREFIX)?
        .split(' ')
        .next()?;

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Global authentication guard.
///
/// Consults the visibility table for the matched route and, for protected
/// routes, verifies the bearer token.
pub struct AuthGuard {
    visibility: Arc<VisibilityTable>,
    jwt_handler: Arc<JwtHandler>,
}

impl AuthGuard {
    /// Create a guard.
    ///
    /// # Arguments
    /// * `visibility` - Route visibility declarations collected at startup
    /// * `jwt_handler` - Token verifier
    pub fn new(visibility: Arc<VisibilityTable>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            visibility,
            jwt_handler,
        }
    }

    pub fn visibility(&self) -> &VisibilityTable {
        &self.visibility
    }

    /// Decide whether a request may proceed.
    ///
    /// # Arguments
    /// * `route` - Matched route
    /// * `authorization` - Raw `Authorization` header value, if present
    ///
    /// # Returns
    /// `Allowed` with the verified identity (or none for public routes),
    /// or `Rejected` with the reason
    pub fn evaluate(&self, route: &RouteKey, authorization: Option<&str>) -> GuardOutcome {
        if self.visibility.is_public(route) {
            return GuardOutcome::Allowed { principal: None };
        }

        let Some(token) = extract_bearer_token(authorization) else {
            return GuardOutcome::Rejected(RejectionReason::MissingToken);
        };

        match self.jwt_handler.verify(token) {
            Ok(claims) => GuardOutcome::Allowed {
                principal: Some(claims),
            },
            Err(e) => GuardOutcome::Rejected(RejectionReason::InvalidToken(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicI64;
    use std::sync::atomic::Ordering;

    use chrono::DateTime;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::jwt::Clock;
    use crate::jwt::ExpiresIn;
    use crate::visibility::Visibility;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn guard() -> (AuthGuard, Arc<JwtHandler>) {
        let table = VisibilityTable::builder()
            .group("auth", Some(Visibility::Public))
            .route("auth", RouteKey::new("POST", "/api/auth/sign-in"), None)
            .route(
                "auth",
                RouteKey::new("GET", "/api/auth/profile"),
                Some(Visibility::Protected),
            )
            .build();
        let jwt_handler = Arc::new(JwtHandler::new(SECRET, ExpiresIn::default()));

        (
            AuthGuard::new(Arc::new(table), Arc::clone(&jwt_handler)),
            jwt_handler,
        )
    }

    struct SteppedClock(AtomicI64);

    impl Clock for SteppedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(self.0.load(Ordering::SeqCst), 0).unwrap()
        }
    }

    fn profile() -> RouteKey {
        RouteKey::new("GET", "/api/auth/profile")
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(Some("Bearer abc def")), Some("abc"));
        assert_eq!(extract_bearer_token(None), None);
        assert_eq!(extract_bearer_token(Some("")), None);
        assert_eq!(extract_bearer_token(Some("Token abc")), None);
        assert_eq!(extract_bearer_token(Some("Bearer")), None);
        assert_eq!(extract_bearer_token(Some("Bearer ")), None);
        assert_eq!(extract_bearer_token(Some("Bearer  abc")), None);
        assert_eq!(extract_bearer_token(Some("bearer abc")), None);
    }

    #[test]
    fn test_public_route_allows_without_principal() {
        let (guard, _) = guard();

        let outcome = guard.evaluate(&RouteKey::new("POST", "/api/auth/sign-in"), None);
        assert_eq!(outcome, GuardOutcome::Allowed { principal: None });
    }

    #[test]
    fn test_public_route_ignores_bad_token() {
        let (guard, _) = guard();

        let outcome = guard.evaluate(
            &RouteKey::new("POST", "/api/auth/sign-in"),
            Some("Bearer garbage"),
        );
        assert_eq!(outcome, GuardOutcome::Allowed { principal: None });
    }

    #[test]
    fn test_malformed_headers_are_missing_token() {
        let (guard, _) = guard();

        for header in [None, Some(""), Some("Token abc"), Some("Bearer"), Some("Bearer ")] {
            assert_eq!(
                guard.evaluate(&profile(), header),
                GuardOutcome::Rejected(RejectionReason::MissingToken),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_valid_token_attaches_principal() {
        let (guard, jwt_handler) = guard();
        let claims = TokenClaims::new("sub-1", "johndoe");
        let token = jwt_handler.issue(&claims).unwrap();

        let outcome = guard.evaluate(&profile(), Some(&format!("Bearer {}", token)));
        assert_eq!(
            outcome,
            GuardOutcome::Allowed {
                principal: Some(claims)
            }
        );
    }

    #[test]
    fn test_forged_signature_is_invalid_token() {
        let (guard, _) = guard();
        let forger = JwtHandler::new(b"some_other_secret_of_32_bytes_long!", ExpiresIn::default());
        let token = forger
            .issue(&TokenClaims::new("sub-1", "johndoe"))
            .unwrap();

        let outcome = guard.evaluate(&profile(), Some(&format!("Bearer {}", token)));
        assert!(matches!(
            outcome,
            GuardOutcome::Rejected(RejectionReason::InvalidToken(_))
        ));
        assert!(!outcome.is_allowed());
    }

    #[test]
    fn test_expired_token_is_invalid_token() {
        let clock = Arc::new(SteppedClock(AtomicI64::new(1_700_000_000)));
        let jwt_handler = Arc::new(
            JwtHandler::new(SECRET, ExpiresIn::default()).with_clock(clock.clone()),
        );
        let table = VisibilityTable::builder()
            .route("auth", profile(), Some(Visibility::Protected))
            .build();
        let guard = AuthGuard::new(Arc::new(table), Arc::clone(&jwt_handler));
        let token = jwt_handler
            .issue(&TokenClaims::new("sub-1", "johndoe"))
            .unwrap();
        let header = format!("Bearer {}", token);

        assert!(guard.evaluate(&profile(), Some(&header)).is_allowed());

        clock.0.fetch_add(60 * 60, Ordering::SeqCst);
        assert_eq!(
            guard.evaluate(&profile(), Some(&header)),
            GuardOutcome::Rejected(RejectionReason::InvalidToken(JwtError::ExpiredToken))
        );
    }

    #[test]
    fn test_unregistered_route_requires_token() {
        let (guard, _) = guard();

        let outcome = guard.evaluate(&RouteKey::new("GET", "/api/anything"), None);
        assert_eq!(outcome, GuardOutcome::Rejected(RejectionReason::MissingToken));
    }
}

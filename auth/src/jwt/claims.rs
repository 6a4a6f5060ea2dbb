use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Identity carried by an access token.
///
/// `sub` is the principal's stable subject identifier, not its storage id, so a
/// token stays valid across username changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub username: String,
}

impl TokenClaims {
    pub fn new(sub: impl ToString, username: impl ToString) -> Self {
        Self {
            sub: sub.to_string(),
            username: username.to_string(),
        }
    }
}

/// Claims as they appear inside the signed token.
///
/// The identity fields plus the RFC 7519 `iat` and `exp` timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stable principal identifier)
    pub sub: String,

    /// Username at issuance time
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for an identity issued at `now` and valid for `lifetime`.
    ///
    /// # Errors
    /// * `InvalidExpiry` - `now + lifetime` is not a representable instant
    pub fn issue(
        identity: &TokenClaims,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            JwtError::InvalidExpiry(format!("lifetime of {}s overflows", lifetime.num_seconds()))
        })?;

        Ok(Self {
            sub: identity.sub.clone(),
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Check if token is expired.
    ///
    /// A token is expired from the second named by `exp` onwards.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn into_token_claims(self) -> TokenClaims {
        TokenClaims {
            sub: self.sub,
            username: self.username,
        }
    }
}

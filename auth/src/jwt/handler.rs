use std::sync::Arc;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenClaims;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::JwtError;
use super::expiry::ExpiresIn;

/// Development-only signing secret. Deployments must configure their own.
pub const DEFAULT_SECRET: &str = "your-secret-key";

/// JWT token handler for issuing and verifying access tokens.
///
/// Uses HS256 (HMAC with SHA-256). Holds only immutable key material and the
/// configured token lifetime, so one instance is shared across all requests.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    expires_in: ExpiresIn,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key and token lifetime.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `expires_in` - Lifetime of issued tokens
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm and the system clock
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], expires_in: ExpiresIn) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            expires_in,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for `iat`, `exp` and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn expires_in(&self) -> ExpiresIn {
        self.expires_in
    }

    /// Issue a signed token for an identity.
    ///
    /// # Arguments
    /// * `identity` - Subject and username to embed
    ///
    /// # Returns
    /// JWT token string expiring after the configured lifetime
    ///
    /// # Errors
    /// * `InvalidExpiry` - Expiry instant not representable
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, identity: &TokenClaims) -> Result<String, JwtError> {
        let claims = Claims::issue(identity, self.clock.now(), self.expires_in.duration())?;
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token's signature and expiry and return its identity.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// Identity claims embedded at issuance
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token, wrong algorithm, bad signature or missing claims
    /// * `ExpiredToken` - The `exp` claim has passed
    pub fn verify(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against `self.clock` below.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                    _ => JwtError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::ExpiredToken);
        }

        Ok(claims.into_token_claims())
    }
}

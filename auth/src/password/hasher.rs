use super::errors::PasswordError;
use super::salt::Salt;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 10;

/// Stored password material: the salt string and the hash computed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// bcrypt salt string (`$2b$10$...`), fed back verbatim on verification
    pub salt: String,
    /// Full bcrypt hash string computed from the password and `salt`
    pub hash: String,
}

/// Password hashing implementation.
///
/// Hashes with bcrypt using an explicit, persisted salt string. Verification
/// re-hashes with the stored salt and compares the result, so a given
/// (password, salt) pair always yields the same hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a new password hasher with the default cost factor (10).
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_COST)
    }

    /// Create a password hasher with an explicit cost factor.
    ///
    /// # Arguments
    /// * `cost` - bcrypt cost factor, valid range 4..=31
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Generate a fresh salt string at this hasher's cost factor.
    pub fn generate_salt(&self) -> String {
        Salt::generate(self.cost).to_string()
    }

    /// Hash a plaintext password with a freshly generated salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Credential holding the generated salt and the resulting hash
    ///
    /// # Errors
    /// * `HashingFailed` - Cost factor out of range or bcrypt failure
    pub fn hash_password(&self, password: &str) -> Result<Credential, PasswordError> {
        let salt = self.generate_salt();
        let hash = self.hash(password, &salt)?;

        Ok(Credential { salt, hash })
    }

    /// Compute the bcrypt hash of a password for a given salt string.
    ///
    /// The cost and revision come from the salt itself, not from this hasher.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    /// * `salt` - Salt string as produced by `generate_salt`
    ///
    /// # Returns
    /// 60-character bcrypt hash string
    ///
    /// # Errors
    /// * `InvalidSalt` - Salt string cannot be parsed
    /// * `HashingFailed` - bcrypt rejected the parameters
    pub fn hash(&self, password: &str, salt: &str) -> Result<String, PasswordError> {
        let salt = Salt::parse(salt)?;

        bcrypt::hash_with_salt(password, salt.cost(), salt.bytes())
            .map(|parts| parts.format_for_version(salt.version().to_bcrypt()))
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored salt and hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `salt` - Stored salt string
    /// * `expected_hash` - Stored hash string
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `InvalidSalt` - Stored salt is malformed
    /// * `HashingFailed` - bcrypt rejected the parameters
    pub fn verify(
        &self,
        password: &str,
        salt: &str,
        expected_hash: &str,
    ) -> Result<bool, PasswordError> {
        let computed = self.hash(password, salt)?;

        Ok(constant_time_eq(computed.as_bytes(), expected_hash.as_bytes()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two byte strings without short-circuiting on the first difference.
///
/// Length is not treated as secret.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::GeneralPurpose;
use base64::engine::GeneralPurposeConfig;
use base64::Engine;
use rand::Rng;

use super::errors::PasswordError;

/// bcrypt's radix-64 encoding (`./A-Za-z0-9`, unpadded).
///
/// Trailing bits are accepted on decode: the 22 salt characters carry 132 bits
/// of which only the first 128 are used.
const BCRYPT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

const SALT_BYTES: usize = 16;
const ENCODED_SALT_LEN: usize = 22;

/// bcrypt revision prefix carried by a salt string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltVersion {
    TwoA,
    TwoB,
    TwoX,
    TwoY,
}

impl SaltVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaltVersion::TwoA => "2a",
            SaltVersion::TwoB => "2b",
            SaltVersion::TwoX => "2x",
            SaltVersion::TwoY => "2y",
        }
    }

    pub(crate) fn to_bcrypt(self) -> bcrypt::Version {
        match self {
            SaltVersion::TwoA => bcrypt::Version::TwoA,
            SaltVersion::TwoB => bcrypt::Version::TwoB,
            SaltVersion::TwoX => bcrypt::Version::TwoX,
            SaltVersion::TwoY => bcrypt::Version::TwoY,
        }
    }
}

impl FromStr for SaltVersion {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2a" => Ok(SaltVersion::TwoA),
            "2b" => Ok(SaltVersion::TwoB),
            "2x" => Ok(SaltVersion::TwoX),
            "2y" => Ok(SaltVersion::TwoY),
            other => Err(PasswordError::InvalidSalt(format!(
                "unsupported bcrypt version '{}'",
                other
            ))),
        }
    }
}

/// Self-describing bcrypt salt: revision, cost factor and 16 random bytes.
///
/// The textual form is `$<version>$<cost>$<22 radix-64 chars>`, e.g.
/// `$2b$10$N9qo8uLOickgx2ZMRZoMye`. This string is what gets persisted next to
/// the hash and fed back unchanged on verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt {
    version: SaltVersion,
    cost: u32,
    bytes: [u8; SALT_BYTES],
}

impl Salt {
    /// Generate a fresh salt from the thread-local CSPRNG.
    ///
    /// # Arguments
    /// * `cost` - bcrypt cost factor (log2 of the key expansion rounds)
    ///
    /// # Returns
    /// Salt with version `2b` and random bytes
    pub fn generate(cost: u32) -> Self {
        let mut bytes = [0u8; SALT_BYTES];
        rand::rng().fill(&mut bytes);

        Self {
            version: SaltVersion::TwoB,
            cost,
            bytes,
        }
    }

    /// Parse a salt string.
    ///
    /// Only the first 22 characters after the cost are read; anything after
    /// them is ignored, so a complete bcrypt hash is also accepted as a salt.
    ///
    /// # Errors
    /// * `InvalidSalt` - String is not `$<version>$<cost>$<salt>`
    pub fn parse(salt: &str) -> Result<Self, PasswordError> {
        let rest = salt
            .strip_prefix('$')
            .ok_or_else(|| PasswordError::InvalidSalt("missing '$' prefix".to_string()))?;

        let mut parts = rest.splitn(3, '$');
        let (Some(version), Some(cost), Some(encoded)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(PasswordError::InvalidSalt(
                "expected $<version>$<cost>$<salt>".to_string(),
            ));
        };

        let version = version.parse::<SaltVersion>()?;

        if cost.len() != 2 || !cost.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PasswordError::InvalidSalt(format!(
                "cost must be two digits, got '{}'",
                cost
            )));
        }
        let cost = cost
            .parse::<u32>()
            .map_err(|e| PasswordError::InvalidSalt(e.to_string()))?;

        let encoded = encoded.get(..ENCODED_SALT_LEN).ok_or_else(|| {
            PasswordError::InvalidSalt(format!(
                "salt must be {} characters",
                ENCODED_SALT_LEN
            ))
        })?;
        let decoded = BCRYPT_BASE64
            .decode(encoded)
            .map_err(|e| PasswordError::InvalidSalt(e.to_string()))?;
        let bytes: [u8; SALT_BYTES] = decoded
            .try_into()
            .map_err(|_| PasswordError::InvalidSalt("salt must decode to 16 bytes".to_string()))?;

        Ok(Self {
            version,
            cost,
            bytes,
        })
    }

    pub fn version(&self) -> SaltVersion {
        self.version
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn bytes(&self) -> [u8; SALT_BYTES] {
        self.bytes
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}",
            self.version.as_str(),
            self.cost,
            BCRYPT_BASE64.encode(self.bytes)
        )
    }
}

impl FromStr for Salt {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Salt::parse(s)
    }
}

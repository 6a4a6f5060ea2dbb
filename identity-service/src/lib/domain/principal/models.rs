use std::fmt;
use std::str::FromStr;

use auth::Credential;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::principal::errors::EmailError;
use crate::domain::principal::errors::NameError;
use crate::domain::principal::errors::PrincipalIdError;
use crate::domain::principal::errors::UsernameError;

/// Principal aggregate entity.
///
/// A registered identity that can sign in with a username and password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub sub: Subject,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage identifier, assigned by the principal store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Generate a new random principal ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a principal ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, PrincipalIdError> {
        Uuid::parse_str(s)
            .map(PrincipalId)
            .map_err(|e| PrincipalIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable subject identifier embedded in access tokens.
///
/// Generated once at registration and never changed, independent of the
/// storage id and of the username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subject(pub Uuid);

impl Subject {
    /// Generate a new random subject.
    ///
    /// # Returns
    /// Subject with random UUID v4
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a subject from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, PrincipalIdError> {
        Uuid::parse_str(s)
            .map(Subject)
            .map_err(|e| PrincipalIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Arguments
    /// * `username` - Raw username string
    ///
    /// # Returns
    /// Validated Username value object
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name of a principal.
///
/// Trimmed, non-empty, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let trimmed = name.trim();
        let length = trimmed.chars().count();

        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fields handed to the principal store to create a principal.
///
/// The store assigns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
    pub sub: Subject,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub credential: Credential,
}

/// Command to register a new principal with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub username: Username,
    pub password: String,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `first_name` - Validated first name
    /// * `last_name` - Validated last name
    /// * `email` - Validated email address
    /// * `username` - Validated username
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(
        first_name: PersonName,
        last_name: PersonName,
        email: EmailAddress,
        username: Username,
        password: String,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
            username,
            password,
        }
    }
}

/// Command to sign in with a username and password.
///
/// The username is kept raw: a malformed username fails sign-in exactly like
/// an unknown one.
#[derive(Debug)]
pub struct SignInCommand {
    pub username: String,
    pub password: String,
}

impl SignInCommand {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

/// Result of successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInResult {
    /// JWT access token
    pub access_token: String,
}

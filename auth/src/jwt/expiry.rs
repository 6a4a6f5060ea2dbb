use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::Deserialize;

use super::errors::JwtError;

/// Token lifetime parsed from a short duration string.
///
/// Accepts `<integer><unit>` where unit is one of `ms`, `s`, `m`, `h`, `d`,
/// `w`, `y` (or their long forms, e.g. `hours`), case-insensitive, with
/// optional whitespace between number and unit. A bare integer is seconds.
/// The lifetime must be at least one second and at most 100 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ExpiresIn(Duration);

impl ExpiresIn {
    const MAX_DAYS: i64 = 36_525;

    pub fn new(duration: Duration) -> Result<Self, JwtError> {
        if duration < Duration::seconds(1) {
            return Err(JwtError::InvalidExpiry(
                "token lifetime must be at least one second".to_string(),
            ));
        }
        if duration > Duration::days(Self::MAX_DAYS) {
            return Err(JwtError::InvalidExpiry(
                "token lifetime must be at most 100 years".to_string(),
            ));
        }
        Ok(Self(duration))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl Default for ExpiresIn {
    fn default() -> Self {
        Self(Duration::hours(1))
    }
}

impl FromStr for ExpiresIn {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let split = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (amount, unit) = input.split_at(split);

        if amount.is_empty() {
            return Err(JwtError::InvalidExpiry(format!(
                "'{}' does not start with a number",
                s
            )));
        }

        let amount = amount
            .parse::<i64>()
            .map_err(|e| JwtError::InvalidExpiry(format!("'{}': {}", s, e)))?;

        let millis_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "s" | "sec" | "secs" | "second" | "seconds" => 1_000,
            "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1,
            "m" | "min" | "mins" | "minute" | "minutes" => 60_000,
            "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000,
            "d" | "day" | "days" => 86_400_000,
            "w" | "week" | "weeks" => 604_800_000,
            "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000,
            other => {
                return Err(JwtError::InvalidExpiry(format!(
                    "unknown unit '{}' in '{}'",
                    other, s
                )))
            }
        };

        let millis = amount
            .checked_mul(millis_per_unit)
            .ok_or_else(|| JwtError::InvalidExpiry(format!("'{}' is too large", s)))?;

        Self::new(Duration::milliseconds(millis))
    }
}

impl TryFrom<String> for ExpiresIn {
    type Error = JwtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ExpiresIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.num_seconds())
    }
}

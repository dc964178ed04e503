//! Split pattern identifiers
//!
//! A split is named by the pins left standing, sorted ascending and joined with `-`
//! (for example `7-9` or `4-6-7-10`). Only that canonical spelling is accepted, so
//! string equality is pattern equality.

use super::error::LedgerError;
use std::fmt;
use std::str::FromStr;

/// Lowest pin number on the deck
pub const FIRST_PIN: u8 = 1;

/// Highest pin number on the deck
pub const LAST_PIN: u8 = 10;

/// A canonical pin-leave pattern
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SplitPattern(String);

impl SplitPattern {
    /// Build the canonical pattern for an unordered pin selection
    ///
    /// # Errors
    ///
    /// Returns `InvalidSplit` if the selection is empty, contains a pin outside
    /// 1-10, or names the same pin twice.
    pub fn from_pins(pins: &[u8]) -> Result<Self, LedgerError> {
        let mut sorted = pins.to_vec();
        sorted.sort_unstable();

        let describe = || {
            pins.iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join("-")
        };

        if sorted.is_empty() {
            return Err(LedgerError::invalid_split(""));
        }
        if sorted
            .iter()
            .any(|pin| !(FIRST_PIN..=LAST_PIN).contains(pin))
        {
            return Err(LedgerError::invalid_split(&describe()));
        }
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(LedgerError::invalid_split(&describe()));
        }

        let joined = sorted
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join("-");
        Ok(SplitPattern(joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SplitPattern {
    type Err = LedgerError;

    /// Parse a pattern that is already in canonical form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pins = s
            .split('-')
            .map(|part| part.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| LedgerError::invalid_split(s))?;

        let pattern = SplitPattern::from_pins(&pins).map_err(|_| LedgerError::invalid_split(s))?;
        if pattern.as_str() != s {
            return Err(LedgerError::invalid_split(s));
        }
        Ok(pattern)
    }
}

impl fmt::Display for SplitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SplitPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

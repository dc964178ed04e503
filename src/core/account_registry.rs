//! Account registry
//!
//! This module provides the `AccountRegistry`, the fixed roster of a sheet: the
//! player names in roster order plus the reserved Pot account.
//!
//! The registry is responsible for:
//! - Always including the Pot, even when the stored roster omits it
//! - Dropping blank and duplicate names while preserving roster order
//! - Answering whether a name is a selectable player

use crate::types::{is_pot, POT};

/// Roster seeded into a sheet that has none
pub const DEFAULT_NAMES: &[&str] = &["Alice", "Bob", "Charlie", "Dana", POT];

/// Fixed set of account names for the lifetime of a loaded sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRegistry {
    /// Names in roster order; the Pot is always present exactly once
    names: Vec<String>,
}

impl AccountRegistry {
    /// Create a registry from a stored roster
    ///
    /// Names are trimmed; blanks and repeats are dropped. The Pot is appended if
    /// the roster does not list it.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || roster.iter().any(|existing| existing == name) {
                continue;
            }
            roster.push(name.to_string());
        }
        if !roster.iter().any(|name| is_pot(name)) {
            roster.push(POT.to_string());
        }
        AccountRegistry { names: roster }
    }

    /// The roster seeded into fresh sheets
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_NAMES.iter().copied())
    }

    /// Whether `name` is a selectable player (known and not the Pot)
    pub fn is_player(&self, name: &str) -> bool {
        !is_pot(name) && self.contains(name)
    }

    /// Whether `name` is any known account, the Pot included
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// All account names including the Pot, in roster order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_only_pot() {
        let registry = AccountRegistry::default();
        assert_eq!(registry.names(), &[POT.to_string()]);
        assert!(!registry.is_player(POT));
    }

    #[test]
    fn test_pot_appended_when_missing() {
        let registry = AccountRegistry::new(["Alice", "Bob"]);
        assert_eq!(registry.names(), &["Alice", "Bob", "Pot"]);
    }

    #[test]
    fn test_pot_position_kept_when_listed() {
        let registry = AccountRegistry::new(["Pot", "Alice"]);
        assert_eq!(registry.names(), &["Pot", "Alice"]);
    }

    #[test]
    fn test_blank_and_duplicate_names_dropped() {
        let registry = AccountRegistry::new(["Alice", " ", "Bob", "Alice ", "Pot", "Pot"]);
        assert_eq!(registry.names(), &["Alice", "Bob", "Pot"]);
    }

    #[test]
    fn test_is_player() {
        let registry = AccountRegistry::new(["Alice", "Bob"]);
        assert!(registry.is_player("Alice"));
        assert!(!registry.is_player("Pot"));
        assert!(!registry.is_player("Zed"));
        assert!(registry.contains("Pot"));
    }
}

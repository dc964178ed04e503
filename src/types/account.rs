//! Account-related types for the split ledger
//!
//! Accounts are just names. Balances are never stored; they are derived from the
//! transaction log and rendered as [`Balance`] rows for callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of the shared pool pseudo-account
pub const POT: &str = "Pot";

/// A rendered account balance
///
/// `amount` is a string with exactly two decimal places, which is what callers
/// display verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Account name (a player or the Pot)
    pub name: String,

    /// Balance formatted as `-5.00`, `0.00`, `12.50`
    pub amount: String,
}

impl Balance {
    /// Render a derived balance for output
    pub fn new(name: &str, amount: Decimal) -> Self {
        // Decimal keeps the sign of a zero produced by subtraction.
        let amount = if amount.is_zero() { Decimal::ZERO } else { amount };
        Balance {
            name: name.to_string(),
            amount: format!("{:.2}", amount),
        }
    }
}

/// Whether a name denotes the Pot
pub fn is_pot(name: &str) -> bool {
    name == POT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whole(Decimal::new(5, 0), "5.00")]
    #[case::negative(Decimal::new(-500, 2), "-5.00")]
    #[case::zero(Decimal::ZERO, "0.00")]
    #[case::negative_zero(Decimal::new(-5, 0) + Decimal::new(5, 0), "0.00")]
    #[case::fraction(Decimal::new(125, 1), "12.50")]
    fn test_balance_formatting(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(Balance::new("Alice", amount).amount, expected);
    }
}

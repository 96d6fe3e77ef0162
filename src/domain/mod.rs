//! Domain primitives shared by the services and the API layer.
//!
//! Kinds and periods are closed enums persisted as lower-case strings, so
//! the database stays readable and new variants only need a `FromStr` arm.

pub mod money;
pub mod period;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use money::{MAX_AMOUNT_CENTS, MoneyError, cents_to_decimal, decimal_to_cents};
pub use period::{BudgetWindow, current_window};

/// Offset pagination for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 100;
    pub const MAX_LIMIT: u64 = 1000;
    /// Offsets are bound as signed 64-bit integers.
    pub const MAX_SKIP: u64 = i64::MAX.unsigned_abs();
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Error returned when a persisted or user-supplied tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value:?}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

/// Whether a category groups money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    #[default]
    Expense,
}

impl CategoryKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(UnknownVariant {
                what: "category kind",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(UnknownVariant {
                what: "transaction kind",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence of a budget window.
///
/// Monthly and yearly periods advance by calendar months, so a budget that
/// starts on the 31st lands on the last day of shorter months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(UnknownVariant {
                what: "budget period",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_parse_case_insensitively() {
        assert_eq!("Income".parse::<CategoryKind>(), Ok(CategoryKind::Income));
        assert_eq!(
            "TRANSFER".parse::<TransactionKind>(),
            Ok(TransactionKind::Transfer)
        );
        assert_eq!("monthly".parse::<BudgetPeriod>(), Ok(BudgetPeriod::Monthly));
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "daily".parse::<BudgetPeriod>().unwrap_err();
        assert_eq!(err.what, "budget period");
        assert!(err.to_string().contains("daily"));
    }

    #[test]
    fn test_serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&TransactionKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");

        let kind: CategoryKind = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(kind, CategoryKind::Income);
        assert!(serde_json::from_str::<BudgetPeriod>("\"hourly\"").is_err());
    }
}

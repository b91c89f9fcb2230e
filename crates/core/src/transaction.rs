use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::AccountId;
use super::category::CategoryId;
use super::money::Money;

/// Which statement layout a file was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    ChaseCredit,
    ChaseChecking,
    Venmo,
    AppleCard,
}

impl SourceFormat {
    /// Stable key used in persistence and as the dedup source scope.
    /// Renaming a key orphans every import hash derived from it.
    pub fn key(self) -> &'static str {
        match self {
            SourceFormat::ChaseCredit => "chase_credit",
            SourceFormat::ChaseChecking => "chase_checking",
            SourceFormat::Venmo => "venmo",
            SourceFormat::AppleCard => "apple_card",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "chase_credit" => Some(SourceFormat::ChaseCredit),
            "chase_checking" => Some(SourceFormat::ChaseChecking),
            "venmo" => Some(SourceFormat::Venmo),
            "apple_card" => Some(SourceFormat::AppleCard),
            _ => None,
        }
    }

    pub fn institution(self) -> &'static str {
        match self {
            SourceFormat::ChaseCredit | SourceFormat::ChaseChecking => "Chase",
            SourceFormat::Venmo => "Venmo",
            SourceFormat::AppleCard => "Apple",
        }
    }

    pub fn default_account_name(self) -> &'static str {
        match self {
            SourceFormat::ChaseCredit => "Chase Credit Card",
            SourceFormat::ChaseChecking => "Chase Checking",
            SourceFormat::Venmo => "Venmo",
            SourceFormat::AppleCard => "Apple Card",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_account_name())
    }
}

/// One normalized financial movement, fresh out of a parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub merchant: Option<String>,
    /// Category string the institution itself supplied, if any.
    pub source_category: Option<String>,
    /// Raw type/status vocabulary from the source row (e.g. "ACH_DEBIT").
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based line number in the source file, header included.
    pub row: usize,
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        RowError {
            row,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// What a parser hands back for one file: the transactions it could
/// normalize plus a diagnostic per row it could not. A malformed row is
/// never fatal; only a structurally wrong file is.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub format: SourceFormat,
    pub transactions: Vec<ParsedTransaction>,
    pub errors: Vec<RowError>,
    /// Data rows encountered, including skipped and failed ones.
    pub rows_seen: usize,
}

impl ParseResult {
    pub fn rows_parsed(&self) -> usize {
        self.transactions.len()
    }
}

/// A parsed transaction bound to its account, dedup hash, and category:
/// the shape handed across the storage seam.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub merchant: Option<String>,
    pub category_id: Option<CategoryId>,
    pub source_category: Option<String>,
    pub import_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_keys_round_trip() {
        for format in [
            SourceFormat::ChaseCredit,
            SourceFormat::ChaseChecking,
            SourceFormat::Venmo,
            SourceFormat::AppleCard,
        ] {
            assert_eq!(SourceFormat::from_key(format.key()), Some(format));
        }
        assert_eq!(SourceFormat::from_key("citibank"), None);
    }

    #[test]
    fn row_error_display() {
        let err = RowError::new(7, "invalid amount: abc");
        assert_eq!(err.to_string(), "row 7: invalid amount: abc");
    }
}

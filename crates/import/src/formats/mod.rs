pub mod apple;
pub mod chase;
pub mod venmo;

use chrono::NaiveDate;
use moneta_core::{Money, ParseResult, SourceFormat};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

pub use apple::AppleCard;
pub use chase::{ChaseChecking, ChaseCredit};
pub use venmo::Venmo;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{format} statement is missing required column {column:?}")]
    MissingColumn {
        format: SourceFormat,
        column: &'static str,
    },
    #[error("could not find the {format} header row")]
    HeaderNotFound { format: SourceFormat },
}

/// One statement layout. Implementations declare the header columns they
/// require (order-independent) and normalize raw rows into canonical
/// transactions. `matches` is a read-only probe of the header row; a file
/// this parser does not recognize is "not applicable", never an error.
pub trait StatementParser: Sync {
    fn format(&self) -> SourceFormat;
    fn matches(&self, content: &str) -> bool;
    fn parse(&self, content: &str) -> Result<ParseResult, ParseError>;
}

/// Bank exports routinely lead with a UTF-8 BOM.
pub(crate) fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

pub(crate) fn header_record(content: &str) -> Option<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(content).as_bytes());
    reader.headers().ok().cloned()
}

pub(crate) fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

pub(crate) fn has_columns(headers: &csv::StringRecord, names: &[&str]) -> bool {
    names.iter().all(|name| column_index(headers, name).is_some())
}

pub(crate) fn require(
    format: SourceFormat,
    headers: &csv::StringRecord,
    column: &'static str,
) -> Result<usize, ParseError> {
    column_index(headers, column).ok_or(ParseError::MissingColumn { format, column })
}

pub(crate) fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

pub(crate) fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_date(s: &str, fmt: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, fmt).map_err(|_| format!("invalid date {s:?}"))
}

/// Parse a statement amount: optional currency symbol, thousands commas,
/// accounting parentheses, and an optional explicit sign with whitespace
/// after it ("+ $25.00", Venmo style).
pub(crate) fn parse_amount(s: &str) -> Result<Money, String> {
    let raw = s.trim();
    let (negative, inner) = match raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, raw),
    };
    let cleaned = inner.replace([',', '$', ' '], "");
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let mut decimal = Decimal::from_str(cleaned).map_err(|_| format!("invalid amount {raw:?}"))?;
    if negative {
        decimal = -decimal;
    }
    Ok(Money::from_decimal(decimal))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("123.45").unwrap().to_cents(), 12345);
    }

    #[test]
    fn parse_amount_negative() {
        assert_eq!(parse_amount("-45.23").unwrap().to_cents(), -4523);
    }

    #[test]
    fn parse_amount_with_commas_and_dollar() {
        assert_eq!(parse_amount("$1,234.56").unwrap().to_cents(), 123456);
    }

    #[test]
    fn parse_amount_venmo_signed() {
        assert_eq!(parse_amount("+ $25.00").unwrap().to_cents(), 2500);
        assert_eq!(parse_amount("- $25.00").unwrap().to_cents(), -2500);
    }

    #[test]
    fn parse_amount_accounting_parens() {
        assert_eq!(parse_amount("(75.25)").unwrap().to_cents(), -7525);
    }

    #[test]
    fn parse_amount_invalid() {
        assert!(parse_amount("not_a_number").is_err());
        assert!(parse_amount("").is_err());
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn parse_date_us_format() {
        let d = parse_date("12/15/2024", "%m/%d/%Y").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 12, 15).unwrap());
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("not-a-date", "%m/%d/%Y").is_err());
        assert!(parse_date("13/45/2024", "%m/%d/%Y").is_err());
    }

    #[test]
    fn strip_bom_removes_leading_bom() {
        assert_eq!(strip_bom("\u{feff}Date,Amount"), "Date,Amount");
        assert_eq!(strip_bom("Date,Amount"), "Date,Amount");
    }
}

use chrono::NaiveDateTime;
use moneta_core::{ParseResult, ParsedTransaction, RowError, SourceFormat};

use super::{
    column_index, has_columns, header_record, is_blank, non_empty, parse_amount, require,
    strip_bom, ParseError, StatementParser,
};

const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Venmo transaction history. The export is not a plain CSV table: the
/// header row sits below an account-statement banner, and opening/closing
/// balance rows are interleaved with real transactions. Those metadata
/// rows have an empty `Datetime` and are skipped without being reported
/// as errors, as are incomplete transactions and bank transfers.
pub struct Venmo;

impl Venmo {
    const REQUIRED: &'static [&'static str] = &["Datetime", "Type", "Status", "Amount (total)"];
    /// How far down the banner lines the header row may sit.
    const HEADER_SCAN_LINES: usize = 10;

    fn header_line(content: &str) -> Option<usize> {
        content
            .lines()
            .take(Self::HEADER_SCAN_LINES)
            .position(|line| line.contains("Datetime") && line.contains("Amount (total)"))
    }

    fn from_header(content: &str, header_idx: usize) -> String {
        content
            .lines()
            .skip(header_idx)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StatementParser for Venmo {
    fn format(&self) -> SourceFormat {
        SourceFormat::Venmo
    }

    fn matches(&self, content: &str) -> bool {
        let content = strip_bom(content);
        let Some(header_idx) = Self::header_line(content) else {
            return false;
        };
        let table = Self::from_header(content, header_idx);
        header_record(&table).is_some_and(|h| has_columns(&h, Self::REQUIRED))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let content = strip_bom(content);
        let header_idx = Self::header_line(content).ok_or(ParseError::HeaderNotFound {
            format: self.format(),
        })?;
        let table = Self::from_header(content, header_idx);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(table.as_bytes());
        let headers = reader.headers()?.clone();
        let datetime_col = require(self.format(), &headers, "Datetime")?;
        let type_col = require(self.format(), &headers, "Type")?;
        let status_col = require(self.format(), &headers, "Status")?;
        let amount_col = require(self.format(), &headers, "Amount (total)")?;
        let note_col = column_index(&headers, "Note");
        let from_col = column_index(&headers, "From");
        let to_col = column_index(&headers, "To");

        let mut transactions = Vec::new();
        let mut errors = Vec::new();
        let mut rows_seen = 0;

        for (i, result) in reader.records().enumerate() {
            let row = header_idx + i + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    rows_seen += 1;
                    errors.push(RowError::new(row, format!("malformed row: {e}")));
                    continue;
                }
            };
            if is_blank(&record) {
                continue;
            }

            // Balance and summary rows carry no Datetime; they are
            // statement furniture, not failed data rows.
            let datetime_raw = record.get(datetime_col).unwrap_or_default().trim();
            if datetime_raw.is_empty() {
                continue;
            }
            rows_seen += 1;

            let status = record.get(status_col).unwrap_or_default().trim();
            if status != "Complete" {
                continue;
            }
            let txn_type = record.get(type_col).unwrap_or_default().trim();
            if txn_type == "Standard Transfer" {
                continue;
            }

            let date = match NaiveDateTime::parse_from_str(datetime_raw, DATETIME_FMT) {
                Ok(dt) => dt.date(),
                Err(_) => {
                    errors.push(RowError::new(row, format!("invalid datetime {datetime_raw:?}")));
                    continue;
                }
            };
            let mut amount = match parse_amount(record.get(amount_col).unwrap_or_default()) {
                Ok(amount) => amount,
                Err(reason) => {
                    errors.push(RowError::new(row, reason));
                    continue;
                }
            };
            // A charge is the counterparty pulling money, so the sign on
            // the statement is from their point of view.
            if txn_type == "Charge" {
                amount = -amount;
            }

            let from_user = non_empty(from_col.and_then(|c| record.get(c)));
            let to_user = non_empty(to_col.and_then(|c| record.get(c)));
            let description = match non_empty(note_col.and_then(|c| record.get(c))) {
                Some(note) => note,
                None if amount.is_negative() => {
                    format!("Payment to {}", to_user.as_deref().unwrap_or_default())
                }
                None => format!("Payment from {}", from_user.as_deref().unwrap_or_default()),
            };
            let merchant = if amount.is_negative() { to_user } else { from_user };

            transactions.push(ParsedTransaction {
                date,
                amount,
                description,
                merchant,
                source_category: None,
                source_type: non_empty(Some(txn_type)),
            });
        }

        Ok(ParseResult {
            format: self.format(),
            transactions,
            errors,
            rows_seen,
        })
    }
}

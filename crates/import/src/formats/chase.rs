use moneta_core::{ParseResult, ParsedTransaction, RowError, SourceFormat};

use super::{
    column_index, has_columns, header_record, is_blank, non_empty, parse_amount, parse_date,
    require, strip_bom, ParseError, StatementParser,
};
use crate::util::extract_merchant;

const DATE_FMT: &str = "%m/%d/%Y";

/// Chase credit card export. Amounts arrive already signed (negative =
/// charge, positive = payment/refund), and the bank supplies its own
/// category column, which is preserved as `source_category`.
pub struct ChaseCredit;

impl ChaseCredit {
    const REQUIRED: &'static [&'static str] = &["Transaction Date", "Post Date", "Description"];
}

impl StatementParser for ChaseCredit {
    fn format(&self) -> SourceFormat {
        SourceFormat::ChaseCredit
    }

    fn matches(&self, content: &str) -> bool {
        header_record(content).is_some_and(|h| has_columns(&h, Self::REQUIRED))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(strip_bom(content).as_bytes());
        let headers = reader.headers()?.clone();
        let date_col = require(self.format(), &headers, "Transaction Date")?;
        let desc_col = require(self.format(), &headers, "Description")?;
        let amount_col = require(self.format(), &headers, "Amount")?;
        let category_col = column_index(&headers, "Category");
        let type_col = column_index(&headers, "Type");

        let mut transactions = Vec::new();
        let mut errors = Vec::new();
        let mut rows_seen = 0;

        for (i, result) in reader.records().enumerate() {
            let row = i + 2;
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
            rows_seen += 1;

            let date = match parse_date(record.get(date_col).unwrap_or_default(), DATE_FMT) {
                Ok(date) => date,
                Err(reason) => {
                    errors.push(RowError::new(row, reason));
                    continue;
                }
            };
            let amount = match parse_amount(record.get(amount_col).unwrap_or_default()) {
                Ok(amount) => amount,
                Err(reason) => {
                    errors.push(RowError::new(row, reason));
                    continue;
                }
            };
            let description = record.get(desc_col).unwrap_or_default().trim().to_string();

            transactions.push(ParsedTransaction {
                date,
                amount,
                merchant: extract_merchant(&description),
                source_category: non_empty(category_col.and_then(|c| record.get(c))),
                source_type: non_empty(type_col.and_then(|c| record.get(c))),
                description,
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

/// Chase checking export. Amounts are signed and may carry thousands
/// separators; the ACH type vocabulary lands in `source_type`.
pub struct ChaseChecking;

impl ChaseChecking {
    const REQUIRED: &'static [&'static str] = &["Details", "Posting Date", "Description"];
}

impl StatementParser for ChaseChecking {
    fn format(&self) -> SourceFormat {
        SourceFormat::ChaseChecking
    }

    fn matches(&self, content: &str) -> bool {
        header_record(content).is_some_and(|h| has_columns(&h, Self::REQUIRED))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(strip_bom(content).as_bytes());
        let headers = reader.headers()?.clone();
        let date_col = require(self.format(), &headers, "Posting Date")?;
        let desc_col = require(self.format(), &headers, "Description")?;
        let amount_col = require(self.format(), &headers, "Amount")?;
        let type_col = column_index(&headers, "Type");

        let mut transactions = Vec::new();
        let mut errors = Vec::new();
        let mut rows_seen = 0;

        for (i, result) in reader.records().enumerate() {
            let row = i + 2;
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
            rows_seen += 1;

            let date = match parse_date(record.get(date_col).unwrap_or_default(), DATE_FMT) {
                Ok(date) => date,
                Err(reason) => {
                    errors.push(RowError::new(row, reason));
                    continue;
                }
            };
            let amount = match parse_amount(record.get(amount_col).unwrap_or_default()) {
                Ok(amount) => amount,
                Err(reason) => {
                    errors.push(RowError::new(row, reason));
                    continue;
                }
            };
            let description = record.get(desc_col).unwrap_or_default().trim().to_string();

            transactions.push(ParsedTransaction {
                date,
                amount,
                merchant: extract_merchant(&description),
                source_category: None,
                source_type: non_empty(type_col.and_then(|c| record.get(c))),
                description,
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

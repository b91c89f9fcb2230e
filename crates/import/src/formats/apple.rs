use moneta_core::{ParseResult, ParsedTransaction, RowError, SourceFormat};

use super::{
    has_columns, header_record, is_blank, non_empty, parse_amount, parse_date, require, strip_bom,
    ParseError, StatementParser,
};

const DATE_FMT: &str = "%m/%d/%Y";

/// Apple Card export. Purchases are listed as positive amounts, so rows
/// typed `Purchase` are negated to the canonical sign convention;
/// refunds and credits arrive positive and stay positive. The merchant
/// comes straight from the export, no extraction needed.
pub struct AppleCard;

impl AppleCard {
    const REQUIRED: &'static [&'static str] = &[
        "Transaction Date",
        "Clearing Date",
        "Description",
        "Merchant",
        "Category",
        "Type",
        "Amount (USD)",
    ];
}

impl StatementParser for AppleCard {
    fn format(&self) -> SourceFormat {
        SourceFormat::AppleCard
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
        let merchant_col = require(self.format(), &headers, "Merchant")?;
        let category_col = require(self.format(), &headers, "Category")?;
        let type_col = require(self.format(), &headers, "Type")?;
        let amount_col = require(self.format(), &headers, "Amount (USD)")?;

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
            let mut amount = match parse_amount(record.get(amount_col).unwrap_or_default()) {
                Ok(amount) => amount,
                Err(reason) => {
                    errors.push(RowError::new(row, reason));
                    continue;
                }
            };
            let txn_type = record.get(type_col).unwrap_or_default().trim();
            if txn_type == "Purchase" {
                amount = -amount;
            }

            transactions.push(ParsedTransaction {
                date,
                amount,
                description: record.get(desc_col).unwrap_or_default().trim().to_string(),
                merchant: non_empty(record.get(merchant_col)),
                source_category: non_empty(record.get(category_col)),
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

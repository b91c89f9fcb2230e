use thiserror::Error;

use crate::formats::{AppleCard, ChaseChecking, ChaseCredit, StatementParser, Venmo};

/// Registration order is part of the detection contract: parsers are
/// probed in this order and the first match wins.
static PARSERS: &[&dyn StatementParser] = &[&ChaseCredit, &ChaseChecking, &Venmo, &AppleCard];

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("unrecognized statement format; header row was {header:?}")]
    UnrecognizedFormat { header: String },
}

/// Find the parser for a raw statement file by probing each registered
/// parser's header check. Probing never consumes or mutates the input.
pub fn detect(content: &str) -> Result<&'static dyn StatementParser, DetectError> {
    for parser in PARSERS {
        if parser.matches(content) {
            return Ok(*parser);
        }
    }
    Err(DetectError::UnrecognizedFormat {
        header: observed_header(content),
    })
}

fn observed_header(content: &str) -> String {
    let line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();
    if line.chars().count() > 200 {
        line.chars().take(200).collect()
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneta_core::SourceFormat;

    #[test]
    fn detects_each_format() {
        let cases = [
            (
                "Transaction Date,Post Date,Description,Category,Type,Amount\n",
                SourceFormat::ChaseCredit,
            ),
            (
                "Details,Posting Date,Description,Amount,Type,Balance\n",
                SourceFormat::ChaseChecking,
            ),
            (
                ",ID,Datetime,Type,Status,Note,From,To,Amount (total)\n",
                SourceFormat::Venmo,
            ),
            (
                "Transaction Date,Clearing Date,Description,Merchant,Category,Type,Amount (USD)\n",
                SourceFormat::AppleCard,
            ),
        ];
        for (content, expected) in cases {
            assert_eq!(detect(content).unwrap().format(), expected);
        }
    }

    #[test]
    fn venmo_detected_below_banner() {
        let content = "\
Account Statement - (@alice) - December 2024
,ID,Datetime,Type,Status,Note,From,To,Amount (total)
";
        assert_eq!(detect(content).unwrap().format(), SourceFormat::Venmo);
    }

    #[test]
    fn unknown_header_is_reported_verbatim() {
        let err = detect("Buchungstag,Verwendungszweck,Betrag\n2024-01-01,MIETE,-900\n")
            .unwrap_err();
        let DetectError::UnrecognizedFormat { header } = err;
        assert_eq!(header, "Buchungstag,Verwendungszweck,Betrag");
    }

    #[test]
    fn empty_file_is_unrecognized() {
        assert!(detect("").is_err());
    }
}

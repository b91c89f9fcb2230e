use regex::Regex;
use std::sync::OnceLock;

fn txn_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{10,}\b").unwrap())
}

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(DEBIT CARD|CREDIT CARD|ACH|CHECKCARD|POS)\s+").unwrap())
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").unwrap())
}

/// Best-effort merchant name from a bank description: strip long
/// transaction ids, processor prefixes, and embedded dates, then collapse
/// whitespace. Returns None when nothing was stripped (the description
/// already is the merchant) or nothing is left.
pub(crate) fn extract_merchant(description: &str) -> Option<String> {
    let cleaned = txn_id_re().replace_all(description, "");
    let cleaned = prefix_re().replace_all(&cleaned, "");
    let cleaned = date_re().replace_all(&cleaned, "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() || cleaned == description {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_transaction_ids() {
        assert_eq!(
            extract_merchant("AMAZON MKTPL 1234567890123").as_deref(),
            Some("AMAZON MKTPL")
        );
    }

    #[test]
    fn strips_processor_prefix_case_insensitively() {
        assert_eq!(
            extract_merchant("checkcard TRADER JOES #512").as_deref(),
            Some("TRADER JOES #512")
        );
    }

    #[test]
    fn strips_embedded_dates() {
        assert_eq!(
            extract_merchant("SHELL OIL 12/14/24").as_deref(),
            Some("SHELL OIL")
        );
    }

    #[test]
    fn clean_description_yields_none() {
        assert_eq!(extract_merchant("STARBUCKS"), None);
    }

    #[test]
    fn all_noise_yields_none() {
        assert_eq!(extract_merchant("1234567890123"), None);
    }
}

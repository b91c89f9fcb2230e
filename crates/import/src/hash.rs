use moneta_core::ParsedTransaction;
use sha2::{Digest, Sha256};

/// Deterministic dedup fingerprint for one transaction within one source
/// scope: SHA-256 over date, amount in cents, the normalized description,
/// and the source key, pipe-joined.
///
/// The hashed field set is a compatibility contract with every persisted
/// row; adding or removing a field invalidates all stored hashes and
/// requires a rehash migration.
pub fn import_hash(txn: &ParsedTransaction, source_key: &str) -> String {
    let data = format!(
        "{}|{}|{}|{}",
        txn.date,
        txn.amount.to_cents(),
        normalize_description(&txn.description),
        source_key,
    );
    let digest: [u8; 32] = Sha256::digest(data.as_bytes()).into();
    to_hex(&digest)
}

/// Case-fold and collapse whitespace so re-exports of the same statement
/// with trivial formatting differences still collide.
fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moneta_core::Money;

    fn txn(date: (i32, u32, u32), cents: i64, description: &str) -> ParsedTransaction {
        ParsedTransaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: description.to_string(),
            amount: Money::from_cents(cents),
            merchant: None,
            source_category: None,
            source_type: None,
        }
    }

    #[test]
    fn identical_input_identical_hash() {
        let a = txn((2024, 12, 15), -4523, "WHOLE FOODS MARKET");
        let b = txn((2024, 12, 15), -4523, "WHOLE FOODS MARKET");
        assert_eq!(import_hash(&a, "chase_credit"), import_hash(&b, "chase_credit"));
    }

    #[test]
    fn hash_is_64_hex_chars() {
        let h = import_hash(&txn((2024, 1, 1), 100, "X"), "venmo");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn whitespace_and_case_differences_collide() {
        let a = txn((2024, 12, 15), -4523, "WHOLE FOODS MARKET");
        let b = txn((2024, 12, 15), -4523, "  whole   foods market ");
        assert_eq!(import_hash(&a, "chase_credit"), import_hash(&b, "chase_credit"));
    }

    #[test]
    fn amount_sign_changes_hash() {
        let a = txn((2024, 12, 15), -4523, "WHOLE FOODS MARKET");
        let b = txn((2024, 12, 15), 4523, "WHOLE FOODS MARKET");
        assert_ne!(import_hash(&a, "chase_credit"), import_hash(&b, "chase_credit"));
    }

    #[test]
    fn date_changes_hash() {
        let a = txn((2024, 12, 15), -4523, "WHOLE FOODS MARKET");
        let b = txn((2024, 12, 16), -4523, "WHOLE FOODS MARKET");
        assert_ne!(import_hash(&a, "chase_credit"), import_hash(&b, "chase_credit"));
    }

    #[test]
    fn source_scope_changes_hash() {
        let a = txn((2024, 12, 15), -4523, "WHOLE FOODS MARKET");
        assert_ne!(import_hash(&a, "chase_credit"), import_hash(&a, "apple_card"));
    }
}

use std::collections::HashSet;

use moneta_core::{AccountId, Category, CategoryRule, NewTransaction};
use moneta_import::TransactionStore;

use crate::db::{self, DbPool};

/// The import pipeline's storage seam, backed by the sqlite pool. All SQL
/// stays on this side of the trait.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl TransactionStore for SqliteStore {
    type Error = sqlx::Error;

    async fn existing_hashes(&self, account: AccountId) -> Result<HashSet<String>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT import_hash FROM transactions WHERE account_id = ?",
        )
        .bind(account.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// One sqlx transaction around the whole batch: every row commits or
    /// none do. `INSERT OR IGNORE` rides the `UNIQUE(account_id,
    /// import_hash)` constraint, so a row a concurrent import landed first
    /// is dropped there and shows up only in the returned count.
    async fn insert_batch(&self, batch: &[NewTransaction]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;

        for txn in batch {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO transactions \
                 (account_id, date, amount_cents, description, merchant, \
                  category_id, source_category, import_hash) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(txn.account_id.0)
            .bind(txn.date)
            .bind(txn.amount.to_cents())
            .bind(&txn.description)
            .bind(&txn.merchant)
            .bind(txn.category_id.map(|c| c.0))
            .bind(&txn.source_category)
            .bind(&txn.import_hash)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn rules(&self) -> Result<Vec<CategoryRule>, sqlx::Error> {
        db::get_rules(&self.pool).await
    }

    async fn categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        db::get_categories(&self.pool).await
    }

    async fn record_import(
        &self,
        filename: &str,
        institution: &str,
        imported: usize,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO imports (filename, institution, transaction_count, status) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(filename)
        .bind(institution)
        .bind(imported as i64)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moneta_core::Money;
    use moneta_import::import_file;

    async fn test_store() -> (tempfile::TempDir, SqliteStore, AccountId) {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::create_db(&dir.path().join("test.db")).await.unwrap();
        db::seed_defaults(&pool).await.unwrap();
        let account = db::get_or_create_account(&pool, "Chase Checking", Some("Chase"), None)
            .await
            .unwrap();
        (dir, SqliteStore::new(pool), account.id.unwrap())
    }

    fn txn(account: AccountId, day: u32, description: &str, cents: i64, hash: &str) -> NewTransaction {
        NewTransaction {
            account_id: account,
            date: NaiveDate::from_ymd_opt(2024, 12, day).unwrap(),
            amount: Money::from_cents(cents),
            description: description.to_string(),
            merchant: None,
            category_id: None,
            source_category: None,
            import_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_batch_reports_how_many_landed() {
        let (_dir, store, account) = test_store().await;

        let first = store
            .insert_batch(&[
                txn(account, 15, "WHOLE FOODS", -4523, "h1"),
                txn(account, 16, "STARBUCKS", -550, "h2"),
            ])
            .await
            .unwrap();
        assert_eq!(first, 2);

        // Overlapping batch: the constraint swallows h2, only h3 lands.
        let second = store
            .insert_batch(&[
                txn(account, 16, "STARBUCKS", -550, "h2"),
                txn(account, 17, "SHELL OIL", -3200, "h3"),
            ])
            .await
            .unwrap();
        assert_eq!(second, 1);

        let hashes = store.existing_hashes(account).await.unwrap();
        assert_eq!(hashes.len(), 3);
        assert!(hashes.contains("h3"));
    }

    #[tokio::test]
    async fn dedup_is_scoped_per_account() {
        let (_dir, store, account) = test_store().await;
        let other = db::get_or_create_account(store.pool(), "Venmo", Some("Venmo"), None)
            .await
            .unwrap()
            .id
            .unwrap();

        store
            .insert_batch(&[txn(account, 15, "COFFEE", -450, "h1")])
            .await
            .unwrap();
        let inserted = store
            .insert_batch(&[txn(other, 15, "COFFEE", -450, "h1")])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        assert!(store.existing_hashes(account).await.unwrap().contains("h1"));
        assert!(store.existing_hashes(other).await.unwrap().contains("h1"));
    }

    #[tokio::test]
    async fn seeded_rules_reach_the_pipeline_through_the_trait() {
        let (_dir, store, _account) = test_store().await;
        let rules = store.rules().await.unwrap();
        assert!(rules.iter().any(|r| r.pattern == "WHOLE FOODS"));
        assert!(rules.iter().all(|r| r.enabled));
    }

    #[tokio::test]
    async fn end_to_end_import_is_idempotent_and_categorizes() {
        let (_dir, store, account) = test_store().await;
        let csv = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,12/15/2024,WHOLE FOODS MARKET #123,-45.23,ACH_DEBIT,1000.00,
CREDIT,12/17/2024,MYSTERY INCOME,2000.00,ACH_CREDIT,3000.00,
";

        let first = import_file(&store, account, "checking.csv", csv).await.unwrap();
        assert_eq!(first.imported, 2);
        assert_eq!(first.duplicates, 0);

        let second = import_file(&store, account, "checking.csv", csv).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 2);

        let groceries = db::get_category_by_name(store.pool(), "Groceries")
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();
        let rows = sqlx::query_as::<_, (String, Option<i64>)>(
            "SELECT description, category_id FROM transactions ORDER BY date",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, Some(groceries.0));
        // Nothing matched the income row; it persists uncategorized.
        assert_eq!(rows[1].1, None);

        let imports = sqlx::query_as::<_, (String, String)>(
            "SELECT filename, status FROM imports ORDER BY id",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0], ("checking.csv".to_string(), "success".to_string()));
    }

    #[tokio::test]
    async fn category_ids_survive_the_round_trip() {
        let (_dir, store, account) = test_store().await;
        let coffee = db::get_category_by_name(store.pool(), "Coffee")
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();

        let mut row = txn(account, 15, "BLUE BOTTLE", -600, "h1");
        row.category_id = Some(coffee);
        store.insert_batch(&[row]).await.unwrap();

        let (category_id,): (Option<i64>,) =
            sqlx::query_as("SELECT category_id FROM transactions WHERE import_hash = 'h1'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(category_id, Some(coffee.0));
    }
}

use std::collections::HashSet;

use moneta_core::{AccountId, Category, CategoryRule, NewTransaction};

/// The storage collaborator as the import pipeline sees it.
/// Implementations own all SQL and schema knowledge; the pipeline speaks
/// only in these operations.
#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Dedup hashes already persisted for this account scope.
    async fn existing_hashes(&self, account: AccountId) -> Result<HashSet<String>, Self::Error>;

    /// Persist a batch all-or-nothing and return how many rows actually
    /// landed. A unique constraint on (account, hash) must back this so
    /// a concurrent import cannot double-insert; rows it drops are
    /// reported through the count, not as an error.
    async fn insert_batch(&self, batch: &[NewTransaction]) -> Result<usize, Self::Error>;

    async fn rules(&self) -> Result<Vec<CategoryRule>, Self::Error>;

    async fn categories(&self) -> Result<Vec<Category>, Self::Error>;

    /// Append one entry to the import log. Bookkeeping only; a failure
    /// here must not undo a committed batch.
    async fn record_import(
        &self,
        filename: &str,
        institution: &str,
        imported: usize,
        status: &str,
    ) -> Result<(), Self::Error>;
}

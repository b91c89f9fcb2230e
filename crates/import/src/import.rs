use serde::Serialize;
use thiserror::Error;

use moneta_core::{AccountId, NewTransaction, SourceFormat};

use crate::detect::{detect, DetectError};
use crate::formats::ParseError;
use crate::hash::import_hash;
use crate::rules::RuleEngine;
use crate::store::TransactionStore;

/// Files past these bounds are rejected upfront rather than truncated.
pub const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMPORT_ROWS: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Success,
    Partial,
    Failed,
}

impl ImportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportStatus::Success => "success",
            ImportStatus::Partial => "partial",
            ImportStatus::Failed => "failed",
        }
    }
}

/// What one file import did, row by row accounted: every parsed row ends
/// up imported, counted as a duplicate, or listed as a row error.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub filename: String,
    pub format: SourceFormat,
    pub rows_seen: usize,
    pub rows_parsed: usize,
    pub duplicates: usize,
    pub imported: usize,
    pub errors: Vec<String>,
    pub status: ImportStatus,
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("file is {size} bytes; the import limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("file has {rows} lines; the import limit is {limit}")]
    TooManyRows { rows: usize, limit: usize },
    #[error(transparent)]
    Unrecognized(#[from] DetectError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("storage failure, nothing imported: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Run one raw statement file through the whole pipeline: detect the
/// format, parse, deduplicate against what the account already holds,
/// categorize, and persist the survivors atomically.
///
/// Row-level problems and duplicates are counted outcomes in the report;
/// only an unrecognizable file or a storage failure aborts the import,
/// and then nothing is persisted.
pub async fn import_file<S: TransactionStore>(
    store: &S,
    account_id: AccountId,
    filename: &str,
    content: &str,
) -> Result<ImportReport, ImportError> {
    if content.len() > MAX_IMPORT_BYTES {
        return Err(ImportError::TooLarge {
            size: content.len(),
            limit: MAX_IMPORT_BYTES,
        });
    }
    let lines = content.lines().count();
    if lines > MAX_IMPORT_ROWS {
        return Err(ImportError::TooManyRows {
            rows: lines,
            limit: MAX_IMPORT_ROWS,
        });
    }

    let parser = detect(content)?;
    let result = parser.parse(content)?;
    tracing::debug!(
        filename,
        format = %result.format,
        rows_seen = result.rows_seen,
        rows_parsed = result.rows_parsed(),
        "parsed statement"
    );

    let engine = RuleEngine::new(store.rules().await.map_err(storage)?);
    let mut seen = store.existing_hashes(account_id).await.map_err(storage)?;

    let mut duplicates = 0;
    let mut batch = Vec::new();
    for txn in &result.transactions {
        let hash = import_hash(txn, result.format.key());
        // Covers both re-imports and the same transaction appearing twice
        // in one file: the second occurrence is a duplicate either way.
        if !seen.insert(hash.clone()) {
            duplicates += 1;
            continue;
        }
        batch.push(NewTransaction {
            account_id,
            date: txn.date,
            amount: txn.amount,
            description: txn.description.clone(),
            merchant: txn.merchant.clone(),
            category_id: engine.categorize(&txn.description),
            source_category: txn.source_category.clone(),
            import_hash: hash,
        });
    }

    let imported = if batch.is_empty() {
        0
    } else {
        store.insert_batch(&batch).await.map_err(storage)?
    };
    // A concurrent import may have landed some of these hashes between
    // the read and the insert; the unique constraint dropped them there
    // and they count as duplicates here.
    duplicates += batch.len() - imported;

    let status = if result.errors.is_empty() {
        ImportStatus::Success
    } else if imported > 0 {
        ImportStatus::Partial
    } else {
        ImportStatus::Failed
    };

    if let Err(e) = store
        .record_import(filename, result.format.institution(), imported, status.as_str())
        .await
    {
        tracing::warn!(filename, error = %e, "failed to record import log entry");
    }

    tracing::info!(
        filename,
        imported,
        duplicates,
        errors = result.errors.len(),
        "import finished"
    );

    Ok(ImportReport {
        filename: filename.to_string(),
        format: result.format,
        rows_seen: result.rows_seen,
        rows_parsed: result.rows_parsed(),
        duplicates,
        imported,
        errors: result.errors.iter().map(ToString::to_string).collect(),
        status,
    })
}

fn storage<E: std::error::Error + Send + Sync + 'static>(e: E) -> ImportError {
    ImportError::Storage(Box::new(e))
}

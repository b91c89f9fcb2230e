use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use moneta_import::{detect, import_file, ImportReport};
use moneta_storage::{DbPool, SqliteStore};

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "moneta", "Moneta")
        .context("could not determine the platform data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("could not create {}", data_dir.display()))?;
    Ok(data_dir.join("moneta.db"))
}

/// Open the database, running migrations and seeding on the way. Both are
/// idempotent, so every command can bootstrap unconditionally.
async fn bootstrap(path: &Path) -> anyhow::Result<DbPool> {
    let pool = moneta_storage::create_db(path)
        .await
        .with_context(|| format!("could not open database at {}", path.display()))?;
    moneta_storage::seed_defaults(&pool).await?;
    Ok(pool)
}

pub async fn init(db_path: &Path) -> anyhow::Result<()> {
    bootstrap(db_path).await?;
    println!("Initialized database at {}", db_path.display());
    Ok(())
}

pub async fn import(
    db_path: &Path,
    files: &[PathBuf],
    account: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let pool = bootstrap(db_path).await?;
    let store = SqliteStore::new(pool.clone());

    let mut failed = 0usize;
    for file in files {
        if let Err(e) = import_one(&pool, &store, file, account, json).await {
            failed += 1;
            eprintln!("{}: {e:#}", file.display());
        }
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) failed to import", files.len());
    }
    Ok(())
}

async fn import_one(
    pool: &DbPool,
    store: &SqliteStore,
    file: &Path,
    account: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;

    // Detection runs again inside the pipeline; this probe only picks the
    // account the file lands in when the user did not name one.
    let format = detect(&content)?.format();
    let account_name = account.unwrap_or_else(|| format.default_account_name());
    let account =
        moneta_storage::get_or_create_account(pool, account_name, Some(format.institution()), None)
            .await?;
    let account_id = account.id.context("account row is missing its id")?;

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement.csv");
    let report = import_file(store, account_id, filename, &content).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, account_name);
    }
    Ok(())
}

fn print_report(report: &ImportReport, account_name: &str) {
    println!(
        "{} ({} -> {}): {} rows seen, {} imported, {} duplicates, {} errors",
        report.filename,
        report.format,
        account_name,
        report.rows_seen,
        report.imported,
        report.duplicates,
        report.errors.len(),
    );
    for error in &report.errors {
        println!("  {error}");
    }
}

pub async fn accounts_list(db_path: &Path) -> anyhow::Result<()> {
    let pool = bootstrap(db_path).await?;
    let accounts = moneta_storage::get_all_accounts(&pool).await?;

    if accounts.is_empty() {
        println!("No accounts yet; one is created on first import.");
        return Ok(());
    }
    for account in accounts {
        let id = account.id.map(|id| id.0).unwrap_or_default();
        match account.institution {
            Some(institution) => println!("{id:>4}  {}  ({institution})", account.name),
            None => println!("{id:>4}  {}", account.name),
        }
    }
    Ok(())
}

pub async fn rules_list(db_path: &Path) -> anyhow::Result<()> {
    let pool = bootstrap(db_path).await?;
    let categories: HashMap<_, _> = moneta_storage::get_categories(&pool)
        .await?
        .into_iter()
        .filter_map(|c| c.id.map(|id| (id, c.name)))
        .collect();

    for rule in moneta_storage::get_rules(&pool).await? {
        let category = categories
            .get(&rule.category_id)
            .map(String::as_str)
            .unwrap_or("?");
        let state = if rule.enabled { "" } else { "  (disabled)" };
        println!(
            "{:>4}  p{:<4} {:<24} -> {category}{state}",
            rule.id.unwrap_or_default(),
            rule.priority,
            rule.pattern,
        );
    }
    Ok(())
}

pub async fn rules_add(
    db_path: &Path,
    pattern: &str,
    category_name: &str,
    priority: i32,
) -> anyhow::Result<()> {
    let pool = bootstrap(db_path).await?;
    let category = moneta_storage::get_category_by_name(&pool, category_name)
        .await?
        .with_context(|| format!("unknown category {category_name:?}; see `moneta categories list`"))?;
    let category_id = category.id.context("category row is missing its id")?;

    let rule_id = moneta_storage::add_rule(&pool, pattern, category_id, priority).await?;
    println!("Added rule {rule_id}: {pattern:?} -> {category_name} (priority {priority})");
    Ok(())
}

pub async fn rules_delete(db_path: &Path, id: i64) -> anyhow::Result<()> {
    let pool = bootstrap(db_path).await?;
    if !moneta_storage::delete_rule(&pool, id).await? {
        bail!("no rule with id {id}");
    }
    println!("Deleted rule {id}");
    Ok(())
}

pub async fn categories_list(db_path: &Path) -> anyhow::Result<()> {
    let pool = bootstrap(db_path).await?;
    let categories = moneta_storage::get_categories(&pool).await?;

    for parent in categories.iter().filter(|c| c.parent_id.is_none()) {
        println!("{}", parent.name);
        for child in categories.iter().filter(|c| c.parent_id == parent.id) {
            println!("  {}", child.name);
        }
    }
    Ok(())
}

use moneta_core::{Account, AccountId, Category, CategoryId, CategoryRule};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            institution TEXT,
            account_type TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            parent_id INTEGER REFERENCES categories(id),
            color TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS category_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pattern TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            priority INTEGER NOT NULL DEFAULT 0,
            enabled INTEGER NOT NULL DEFAULT 1,
            UNIQUE(pattern, category_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL REFERENCES accounts(id),
            date TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            description TEXT NOT NULL,
            merchant TEXT,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            source_category TEXT,
            import_hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(account_id, import_hash)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS imports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            institution TEXT,
            imported_at TEXT NOT NULL DEFAULT (datetime('now')),
            transaction_count INTEGER NOT NULL,
            status TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for ddl in [
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)",
        "CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id)",
        "CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_category_rules_priority ON category_rules(priority DESC)",
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }

    Ok(())
}

/// Seed the built-in category tree and rule set. Keyed by name/pattern
/// identity, so re-running is a no-op rather than a duplicate insert.
pub async fn seed_defaults(pool: &DbPool) -> Result<(), sqlx::Error> {
    for (name, color) in moneta_core::SEED_CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (name, parent_id, color) VALUES (?, NULL, ?)")
            .bind(name)
            .bind(color)
            .execute(pool)
            .await?;
    }

    for (parent, children) in moneta_core::SEED_SUBCATEGORIES {
        for child in *children {
            sqlx::query(
                "INSERT OR IGNORE INTO categories (name, parent_id, color) \
                 VALUES (?, (SELECT id FROM categories WHERE name = ?), NULL)",
            )
            .bind(child)
            .bind(parent)
            .execute(pool)
            .await?;
        }
    }

    for (pattern, category, priority) in moneta_core::SEED_RULES {
        sqlx::query(
            "INSERT OR IGNORE INTO category_rules (pattern, category_id, priority) \
             VALUES (?, (SELECT id FROM categories WHERE name = ?), ?)",
        )
        .bind(pattern)
        .bind(category)
        .bind(priority)
        .execute(pool)
        .await?;
    }

    Ok(())
}

// ── accounts ─────────────────────────────────────────────────────────────────

pub async fn get_or_create_account(
    pool: &DbPool,
    name: &str,
    institution: Option<&str>,
    account_type: Option<&str>,
) -> Result<Account, sqlx::Error> {
    let existing = sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
        "SELECT id, name, institution, account_type FROM accounts WHERE name = ? AND institution IS ?",
    )
    .bind(name)
    .bind(institution)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        return Ok(account_from_row(row));
    }

    let result = sqlx::query("INSERT INTO accounts (name, institution, account_type) VALUES (?, ?, ?)")
        .bind(name)
        .bind(institution)
        .bind(account_type)
        .execute(pool)
        .await?;

    Ok(Account {
        id: Some(AccountId(result.last_insert_rowid())),
        name: name.to_string(),
        institution: institution.map(|s| s.to_string()),
        account_type: account_type.map(|s| s.to_string()),
    })
}

pub async fn get_account(pool: &DbPool, id: AccountId) -> Result<Option<Account>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
        "SELECT id, name, institution, account_type FROM accounts WHERE id = ?",
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(account_from_row))
}

pub async fn get_all_accounts(pool: &DbPool) -> Result<Vec<Account>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>, Option<String>)>(
        "SELECT id, name, institution, account_type FROM accounts ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(account_from_row).collect())
}

fn account_from_row(row: (i64, String, Option<String>, Option<String>)) -> Account {
    Account {
        id: Some(AccountId(row.0)),
        name: row.1,
        institution: row.2,
        account_type: row.3,
    }
}

// ── categories ───────────────────────────────────────────────────────────────

pub async fn get_categories(pool: &DbPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, Option<i64>, Option<String>)>(
        "SELECT id, name, parent_id, color FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Category {
            id: Some(CategoryId(r.0)),
            name: r.1,
            parent_id: r.2.map(CategoryId),
            color: r.3,
        })
        .collect())
}

pub async fn get_category_by_name(
    pool: &DbPool,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, Option<i64>, Option<String>)>(
        "SELECT id, name, parent_id, color FROM categories WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| Category {
        id: Some(CategoryId(r.0)),
        name: r.1,
        parent_id: r.2.map(CategoryId),
        color: r.3,
    }))
}

pub async fn create_category(
    pool: &DbPool,
    name: &str,
    parent_id: Option<CategoryId>,
    color: Option<&str>,
) -> Result<CategoryId, sqlx::Error> {
    let result = sqlx::query("INSERT INTO categories (name, parent_id, color) VALUES (?, ?, ?)")
        .bind(name)
        .bind(parent_id.map(|c| c.0))
        .bind(color)
        .execute(pool)
        .await?;
    Ok(CategoryId(result.last_insert_rowid()))
}

/// Deleting a category never silently recategorizes anything: its
/// transactions drop back to uncategorized (the schema's SET NULL), its
/// rules are removed (CASCADE), and its children move to top level.
pub async fn delete_category(pool: &DbPool, id: CategoryId) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE categories SET parent_id = NULL WHERE parent_id = ?")
        .bind(id.0)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id.0)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

// ── rules ────────────────────────────────────────────────────────────────────

/// Rules in evaluation order: priority descending, insertion order as the
/// tiebreak (rowid order is insertion order).
pub async fn get_rules(pool: &DbPool) -> Result<Vec<CategoryRule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64, i32, i64)>(
        "SELECT id, pattern, category_id, priority, enabled FROM category_rules \
         ORDER BY priority DESC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| CategoryRule {
            id: Some(r.0),
            pattern: r.1,
            category_id: CategoryId(r.2),
            priority: r.3,
            enabled: r.4 != 0,
        })
        .collect())
}

pub async fn add_rule(
    pool: &DbPool,
    pattern: &str,
    category_id: CategoryId,
    priority: i32,
) -> Result<i64, sqlx::Error> {
    let result =
        sqlx::query("INSERT INTO category_rules (pattern, category_id, priority) VALUES (?, ?, ?)")
            .bind(pattern)
            .bind(category_id.0)
            .bind(priority)
            .execute(pool)
            .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_rule(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM category_rules WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

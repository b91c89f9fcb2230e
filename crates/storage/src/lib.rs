pub mod db;
pub mod store;

pub use db::{
    add_rule, create_category, create_db, delete_category, delete_rule, get_account,
    get_all_accounts, get_categories, get_category_by_name, get_or_create_account, get_rules,
    seed_defaults, DbPool,
};
pub use store::SqliteStore;

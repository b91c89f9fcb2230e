pub mod account;
pub mod category;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountId};
pub use category::{
    Category, CategoryId, CategoryRule, SEED_CATEGORIES, SEED_RULES, SEED_SUBCATEGORIES,
};
pub use money::Money;
pub use transaction::{NewTransaction, ParseResult, ParsedTransaction, RowError, SourceFormat};

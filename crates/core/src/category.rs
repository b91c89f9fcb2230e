use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spending category. The parent link builds a display tree; a
/// transaction always carries at most one category, never the whole chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<CategoryId>,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub color: Option<String>,
}

impl Category {
    pub fn new(name: &str, parent_id: Option<CategoryId>, color: Option<&str>) -> Self {
        Category {
            id: None,
            name: name.to_string(),
            parent_id,
            color: color.map(|s| s.to_string()),
        }
    }
}

/// One auto-categorization rule: a case-insensitive substring pattern
/// tried against transaction descriptions. Rules are totally ordered by
/// priority descending, then by insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: Option<i64>,
    pub pattern: String,
    pub category_id: CategoryId,
    pub priority: i32,
    pub enabled: bool,
}

impl CategoryRule {
    pub fn new(pattern: &str, category_id: CategoryId, priority: i32) -> Self {
        CategoryRule {
            id: None,
            pattern: pattern.to_string(),
            category_id,
            priority,
            enabled: true,
        }
    }
}

/// Top-level seed categories with their display colors.
pub const SEED_CATEGORIES: &[(&str, &str)] = &[
    ("Income", "#22c55e"),
    ("Housing", "#3b82f6"),
    ("Transportation", "#f59e0b"),
    ("Food", "#ef4444"),
    ("Shopping", "#8b5cf6"),
    ("Entertainment", "#ec4899"),
    ("Health", "#14b8a6"),
    ("Financial", "#64748b"),
    ("Transfers", "#94a3b8"),
    ("Uncategorized", "#d1d5db"),
];

pub const SEED_SUBCATEGORIES: &[(&str, &[&str])] = &[
    ("Income", &["Salary", "Freelance", "Refunds", "Interest"]),
    ("Housing", &["Rent/Mortgage", "Utilities", "Home Insurance", "Maintenance"]),
    (
        "Transportation",
        &["Gas", "Public Transit", "Rideshare", "Car Insurance", "Parking"],
    ),
    ("Food", &["Groceries", "Dining Out", "Coffee", "Alcohol"]),
    ("Shopping", &["Clothing", "Electronics", "Home Goods", "Gifts"]),
    ("Entertainment", &["Subscriptions", "Events", "Hobbies", "Travel"]),
    ("Health", &["Medical", "Pharmacy", "Fitness", "Personal Care"]),
    ("Financial", &["Investments", "Fees", "Taxes"]),
];

/// Built-in rules seeded at init: (pattern, category name, priority).
/// Seeding is keyed by pattern, so re-running init never duplicates them.
pub const SEED_RULES: &[(&str, &str, i32)] = &[
    // Groceries
    ("WHOLE FOODS", "Groceries", 10),
    ("TRADER JOE", "Groceries", 10),
    ("KROGER", "Groceries", 10),
    ("SAFEWAY", "Groceries", 10),
    ("TARGET", "Shopping", 5),
    ("COSTCO", "Groceries", 10),
    ("ALDI", "Groceries", 10),
    // Dining
    ("DOORDASH", "Dining Out", 10),
    ("UBER EATS", "Dining Out", 10),
    ("GRUBHUB", "Dining Out", 10),
    ("MCDONALD", "Dining Out", 10),
    ("STARBUCKS", "Coffee", 10),
    ("DUNKIN", "Coffee", 10),
    // Transportation
    ("UBER TRIP", "Rideshare", 10),
    ("LYFT", "Rideshare", 10),
    ("SHELL", "Gas", 10),
    ("CHEVRON", "Gas", 10),
    ("EXXON", "Gas", 10),
    ("BP ", "Gas", 10),
    // Subscriptions
    ("SPOTIFY", "Subscriptions", 10),
    ("NETFLIX", "Subscriptions", 10),
    ("APPLE.COM/BILL", "Subscriptions", 10),
    ("AMAZON PRIME", "Subscriptions", 10),
    ("HBO MAX", "Subscriptions", 10),
    ("HULU", "Subscriptions", 10),
    // Health
    ("CVS", "Pharmacy", 10),
    ("WALGREENS", "Pharmacy", 10),
    // Financial
    ("VANGUARD", "Investments", 10),
    ("TRANSFER TO", "Transfers", 10),
    ("TRANSFER FROM", "Transfers", 10),
    ("ZELLE", "Transfers", 10),
];

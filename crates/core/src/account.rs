use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where imported transactions live. Deduplication is scoped per account,
/// so two accounts may legitimately hold byte-identical transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<AccountId>,
    pub name: String,
    pub institution: Option<String>,
    pub account_type: Option<String>,
}

impl Account {
    pub fn new(name: &str, institution: Option<&str>, account_type: Option<&str>) -> Self {
        Account {
            id: None,
            name: name.to_string(),
            institution: institution.map(|s| s.to_string()),
            account_type: account_type.map(|s| s.to_string()),
        }
    }
}

use moneta_core::{CategoryId, CategoryRule};

/// Priority-ordered categorization over case-insensitive substring rules.
/// Construction sorts once; matching is a pure function of the rule list
/// and the description, so bulk re-categorization after rule edits is
/// reproducible.
pub struct RuleEngine {
    rules: Vec<CategoryRule>,
}

impl RuleEngine {
    pub fn new(mut rules: Vec<CategoryRule>) -> Self {
        rules.retain(|rule| rule.enabled);
        // Stable sort: rules with equal priority keep their insertion
        // order, which is the documented tiebreak.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// First matching rule in priority order, if any.
    pub fn first_match(&self, description: &str) -> Option<&CategoryRule> {
        let text = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| text.contains(&rule.pattern.to_lowercase()))
    }

    /// No match is a valid terminal state, not an error; the transaction
    /// stays uncategorized for the user to follow up.
    pub fn categorize(&self, description: &str) -> Option<CategoryId> {
        self.first_match(description).map(|rule| rule.category_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

//! Planner configuration: the category vocabulary and allocation policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{PlannerError, Result};

const DEFAULT_INCOME: &[&str] = &[
    "salary",
    "wages",
    "bonus",
    "interest",
    "dividends",
    "gift",
    "refund",
];

const DEFAULT_EXPENSE: &[&str] = &[
    "rent",
    "food",
    "groceries",
    "utilities",
    "transportation",
    "insurance",
    "healthcare",
    "entertainment",
    "clothing",
    "education",
    "savings",
];

const DEFAULT_AMBIGUOUS: &str = "other";
const DEFAULT_PROTECTED: &[&str] = &["rent"];

/// Vocabulary and policy used by a planning session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlannerConfig {
    pub income_categories: BTreeSet<String>,
    pub expense_categories: BTreeSet<String>,
    pub ambiguous_category: String,
    /// Expense categories that reduction plans never touch.
    pub protected_categories: BTreeSet<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            income_categories: to_set(DEFAULT_INCOME),
            expense_categories: to_set(DEFAULT_EXPENSE),
            ambiguous_category: DEFAULT_AMBIGUOUS.into(),
            protected_categories: to_set(DEFAULT_PROTECTED),
        }
    }
}

impl PlannerConfig {
    /// Parses a JSON document, normalizes every name, and validates the result.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: PlannerConfig = serde_json::from_str(raw)?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Lowercases and trims every category name.
    pub fn normalized(self) -> Self {
        Self {
            income_categories: normalize_set(self.income_categories),
            expense_categories: normalize_set(self.expense_categories),
            ambiguous_category: normalize_name(&self.ambiguous_category),
            protected_categories: normalize_set(self.protected_categories),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let names = self
            .income_categories
            .iter()
            .chain(self.expense_categories.iter())
            .chain(std::iter::once(&self.ambiguous_category))
            .chain(self.protected_categories.iter());
        for name in names {
            if name.trim().is_empty() {
                return Err(PlannerError::Config("category names must not be empty".into()));
            }
            if name.chars().any(char::is_numeric) {
                return Err(PlannerError::Config(format!(
                    "category `{}` must not contain digits",
                    name
                )));
            }
        }

        if let Some(shared) = self
            .income_categories
            .intersection(&self.expense_categories)
            .next()
        {
            return Err(PlannerError::Config(format!(
                "category `{}` is listed as both income and expense",
                shared
            )));
        }

        if self.income_categories.contains(&self.ambiguous_category)
            || self.expense_categories.contains(&self.ambiguous_category)
        {
            return Err(PlannerError::Config(format!(
                "ambiguous category `{}` must not appear in the income or expense lists",
                self.ambiguous_category
            )));
        }

        if let Some(stray) = self
            .protected_categories
            .iter()
            .find(|name| !self.expense_categories.contains(*name))
        {
            return Err(PlannerError::Config(format!(
                "protected category `{}` is not an expense category",
                stray
            )));
        }

        Ok(())
    }

    pub fn is_protected(&self, category: &str) -> bool {
        self.protected_categories.contains(&normalize_name(category))
    }
}

/// Canonical form used for every category lookup.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn normalize_set(names: BTreeSet<String>) -> BTreeSet<String> {
    names.iter().map(|name| normalize_name(name)).collect()
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

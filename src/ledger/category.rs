//! Category vocabulary and classification.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::config::{normalize_name, PlannerConfig};
use crate::ledger::Money;

const SUGGESTION_MAX_DISTANCE: usize = 2;

/// Resolved category type carried by every accepted record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    /// Type implied by the sign of an amount; zero counts as an expense.
    pub fn from_sign(amount: Money) -> Self {
        if amount.is_positive() {
            CategoryType::Income
        } else {
            CategoryType::Expense
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryType::Income => "Income",
            CategoryType::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Outcome of looking a name up in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Income,
    Expense,
    /// The polymorphic category whose type follows the amount sign.
    Ambiguous,
    Unrecognized,
}

impl Classification {
    /// Static type, if the classification has one.
    pub fn fixed_type(self) -> Option<CategoryType> {
        match self {
            Classification::Income => Some(CategoryType::Income),
            Classification::Expense => Some(CategoryType::Expense),
            Classification::Ambiguous | Classification::Unrecognized => None,
        }
    }

    /// Concrete type for a record with the given amount. Unrecognized names
    /// never resolve.
    pub fn resolve(self, amount: Money) -> Option<CategoryType> {
        match self {
            Classification::Ambiguous => Some(CategoryType::from_sign(amount)),
            other => other.fixed_type(),
        }
    }
}

/// Case-insensitive lookup over the fixed income and expense vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    income: BTreeSet<String>,
    expense: BTreeSet<String>,
    ambiguous: String,
}

impl Classifier {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            income: config.income_categories.iter().map(|n| normalize_name(n)).collect(),
            expense: config.expense_categories.iter().map(|n| normalize_name(n)).collect(),
            ambiguous: normalize_name(&config.ambiguous_category),
        }
    }

    pub fn classify(&self, name: &str) -> Classification {
        let normalized = normalize_name(name);
        if normalized == self.ambiguous {
            Classification::Ambiguous
        } else if self.income.contains(&normalized) {
            Classification::Income
        } else if self.expense.contains(&normalized) {
            Classification::Expense
        } else {
            Classification::Unrecognized
        }
    }

    pub fn is_ambiguous(&self, name: &str) -> bool {
        normalize_name(name) == self.ambiguous
    }

    /// Closest known name to an unrecognized one, if any is near enough.
    pub fn suggest(&self, name: &str) -> Option<String> {
        let normalized = normalize_name(name);
        self.known_names()
            .map(|known| (levenshtein(known, &normalized), known))
            .filter(|(distance, _)| *distance <= SUGGESTION_MAX_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, known)| known.to_string())
    }

    fn known_names(&self) -> impl Iterator<Item = &str> {
        self.income
            .iter()
            .chain(self.expense.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.ambiguous.as_str()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_fixed_vocabulary_case_insensitively() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("Salary"), Classification::Income);
        assert_eq!(classifier.classify("  FOOD "), Classification::Expense);
        assert_eq!(classifier.classify("Other"), Classification::Ambiguous);
        assert_eq!(classifier.classify("lottery"), Classification::Unrecognized);
        assert_eq!(classifier.classify(""), Classification::Unrecognized);
    }

    #[test]
    fn ambiguous_resolves_by_sign() {
        let ambiguous = Classification::Ambiguous;
        assert_eq!(
            ambiguous.resolve(Money::from_units(10)),
            Some(CategoryType::Income)
        );
        assert_eq!(
            ambiguous.resolve(Money::from_units(-10)),
            Some(CategoryType::Expense)
        );
        assert_eq!(ambiguous.resolve(Money::zero()), Some(CategoryType::Expense));
        assert_eq!(ambiguous.fixed_type(), None);
        assert_eq!(Classification::Unrecognized.resolve(Money::from_units(1)), None);
    }

    #[test]
    fn fixed_types_ignore_amount_sign() {
        assert_eq!(
            Classification::Income.resolve(Money::from_units(-5)),
            Some(CategoryType::Income)
        );
        assert_eq!(
            Classification::Expense.resolve(Money::from_units(5)),
            Some(CategoryType::Expense)
        );
    }

    #[test]
    fn suggests_near_misses_only() {
        let classifier = Classifier::default();
        assert_eq!(classifier.suggest("fod"), Some("food".to_string()));
        assert_eq!(classifier.suggest("Rnet"), Some("rent".to_string()));
        assert_eq!(classifier.suggest("cryptocurrency"), None);
    }
}

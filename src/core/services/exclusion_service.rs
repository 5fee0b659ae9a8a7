//! Temporary removal and restoration of a category's contribution.

use tracing::info;

use crate::config::normalize_name;
use crate::ledger::{Classification, ExcludedCategory, Ledger, Money};

use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionOutcome {
    /// The category was active and its value is now parked.
    Excluded(ExcludedCategory),
    AlreadyExcluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionOutcome {
    /// The parked value was folded back into the active totals.
    Restored(ExcludedCategory),
    AlreadyActive,
}

pub struct ExclusionService;

impl ExclusionService {
    /// Moves `name` from the active totals into the exclusion set.
    pub fn exclude(ledger: &mut Ledger, name: &str) -> ServiceResult<ExclusionOutcome> {
        let key = normalize_name(name);
        if ledger.excluded.contains_key(&key) {
            info!(category = %key, "category already excluded; nothing to do");
            return Ok(ExclusionOutcome::AlreadyExcluded);
        }
        let total = ledger
            .category_totals
            .get(&key)
            .copied()
            .ok_or_else(|| ServiceError::NotFound(key.clone()))?;

        let ambiguous = ledger.classifier.is_ambiguous(&key);
        let parked = if ambiguous {
            ExcludedCategory {
                total,
                income: ledger.other_income,
                expense: ledger.other_expense,
            }
        } else if ledger.classifier.classify(&key) == Classification::Income {
            ExcludedCategory {
                total,
                income: total,
                expense: Money::zero(),
            }
        } else {
            ExcludedCategory {
                total,
                income: Money::zero(),
                expense: total,
            }
        };
        let out_of_range = || ServiceError::OutOfRange(format!("excluding `{}`", key));
        let total_income = ledger
            .total_income
            .checked_sub(parked.income)
            .ok_or_else(out_of_range)?;
        let total_expenses = ledger
            .total_expenses
            .checked_sub(parked.expense)
            .ok_or_else(out_of_range)?;

        ledger.category_totals.remove(&key);
        if ambiguous {
            ledger.other_income = Money::zero();
            ledger.other_expense = Money::zero();
        }
        ledger.total_income = total_income;
        ledger.total_expenses = total_expenses;
        ledger.excluded.insert(key.clone(), parked);

        info!(category = %key, value = %total, "category excluded");
        Ok(ExclusionOutcome::Excluded(parked))
    }

    /// Folds a parked category back into the structure it was taken from.
    ///
    /// Spends applied while the category was parked can leave no room for its
    /// value; the category then stays excluded and `OutOfRange` is returned.
    pub fn include(ledger: &mut Ledger, name: &str) -> ServiceResult<InclusionOutcome> {
        let key = normalize_name(name);
        if ledger.category_totals.contains_key(&key) {
            info!(category = %key, "category already active; nothing to do");
            return Ok(InclusionOutcome::AlreadyActive);
        }
        let parked = ledger
            .excluded
            .get(&key)
            .copied()
            .ok_or_else(|| ServiceError::NotFound(key.clone()))?;

        let out_of_range = || ServiceError::OutOfRange(format!("restoring `{}`", key));
        let total_income = ledger
            .total_income
            .checked_add(parked.income)
            .ok_or_else(out_of_range)?;
        let total_expenses = ledger
            .total_expenses
            .checked_add(parked.expense)
            .ok_or_else(out_of_range)?;
        let ambiguous = ledger.classifier.is_ambiguous(&key);
        let (other_income, other_expense) = if ambiguous {
            (
                ledger.other_income.checked_add(parked.income).ok_or_else(out_of_range)?,
                ledger.other_expense.checked_add(parked.expense).ok_or_else(out_of_range)?,
            )
        } else {
            (ledger.other_income, ledger.other_expense)
        };

        ledger.excluded.remove(&key);
        ledger.total_income = total_income;
        ledger.total_expenses = total_expenses;
        ledger.other_income = other_income;
        ledger.other_expense = other_expense;
        ledger.category_totals.insert(key.clone(), parked.total);

        info!(category = %key, value = %parked.total, "category restored");
        Ok(InclusionOutcome::Restored(parked))
    }

    pub fn list_excluded(ledger: &Ledger) -> Vec<&str> {
        ledger.excluded.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ScenarioSimulator;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.load(vec![
            ("04/01/2024", "salary", "2000"),
            ("04/02/2024", "food", "-300"),
            ("04/03/2024", "rent", "-900"),
            ("04/04/2024", "other", "120"),
            ("04/05/2024", "other", "-20"),
        ]);
        ledger
    }

    #[test]
    fn exclude_removes_category_from_every_aggregate() {
        let mut ledger = sample_ledger();
        let outcome = ExclusionService::exclude(&mut ledger, "Food").expect("food exists");
        assert_eq!(
            outcome,
            ExclusionOutcome::Excluded(ExcludedCategory {
                total: Money::from_units(-300),
                income: Money::zero(),
                expense: Money::from_units(-300),
            })
        );
        assert_eq!(ledger.category_total("food"), None);
        assert_eq!(ledger.total_expenses(), Money::from_units(-920));
        assert!(!ledger.percentage_by_category().contains_key("food"));
        assert_eq!(ExclusionService::list_excluded(&ledger), vec!["food"]);
    }

    #[test]
    fn include_restores_exact_pre_exclusion_state() {
        let mut ledger = sample_ledger();
        let before = ledger.snapshot();
        ExclusionService::exclude(&mut ledger, "food").expect("exclude");
        let outcome = ExclusionService::include(&mut ledger, "FOOD").expect("include");
        assert!(matches!(outcome, InclusionOutcome::Restored(_)));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn ambiguous_category_round_trips_both_parts() {
        let mut ledger = sample_ledger();
        let before = ledger.snapshot();
        ExclusionService::exclude(&mut ledger, "other").expect("exclude other");
        assert_eq!(ledger.other_income(), Money::zero());
        assert_eq!(ledger.other_expense(), Money::zero());
        assert_eq!(ledger.total_income(), Money::from_units(2000));
        assert_eq!(ledger.total_expenses(), Money::from_units(-1200));
        ExclusionService::include(&mut ledger, "other").expect("include other");
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn double_calls_are_no_ops() {
        let mut ledger = sample_ledger();
        ExclusionService::exclude(&mut ledger, "food").expect("first exclude");
        let after_first = ledger.snapshot();
        let second = ExclusionService::exclude(&mut ledger, "food").expect("second exclude");
        assert_eq!(second, ExclusionOutcome::AlreadyExcluded);
        assert_eq!(ledger.snapshot(), after_first);

        let outcome = ExclusionService::include(&mut ledger, "rent").expect("rent is active");
        assert_eq!(outcome, InclusionOutcome::AlreadyActive);
    }

    #[test]
    fn unknown_categories_are_not_found() {
        let mut ledger = sample_ledger();
        assert_eq!(
            ExclusionService::exclude(&mut ledger, "clothing"),
            Err(ServiceError::NotFound("clothing".into()))
        );
        assert_eq!(
            ExclusionService::include(&mut ledger, "clothing"),
            Err(ServiceError::NotFound("clothing".into()))
        );
    }

    #[test]
    fn include_without_room_keeps_category_parked() {
        let mut ledger = Ledger::default();
        let report = ledger.load(vec![
            ("04/01/2024", "salary", "90000000000000000"),
            ("04/02/2024", "food", "-90000000000000000"),
            ("04/03/2024", "rent", "-1"),
        ]);
        assert!(report.is_clean());
        ExclusionService::exclude(&mut ledger, "food").expect("exclude");
        ScenarioSimulator::apply(&mut ledger, "rent", Money::from_units(80_000_000_000_000_000))
            .expect("spend fits the surplus");
        let before = ledger.snapshot();

        assert_eq!(
            ExclusionService::include(&mut ledger, "food"),
            Err(ServiceError::OutOfRange("restoring `food`".into()))
        );
        assert!(ledger.is_excluded("food"));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn category_lives_in_exactly_one_partition() {
        let mut ledger = sample_ledger();
        for name in ["food", "salary", "other"] {
            ExclusionService::exclude(&mut ledger, name).expect("exclude");
            assert!(ledger.is_excluded(name));
            assert!(ledger.category_total(name).is_none());
            ExclusionService::include(&mut ledger, name).expect("include");
            assert!(!ledger.is_excluded(name));
            assert!(ledger.category_total(name).is_some());
        }
    }
}

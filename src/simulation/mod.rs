//! What-if spending against the current surplus.
//!
//! `simulate` only answers the question; `apply` commits the spend to the
//! in-memory aggregate, so repeated applies compound on the latest state.

use tracing::{debug, info};

use crate::config::normalize_name;
use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{Classification, Ledger, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationOutcome {
    Possible,
    NotPossible { surplus: Money, shortfall: Money },
}

impl SimulationOutcome {
    pub fn is_possible(&self) -> bool {
        matches!(self, SimulationOutcome::Possible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The spend was booked; `surplus` is the net balance afterwards.
    Applied { category_total: Money, surplus: Money },
    Rejected { surplus: Money, shortfall: Money },
}

pub struct ScenarioSimulator;

impl ScenarioSimulator {
    /// Reports whether spending `amount` more on `category` keeps the ledger at
    /// or above break-even. Non-positive amounts are trivially possible.
    pub fn simulate(
        ledger: &Ledger,
        category: &str,
        amount: Money,
    ) -> ServiceResult<SimulationOutcome> {
        let key = Self::ensure_expense_category(ledger, category)?;
        let outcome = Self::evaluate(ledger, amount)?;
        debug!(category = %key, amount = %amount, outcome = ?outcome, "simulated spend");
        Ok(outcome)
    }

    /// Same check as [`ScenarioSimulator::simulate`], but books the spend when
    /// it is possible.
    pub fn apply(
        ledger: &mut Ledger,
        category: &str,
        amount: Money,
    ) -> ServiceResult<ApplyOutcome> {
        let key = Self::ensure_expense_category(ledger, category)?;
        if let SimulationOutcome::NotPossible { surplus, shortfall } =
            Self::evaluate(ledger, amount)?
        {
            info!(category = %key, amount = %amount, shortfall = %shortfall, "spend rejected");
            return Ok(ApplyOutcome::Rejected { surplus, shortfall });
        }

        if amount.is_positive() {
            let out_of_range = || ServiceError::OutOfRange(format!("spending on `{}`", key));
            let category_total = ledger
                .category_totals
                .get(&key)
                .copied()
                .unwrap_or_default()
                .checked_sub(amount)
                .ok_or_else(out_of_range)?;
            let total_expenses = ledger
                .total_expenses
                .checked_sub(amount)
                .ok_or_else(out_of_range)?;
            let other_expense = if ledger.classifier.is_ambiguous(&key) {
                ledger
                    .other_expense
                    .checked_sub(amount)
                    .ok_or_else(out_of_range)?
            } else {
                ledger.other_expense
            };

            ledger.category_totals.insert(key.clone(), category_total);
            ledger.total_expenses = total_expenses;
            ledger.other_expense = other_expense;
            info!(category = %key, amount = %amount, "spend applied");
        } else {
            debug!(category = %key, amount = %amount, "non-positive spend; nothing applied");
        }

        Ok(ApplyOutcome::Applied {
            category_total: ledger.category_totals.get(&key).copied().unwrap_or_default(),
            surplus: ledger.net_balance(),
        })
    }

    fn evaluate(ledger: &Ledger, amount: Money) -> ServiceResult<SimulationOutcome> {
        let surplus = ledger.net_balance();
        if !amount.is_positive() || amount <= surplus {
            return Ok(SimulationOutcome::Possible);
        }
        let shortfall = amount.checked_sub(surplus).ok_or_else(|| {
            ServiceError::OutOfRange(format!("{} against a surplus of {}", amount, surplus))
        })?;
        Ok(SimulationOutcome::NotPossible { surplus, shortfall })
    }

    fn ensure_expense_category(ledger: &Ledger, category: &str) -> ServiceResult<String> {
        let key = normalize_name(category);
        if ledger.excluded.contains_key(&key) {
            return Err(ServiceError::Excluded(key));
        }
        if !ledger.category_totals.contains_key(&key) {
            return Err(ServiceError::NotFound(key));
        }
        match ledger.classifier.classify(&key) {
            Classification::Expense | Classification::Ambiguous => Ok(key),
            Classification::Income | Classification::Unrecognized => {
                Err(ServiceError::NotExpense(key))
            }
        }
    }
}

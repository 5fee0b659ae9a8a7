//! Proportional distribution of a surplus or deficit across expense categories.
//!
//! Each active expense category receives `magnitude / total * target`, rounded
//! to the cent. The rounding residual goes to the category with the largest
//! magnitude (ties broken by the smallest name) so adjustments always sum to
//! the target. In a deficit, protected categories are left out and their share
//! is spread over the remaining categories in proportion to their magnitude.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::ledger::{Ledger, Money};

use super::{ServiceError, ServiceResult};

/// Whether the plan hands out extra money or claws it back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Adjustments are non-negative and sum to `+target`.
    Surplus,
    /// Adjustments are non-positive and sum to `-target`.
    Deficit,
}

impl Direction {
    fn signed(self, magnitude: Money) -> Money {
        match self {
            Direction::Surplus => magnitude,
            Direction::Deficit => -magnitude,
        }
    }
}

/// A category that policy kept out of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyNotice {
    pub category: String,
    pub reason: String,
    /// Expense magnitude the category would otherwise have been weighted by.
    pub value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub direction: Direction,
    /// Signed amount the adjustments are meant to sum to.
    pub target: Money,
    pub adjustments: BTreeMap<String, Money>,
    pub blocked: Vec<PolicyNotice>,
    /// Part of `target` that could not be placed. Non-zero only when every
    /// contributing category is protected.
    pub unallocated: Money,
}

impl AllocationPlan {
    fn empty(direction: Direction, target: Money) -> Self {
        Self {
            direction,
            target,
            adjustments: BTreeMap::new(),
            blocked: Vec::new(),
            unallocated: Money::zero(),
        }
    }

    /// Sum of the adjustments, `None` if it leaves the amount range.
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(self.adjustments.values().copied())
    }

    pub fn is_conserving(&self) -> bool {
        self.total() == Some(self.target)
    }

    pub fn adjustment(&self, category: &str) -> Option<Money> {
        self.adjustments.get(category).copied()
    }
}

pub struct AllocationService;

impl AllocationService {
    /// Builds a plan distributing `amount` (a non-negative magnitude) in the
    /// given direction across the ledger's active expense categories.
    pub fn build_plan(
        ledger: &Ledger,
        policy: &PlannerConfig,
        amount: Money,
        direction: Direction,
    ) -> ServiceResult<AllocationPlan> {
        if amount.is_negative() {
            return Err(ServiceError::NegativeTarget(amount));
        }
        let target = direction.signed(amount);
        let mut plan = AllocationPlan::empty(direction, target);
        if amount.is_zero() {
            return Ok(plan);
        }

        let mut eligible = ledger.expense_magnitudes();
        if eligible.is_empty() {
            return Err(ServiceError::NoExpenseCategories);
        }

        if direction == Direction::Deficit {
            eligible.retain(|name, magnitude| {
                if !policy.is_protected(name) {
                    return true;
                }
                warn!(
                    category = %name,
                    value = %magnitude,
                    "protected category cannot be reduced; share redistributed"
                );
                plan.blocked.push(PolicyNotice {
                    category: name.clone(),
                    reason: "protected from reduction".into(),
                    value: *magnitude,
                });
                false
            });
        }

        if eligible.is_empty() {
            warn!(
                target = %target,
                "every contributing category is protected; plan left unallocated"
            );
            plan.unallocated = target;
            return Ok(plan);
        }

        let out_of_range = || ServiceError::OutOfRange(format!("allocating {}", target));
        let denominator =
            Money::checked_sum(eligible.values().copied()).ok_or_else(out_of_range)?;
        for (name, magnitude) in &eligible {
            let share = target.scale(*magnitude, denominator).ok_or_else(out_of_range)?;
            plan.adjustments.insert(name.clone(), share);
        }

        let residual = plan
            .total()
            .and_then(|total| target.checked_sub(total))
            .ok_or_else(out_of_range)?;
        if !residual.is_zero() {
            if let Some(share) = largest_category(&eligible)
                .and_then(|largest| plan.adjustments.get_mut(largest))
            {
                *share = share.checked_add(residual).ok_or_else(out_of_range)?;
            }
        }

        info!(
            direction = ?direction,
            target = %target,
            categories = plan.adjustments.len(),
            blocked = plan.blocked.len(),
            "allocation plan built"
        );
        Ok(plan)
    }
}

/// Category with the largest magnitude; the first name in order wins ties.
fn largest_category(magnitudes: &BTreeMap<String, Money>) -> Option<&str> {
    let mut best: Option<(&str, Money)> = None;
    for (name, magnitude) in magnitudes {
        match best {
            Some((_, current)) if *magnitude <= current => {}
            _ => best = Some((name.as_str(), *magnitude)),
        }
    }
    best.map(|(name, _)| name)
}

/// One logged plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub plan: AllocationPlan,
}

/// In-memory log of the plans built during a session. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanHistory {
    entries: Vec<PlanEntry>,
}

impl PlanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, plan: AllocationPlan) -> &PlanEntry {
        self.entries.push(PlanEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            plan,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&PlanEntry> {
        self.entries.last()
    }

    pub fn get(&self, id: Uuid) -> Option<&PlanEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

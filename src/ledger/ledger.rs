use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::normalize_name;
use crate::validation::{LoadReport, RecordValidator, RejectionReason};

use super::{CategoryType, Classification, Classifier, Money, RawRecord, TransactionRecord};

/// Value parked for a category while it is excluded from aggregation.
///
/// `income` and `expense` hold the parts that were removed from the running
/// totals so restoring is exact even for the sign-routed category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedCategory {
    pub total: Money,
    pub income: Money,
    pub expense: Money,
}

/// In-memory aggregate of one batch of validated records.
///
/// A category name is either a key of the active totals or a key of the
/// exclusion set, never both.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(crate) classifier: Classifier,
    pub(crate) records: Vec<TransactionRecord>,
    pub(crate) category_totals: BTreeMap<String, Money>,
    pub(crate) total_income: Money,
    pub(crate) total_expenses: Money,
    pub(crate) other_income: Money,
    pub(crate) other_expense: Money,
    pub(crate) batch_year: Option<i32>,
    pub(crate) excluded: BTreeMap<String, ExcludedCategory>,
}

/// Read-only view of the ledger handed to hosts for rendering or storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub batch_year: Option<i32>,
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_balance: Money,
    pub other_income: Money,
    pub other_expense: Money,
    pub category_totals: BTreeMap<String, Money>,
    pub expense_percentages: BTreeMap<String, f64>,
    pub excluded: BTreeMap<String, ExcludedCategory>,
}

impl Ledger {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            records: Vec::new(),
            category_totals: BTreeMap::new(),
            total_income: Money::zero(),
            total_expenses: Money::zero(),
            other_income: Money::zero(),
            other_expense: Money::zero(),
            batch_year: None,
            excluded: BTreeMap::new(),
        }
    }

    /// Validates `rows` and replaces all ledger state with the accepted ones,
    /// including any exclusions from a previous load.
    pub fn load<I, R>(&mut self, rows: I) -> LoadReport
    where
        I: IntoIterator<Item = R>,
        R: Into<RawRecord>,
    {
        let classifier = self.classifier.clone();
        let mut validator = RecordValidator::new(&classifier);

        *self = Self::new(classifier.clone());
        let report = validator.validate_batch_with(rows, |record| self.accept(record));
        self.batch_year = report.batch_year;

        info!(
            accepted = report.accepted,
            rejected = report.rejected(),
            year = ?report.batch_year,
            "ledger loaded"
        );
        report
    }

    /// Folds one validated record into the aggregate. Every running total is
    /// computed first, so a record that would overflow one of them leaves the
    /// ledger untouched.
    fn accept(&mut self, record: TransactionRecord) -> Result<(), RejectionReason> {
        let amount = record.amount;
        let out_of_range = || RejectionReason::AmountOutOfRange {
            category: record.category.clone(),
            amount,
        };

        let category_total = self
            .category_totals
            .get(&record.category)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or_else(out_of_range)?;
        let (running, other) = match record.kind {
            CategoryType::Income => (self.total_income, self.other_income),
            CategoryType::Expense => (self.total_expenses, self.other_expense),
        };
        let running = running.checked_add(amount).ok_or_else(out_of_range)?;
        let other = if self.classifier.is_ambiguous(&record.category) {
            Some(other.checked_add(amount).ok_or_else(out_of_range)?)
        } else {
            None
        };

        match record.kind {
            CategoryType::Income => {
                self.total_income = running;
                if let Some(other) = other {
                    self.other_income = other;
                }
            }
            CategoryType::Expense => {
                self.total_expenses = running;
                if let Some(other) = other {
                    self.other_expense = other;
                }
            }
        }
        self.category_totals.insert(record.category.clone(), category_total);
        self.records.push(record);
        Ok(())
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn batch_year(&self) -> Option<i32> {
        self.batch_year
    }

    /// Sum of all income contributions, including positive sign-routed amounts.
    pub fn total_income(&self) -> Money {
        self.total_income
    }

    /// Sum of all expense contributions, including negative sign-routed amounts.
    pub fn total_expenses(&self) -> Money {
        self.total_expenses
    }

    /// Income is never negative and expenses never positive, so the sum
    /// always fits.
    pub fn net_balance(&self) -> Money {
        self.total_income.saturating_add(self.total_expenses)
    }

    pub fn other_income(&self) -> Money {
        self.other_income
    }

    pub fn other_expense(&self) -> Money {
        self.other_expense
    }

    pub fn category_totals(&self) -> &BTreeMap<String, Money> {
        &self.category_totals
    }

    /// Active total for a category, looked up case-insensitively.
    pub fn category_total(&self, name: &str) -> Option<Money> {
        self.category_totals.get(&normalize_name(name)).copied()
    }

    pub fn excluded(&self) -> &BTreeMap<String, ExcludedCategory> {
        &self.excluded
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains_key(&normalize_name(name))
    }

    /// Positive expense magnitude of every active category that has one.
    ///
    /// The sign-routed category contributes only its expense part.
    pub fn expense_magnitudes(&self) -> BTreeMap<String, Money> {
        self.category_totals
            .iter()
            .filter_map(|(name, total)| {
                let magnitude = match self.classifier.classify(name) {
                    Classification::Ambiguous => self.other_expense.abs(),
                    Classification::Expense => total.abs(),
                    Classification::Income | Classification::Unrecognized => return None,
                };
                (!magnitude.is_zero()).then(|| (name.clone(), magnitude))
            })
            .collect()
    }

    /// Each expense category's share of total expenses, as a fraction in `[0, 1]`.
    ///
    /// A zero or positive expense total is degenerate; it is logged and yields
    /// an empty map.
    pub fn percentage_by_category(&self) -> BTreeMap<String, f64> {
        if self.total_expenses.is_zero() {
            error!("cannot compute expense percentages: total expenses are zero");
            return BTreeMap::new();
        }
        if self.total_expenses.is_positive() {
            error!(
                total_expenses = %self.total_expenses,
                "cannot compute expense percentages: total expenses are positive"
            );
            return BTreeMap::new();
        }

        let denominator = self.total_expenses.abs().cents() as f64;
        self.expense_magnitudes()
            .into_iter()
            .map(|(name, magnitude)| (name, magnitude.cents() as f64 / denominator))
            .collect()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            batch_year: self.batch_year,
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            net_balance: self.net_balance(),
            other_income: self.other_income,
            other_expense: self.other_expense,
            category_totals: self.category_totals.clone(),
            expense_percentages: self.percentage_by_category(),
            excluded: self.excluded.clone(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

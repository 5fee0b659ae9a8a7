//! Row-level validation of raw `(date, category, amount)` tuples.
//!
//! Every rule is checked independently so a single rejected row reports all of
//! its problems at once. The validator also carries the batch year: the first
//! accepted row fixes it, and later rows from any other year are rejected.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::normalize_name;
use crate::ledger::{
    CategoryType, Classification, Classifier, Money, RawRecord, TransactionRecord,
};

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<month>[0-9]{2})/(?P<day>[0-9]{2})/(?P<year>[0-9]{4})$")
        .expect("date pattern compiles")
});

/// Why a row was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("date is empty")]
    EmptyDate,
    #[error("date `{value}` does not match MM/DD/YYYY")]
    MalformedDate { value: String },
    #[error("date `{value}` is not a real calendar date")]
    InvalidCalendarDate { value: String },
    #[error("date `{value}` is in {found}, but this batch is for {expected}")]
    YearMismatch {
        value: String,
        expected: i32,
        found: i32,
    },
    #[error("category is empty")]
    EmptyCategory,
    #[error("category `{value}` contains digits")]
    CategoryContainsDigits { value: String },
    #[error("category `{value}` is not recognized{}", suggestion_hint(.suggestion))]
    UnrecognizedCategory {
        value: String,
        suggestion: Option<String>,
    },
    #[error("amount is empty")]
    EmptyAmount,
    #[error("amount `{value}` is not a number")]
    NonNumericAmount { value: String },
    #[error("{expected} category `{category}` cannot carry amount {amount}")]
    SignMismatch {
        category: String,
        expected: CategoryType,
        amount: Money,
    },
    #[error("amount {amount} would push the `{category}` totals out of range")]
    AmountOutOfRange { category: String, amount: Money },
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{}`?)", name),
        None => String::new(),
    }
}

/// A refused row with its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    pub row: usize,
    pub raw: RawRecord,
    pub reasons: Vec<RejectionReason>,
}

/// Outcome of a bulk load: how many rows made it in and why the rest did not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejections: Vec<RowRejection>,
    pub batch_year: Option<i32>,
}

impl LoadReport {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }

    pub fn total_rows(&self) -> usize {
        self.accepted + self.rejections.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Validates the rows of one batch against a fixed vocabulary.
pub struct RecordValidator<'a> {
    classifier: &'a Classifier,
    batch_year: Option<i32>,
}

impl<'a> RecordValidator<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            batch_year: None,
        }
    }

    pub fn batch_year(&self) -> Option<i32> {
        self.batch_year
    }

    /// Checks one row. On acceptance the batch year is fixed if it was not yet.
    pub fn validate(
        &mut self,
        raw: &RawRecord,
    ) -> Result<TransactionRecord, Vec<RejectionReason>> {
        let mut reasons = Vec::new();

        let date = match self.check_date(&raw.date) {
            Ok(date) => Some(date),
            Err(reason) => {
                reasons.push(reason);
                None
            }
        };

        let classification = match self.check_category(&raw.category) {
            Ok(classification) => Some(classification),
            Err(reason) => {
                reasons.push(reason);
                None
            }
        };

        let amount = match check_amount(&raw.amount) {
            Ok(amount) => Some(amount),
            Err(reason) => {
                reasons.push(reason);
                None
            }
        };

        let kind = match (classification, amount) {
            (Some(classification), Some(amount)) => {
                match check_sign(&raw.category, classification, amount) {
                    Some(reason) => {
                        reasons.push(reason);
                        None
                    }
                    None => classification.resolve(amount),
                }
            }
            _ => None,
        };

        match (date, kind, amount) {
            (Some(date), Some(kind), Some(amount)) if reasons.is_empty() => {
                if self.batch_year.is_none() {
                    debug!(year = date.year(), "batch year fixed");
                    self.batch_year = Some(date.year());
                }
                Ok(TransactionRecord {
                    date,
                    category: normalize_name(&raw.category),
                    kind,
                    amount,
                })
            }
            _ => Err(reasons),
        }
    }

    /// Validates every row in order, collecting accepted records and a report.
    /// A rejected row never stops the batch.
    pub fn validate_batch<I, R>(&mut self, rows: I) -> (Vec<TransactionRecord>, LoadReport)
    where
        I: IntoIterator<Item = R>,
        R: Into<RawRecord>,
    {
        let mut accepted = Vec::new();
        let report = self.validate_batch_with(rows, |record| {
            accepted.push(record);
            Ok(())
        });
        (accepted, report)
    }

    /// Like [`RecordValidator::validate_batch`], but hands each valid record to
    /// `admit`, which may still refuse it. A refused record is reported like any
    /// other rejected row.
    pub fn validate_batch_with<I, R, F>(&mut self, rows: I, mut admit: F) -> LoadReport
    where
        I: IntoIterator<Item = R>,
        R: Into<RawRecord>,
        F: FnMut(TransactionRecord) -> Result<(), RejectionReason>,
    {
        let mut report = LoadReport::default();
        for (index, row) in rows.into_iter().enumerate() {
            let raw: RawRecord = row.into();
            let outcome = self
                .validate(&raw)
                .and_then(|record| admit(record).map_err(|reason| vec![reason]));
            match outcome {
                Ok(()) => report.accepted += 1,
                Err(reasons) => {
                    for reason in &reasons {
                        warn!(
                            row = index + 1,
                            category = %raw.category,
                            value = ?raw,
                            reason = %reason,
                            "row rejected"
                        );
                    }
                    report.rejections.push(RowRejection {
                        row: index + 1,
                        raw,
                        reasons,
                    });
                }
            }
        }
        report.batch_year = self.batch_year;
        report
    }

    fn check_date(&self, raw: &str) -> Result<NaiveDate, RejectionReason> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(RejectionReason::EmptyDate);
        }
        let captures = DATE_PATTERN
            .captures(value)
            .ok_or_else(|| RejectionReason::MalformedDate {
                value: value.to_string(),
            })?;

        let invalid = || RejectionReason::InvalidCalendarDate {
            value: value.to_string(),
        };
        let month: u32 = captures["month"].parse().map_err(|_| invalid())?;
        let day: u32 = captures["day"].parse().map_err(|_| invalid())?;
        let year: i32 = captures["year"].parse().map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

        match self.batch_year {
            Some(expected) if expected != year => Err(RejectionReason::YearMismatch {
                value: value.to_string(),
                expected,
                found: year,
            }),
            _ => Ok(date),
        }
    }

    fn check_category(&self, raw: &str) -> Result<Classification, RejectionReason> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(RejectionReason::EmptyCategory);
        }
        if value.chars().any(char::is_numeric) {
            return Err(RejectionReason::CategoryContainsDigits {
                value: value.to_string(),
            });
        }
        match self.classifier.classify(value) {
            Classification::Unrecognized => Err(RejectionReason::UnrecognizedCategory {
                value: value.to_string(),
                suggestion: self.classifier.suggest(value),
            }),
            classification => Ok(classification),
        }
    }
}

fn check_amount(raw: &str) -> Result<Money, RejectionReason> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RejectionReason::EmptyAmount);
    }
    Money::parse(value).map_err(|_| RejectionReason::NonNumericAmount {
        value: value.to_string(),
    })
}

/// Income must be strictly positive and expenses strictly negative. The
/// sign-routed category is exempt: its sign is the classification signal.
fn check_sign(
    category: &str,
    classification: Classification,
    amount: Money,
) -> Option<RejectionReason> {
    let expected = classification.fixed_type()?;
    let consistent = match expected {
        CategoryType::Income => amount.is_positive(),
        CategoryType::Expense => amount.is_negative(),
    };
    if consistent {
        None
    } else {
        Some(RejectionReason::SignMismatch {
            category: normalize_name(category),
            expected,
            amount,
        })
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CategoryType, Money};

/// One untyped `(date, category, amount)` row as handed over by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRecord {
    pub date: String,
    pub category: String,
    pub amount: String,
}

impl RawRecord {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            amount: amount.into(),
        }
    }
}

impl<D, C, A> From<(D, C, A)> for RawRecord
where
    D: Into<String>,
    C: Into<String>,
    A: Into<String>,
{
    fn from((date, category, amount): (D, C, A)) -> Self {
        Self::new(date, category, amount)
    }
}

/// A validated record. The category name is normalized and the type is
/// already resolved, including for the sign-routed category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub category: String,
    pub kind: CategoryType,
    pub amount: Money,
}

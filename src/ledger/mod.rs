//! Ledger domain types: amounts, categories, records, and the aggregate store.

pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod money;
pub mod record;

pub use category::{CategoryType, Classification, Classifier};
pub use ledger::{ExcludedCategory, Ledger, LedgerSnapshot};
pub use money::{Money, MoneyParseError};
pub use record::{RawRecord, TransactionRecord};

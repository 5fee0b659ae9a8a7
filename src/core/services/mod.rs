pub mod allocation_service;
pub mod exclusion_service;

pub use allocation_service::{
    AllocationPlan, AllocationService, Direction, PlanEntry, PlanHistory, PolicyNotice,
};
pub use exclusion_service::{ExclusionOutcome, ExclusionService, InclusionOutcome};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Typed failures of ledger operations. None of them leave the ledger
/// partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Category `{0}` not found")]
    NotFound(String),
    #[error("Category `{0}` is excluded")]
    Excluded(String),
    #[error("Category `{0}` is not an expense category")]
    NotExpense(String),
    #[error("Target amount {0} is negative")]
    NegativeTarget(crate::ledger::Money),
    #[error("No active expense categories to allocate across")]
    NoExpenseCategories,
    #[error("Result of {0} is out of the supported amount range")]
    OutOfRange(String),
    #[error("{0}")]
    Invalid(String),
}

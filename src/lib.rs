#![doc(test(attr(deny(warnings))))]

//! Budget Planner classifies dated transactions into income and expense
//! categories, aggregates them into a ledger, and plans proportional
//! reallocations of a surplus or deficit.
//!
//! The crate performs no I/O of its own beyond tokenizing CSV text handed in by
//! a host; every operation is synchronous and reports failures as typed values.

pub mod config;
pub mod core;
pub mod errors;
pub mod ingest;
pub mod ledger;
pub mod simulation;
pub mod utils;
pub mod validation;

pub use crate::config::PlannerConfig;
pub use crate::core::session::PlanningSession;
pub use crate::errors::{PlannerError, Result};
pub use crate::ledger::{CategoryType, Ledger, Money, RawRecord, TransactionRecord};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Planner tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}

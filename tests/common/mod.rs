#![allow(dead_code)]

use budget_planner::{ledger::RawRecord, PlanningSession};

/// A month of activity that exercises every category kind.
pub fn sample_rows() -> Vec<RawRecord> {
    vec![
        RawRecord::new("03/01/2024", "Salary", "4200"),
        RawRecord::new("03/01/2024", "rent", "-1500"),
        RawRecord::new("03/03/2024", "Food", "-412.37"),
        RawRecord::new("03/05/2024", "utilities", "-133.10"),
        RawRecord::new("03/09/2024", "entertainment", "-75"),
        RawRecord::new("03/12/2024", "other", "60"),
        RawRecord::new("03/15/2024", "other", "-19.99"),
        RawRecord::new("03/20/2024", "transportation", "-88.40"),
        RawRecord::new("03/28/2024", "interest", "3.17"),
    ]
}

/// Session loaded with [`sample_rows`]; panics if any fixture row is rejected.
pub fn loaded_session() -> PlanningSession {
    budget_planner::init();
    let mut session = PlanningSession::default();
    let report = session.load(sample_rows());
    assert!(report.is_clean(), "fixture rows rejected: {:?}", report.rejections);
    session
}

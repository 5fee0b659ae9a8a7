//! Facade that owns one ledger and routes every planning operation through it.

use tracing::info;

use crate::config::PlannerConfig;
use crate::core::services::{
    AllocationPlan, AllocationService, Direction, ExclusionOutcome, ExclusionService,
    InclusionOutcome, PlanHistory, ServiceResult,
};
use crate::errors::Result;
use crate::ledger::{Classifier, Ledger, LedgerSnapshot, Money, RawRecord};
use crate::simulation::{ApplyOutcome, ScenarioSimulator, SimulationOutcome};
use crate::validation::LoadReport;

/// One user's interactive planning run over a single batch year.
///
/// Sessions are not shared; a host serving several users keeps one per user.
pub struct PlanningSession {
    config: PlannerConfig,
    ledger: Ledger,
    history: PlanHistory,
}

impl PlanningSession {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        let ledger = Ledger::new(Classifier::new(&config));
        Ok(Self {
            config,
            ledger,
            history: PlanHistory::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &PlanHistory {
        &self.history
    }

    /// Rebuilds the ledger from scratch. The plan history survives reloads.
    pub fn load<I, R>(&mut self, rows: I) -> LoadReport
    where
        I: IntoIterator<Item = R>,
        R: Into<RawRecord>,
    {
        self.ledger.load(rows)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn exclude(&mut self, category: &str) -> ServiceResult<ExclusionOutcome> {
        ExclusionService::exclude(&mut self.ledger, category)
    }

    pub fn include(&mut self, category: &str) -> ServiceResult<InclusionOutcome> {
        ExclusionService::include(&mut self.ledger, category)
    }

    /// Builds a plan and appends it to the session's history.
    pub fn build_plan(
        &mut self,
        amount: Money,
        direction: Direction,
    ) -> ServiceResult<AllocationPlan> {
        let plan = AllocationService::build_plan(&self.ledger, &self.config, amount, direction)?;
        let entry = self.history.record(plan.clone());
        info!(plan_id = %entry.id, "allocation plan logged");
        Ok(plan)
    }

    /// Plans away whatever the current net balance is: a positive balance is
    /// distributed as a surplus, a negative one is recovered as a deficit.
    pub fn plan_current_balance(&mut self) -> ServiceResult<AllocationPlan> {
        let balance = self.ledger.net_balance();
        let direction = if balance.is_negative() {
            Direction::Deficit
        } else {
            Direction::Surplus
        };
        self.build_plan(balance.abs(), direction)
    }

    pub fn simulate(&self, category: &str, amount: Money) -> ServiceResult<SimulationOutcome> {
        ScenarioSimulator::simulate(&self.ledger, category, amount)
    }

    pub fn apply(&mut self, category: &str, amount: Money) -> ServiceResult<ApplyOutcome> {
        ScenarioSimulator::apply(&mut self.ledger, category, amount)
    }
}

impl Default for PlanningSession {
    fn default() -> Self {
        let config = PlannerConfig::default();
        Self {
            ledger: Ledger::new(Classifier::new(&config)),
            config,
            history: PlanHistory::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        let mut config = PlannerConfig::default();
        config.protected_categories.insert("salary".into());
        assert!(PlanningSession::new(config).is_err());
    }

    #[test]
    fn plans_are_logged_in_history() {
        let mut session = PlanningSession::default();
        session.load(vec![
            ("07/01/2024", "salary", "1000"),
            ("07/02/2024", "food", "-600"),
            ("07/03/2024", "utilities", "-200"),
        ]);
        let plan = session.plan_current_balance().expect("plan");
        assert_eq!(plan.direction, Direction::Surplus);
        assert_eq!(plan.target, Money::from_units(200));
        assert_eq!(plan.adjustment("food"), Some(Money::from_units(150)));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn negative_balance_plans_a_deficit() {
        let mut session = PlanningSession::default();
        session.load(vec![
            ("07/01/2024", "salary", "500"),
            ("07/02/2024", "food", "-600"),
            ("07/03/2024", "rent", "-400"),
        ]);
        let plan = session.plan_current_balance().expect("plan");
        assert_eq!(plan.direction, Direction::Deficit);
        assert_eq!(plan.adjustment("food"), Some(Money::from_units(-500)));
        assert_eq!(plan.blocked.len(), 1);
        assert!(plan.is_conserving());
    }

    #[test]
    fn custom_vocabulary_flows_into_the_ledger() {
        let config = PlannerConfig::from_json_str(
            r#"{
                "income_categories": ["Paycheck"],
                "expense_categories": ["Mortgage", "Coffee"],
                "ambiguous_category": "Misc",
                "protected_categories": ["Mortgage"]
            }"#,
        )
        .expect("config");
        let mut session = PlanningSession::new(config).expect("session");
        let report = session.load(vec![
            ("01/02/2025", "paycheck", "100"),
            ("01/03/2025", "coffee", "-5"),
            ("01/04/2025", "misc", "-1"),
            ("01/05/2025", "food", "-1"),
        ]);
        assert_eq!(report.accepted, 3);
        assert_eq!(session.ledger().other_expense(), Money::from_units(-1));
    }
}

//! Suite aggregation and reporting.

use std::fmt::Write as _;

use serde::Serialize;
use tracing::Instrument;

use crate::environment::RuntimeMode;
use crate::health::{DatabaseStatus, HealthStatus};
use crate::verify::context::HarnessContext;
use crate::verify::outcome::{ScenarioOutcome, ScenarioStatus};
use crate::verify::scenarios::Scenario;

/// Results of one named group of scenarios.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSet {
    pub name: &'static str,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl ScenarioSet {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    pub fn inconclusive(&self) -> usize {
        self.count(ScenarioStatus::Inconclusive)
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub mode: RuntimeMode,
    pub origin: String,
    pub sets: Vec<ScenarioSet>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.sets.iter().map(ScenarioSet::total).sum()
    }

    pub fn passed(&self) -> usize {
        self.sets.iter().map(ScenarioSet::passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.sets.iter().map(ScenarioSet::failed).sum()
    }

    pub fn inconclusive(&self) -> usize {
        self.sets.iter().map(ScenarioSet::inconclusive).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.sets.iter().flat_map(|set| set.outcomes.iter())
    }

    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes().find(|o| o.name == name)
    }

    /// Human-readable summary, one line per scenario plus counts.
    pub fn render(&self) -> String {
        let rule = "======================================";
        let mut out = String::new();
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "API CONNECTIVITY RESULTS ({}: {})", self.mode, self.origin);
        let _ = writeln!(out, "{}", rule);

        for set in &self.sets {
            for outcome in &set.outcomes {
                match outcome.status {
                    ScenarioStatus::Passed => {
                        let _ = writeln!(out, "[PASS] {}: {}", outcome.name, outcome.message);
                    }
                    ScenarioStatus::Inconclusive => {
                        let _ = writeln!(out, "[ ?? ] {}: {}", outcome.name, outcome.message);
                    }
                    ScenarioStatus::Failed => {
                        let _ = writeln!(out, "[FAIL] {}: {}", outcome.name, outcome.message);
                    }
                }
            }
        }

        let _ = writeln!(out, "{}", rule);
        for set in &self.sets {
            let _ = writeln!(out, "{} tests: {}/{} passed", set.name, set.passed(), set.total());
        }
        let _ = write!(out, "Total: {}/{} passed", self.passed(), self.total());
        if self.inconclusive() > 0 {
            let _ = write!(out, ", {} inconclusive", self.inconclusive());
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);
        out
    }
}

/// Scenario groups for `mode`: general everywhere, production-only extras.
pub fn scenario_sets(mode: RuntimeMode) -> Vec<(&'static str, Vec<Scenario>)> {
    let mut sets = vec![("General", Scenario::GENERAL.to_vec())];
    if mode == RuntimeMode::Production {
        sets.push(("Production", Scenario::PRODUCTION.to_vec()));
    }
    sets
}

/// Run every scenario for the context's mode, sequentially.
pub async fn run_suite(ctx: &HarnessContext) -> SuiteReport {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("verification", %run_id, mode = %ctx.mode);
    run_sets(ctx).instrument(span).await
}

async fn run_sets(ctx: &HarnessContext) -> SuiteReport {
    tracing::info!(origin = %ctx.origin, "Running API connectivity scenarios");

    let mut sets = Vec::new();
    for (name, scenarios) in scenario_sets(ctx.mode) {
        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            outcomes.push(scenario.run(ctx).await);
        }
        sets.push(ScenarioSet { name, outcomes });
    }

    let report = SuiteReport {
        mode: ctx.mode,
        origin: ctx.origin.to_string(),
        sets,
    };
    tracing::info!(
        passed = report.passed(),
        failed = report.failed(),
        inconclusive = report.inconclusive(),
        total = report.total(),
        "Scenarios complete"
    );
    report
}

/// Pre-deployment check: the health endpoint reports `status: ok`.
pub async fn verify_deployment(ctx: &HarnessContext) -> bool {
    match ctx.prober.probe(&ctx.origin, ctx.health_timeout()).await {
        Ok(report) => {
            if report.database.status == DatabaseStatus::Connected {
                tracing::info!(origin = %ctx.origin, "Database is connected");
            } else {
                tracing::error!(origin = %ctx.origin, database = %report.database.status, "Database is not connected");
            }
            if report.status == HealthStatus::Ok {
                tracing::info!(origin = %ctx.origin, "Overall API status is OK");
                true
            } else {
                tracing::error!(origin = %ctx.origin, status = %report.status, "API status is not OK");
                false
            }
        }
        Err(error) => {
            tracing::error!(
                origin = %ctx.origin,
                kind = %error.kind,
                http_status = ?error.http_status,
                error = %error,
                "Deployment verification failed"
            );
            false
        }
    }
}

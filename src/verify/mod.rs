//! Verification harness.
//!
//! # Data Flow
//! ```text
//! RuntimeMode + config + optional override
//!     → context.rs (resolve origin once, build transport/prober)
//!     → scenarios.rs (each scenario → ScenarioOutcome)
//!     → suite.rs (group, count, render)
//!     → exit.rs (RunResult + --skip-on-failure → process exit status)
//! ```
//!
//! # Design Decisions
//! - One set of scenario functions serves both modes; only the context differs
//! - Inconclusive scenarios are reported but never fail a run
//! - Scenarios run sequentially so retry timing is not distorted

pub mod context;
pub mod exit;
pub mod outcome;
pub mod scenarios;
pub mod suite;

pub use context::{HarnessContext, HarnessError};
pub use exit::{exit_code, exit_status, RunResult};
pub use outcome::{ScenarioOutcome, ScenarioStatus};
pub use scenarios::Scenario;
pub use suite::{run_suite, verify_deployment, ScenarioSet, SuiteReport};

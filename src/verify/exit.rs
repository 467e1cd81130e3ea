//! Process exit status for a harness run.

use std::process::ExitCode;

/// How a harness run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    /// Every scenario passed or was inconclusive.
    Passed,
    /// At least one scenario failed.
    Failed,
    /// Configuration could not be loaded or the origin not resolved.
    ConfigurationError,
}

impl RunResult {
    /// Result of a completed run whose checks did or did not all pass.
    pub fn from_checks(all_passed: bool) -> Self {
        if all_passed {
            RunResult::Passed
        } else {
            RunResult::Failed
        }
    }
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;

/// Exit status for `result`. `skip_on_failure` turns every outcome into success.
pub fn exit_code(result: RunResult, skip_on_failure: bool) -> u8 {
    let code = match result {
        RunResult::Passed => EXIT_SUCCESS,
        RunResult::Failed => EXIT_FAILED,
        RunResult::ConfigurationError => EXIT_CONFIG,
    };

    if code != EXIT_SUCCESS && skip_on_failure {
        tracing::warn!(code, ?result, "Continuing despite failures (--skip-on-failure)");
        return EXIT_SUCCESS;
    }
    code
}

/// [`exit_code`] as a process [`ExitCode`].
pub fn exit_status(result: RunResult, skip_on_failure: bool) -> ExitCode {
    ExitCode::from(exit_code(result, skip_on_failure))
}

//! Console sign-in automation: the step vocabulary and the browser seam.

mod driver;

pub use driver::{BrowserLauncher, DriverError, LoginDriver};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of the sign-in sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginStep {
    Launch,
    FillUsername,
    FillPassword,
    SubmitCredentials,
    AwaitMfaField,
    FillMfa,
    SubmitMfa,
    AwaitLanding,
    Done,
}

impl LoginStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStep::Launch => "LAUNCH",
            LoginStep::FillUsername => "FILL_USERNAME",
            LoginStep::FillPassword => "FILL_PASSWORD",
            LoginStep::SubmitCredentials => "SUBMIT_CREDENTIALS",
            LoginStep::AwaitMfaField => "AWAIT_MFA_FIELD",
            LoginStep::FillMfa => "FILL_MFA",
            LoginStep::SubmitMfa => "SUBMIT_MFA",
            LoginStep::AwaitLanding => "AWAIT_LANDING",
            LoginStep::Done => "DONE",
        }
    }
}

impl fmt::Display for LoginStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which post-login signal ended the landing race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingSignal {
    Navigation,
    ConsoleAnchor,
    /// Neither signal fired in time; the run still counts as done.
    TimedOut,
}

/// Terminal state of one sign-in run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Completed { landing: LandingSignal },
    /// The operator closed the browser mid-flow.
    Aborted { step: LoginStep },
    Failed { step: LoginStep, error: crate::DomainError },
}

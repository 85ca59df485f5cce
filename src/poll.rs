// Budget-bounded polling of a remote resource status
//
// Shared by create and delete. The caller supplies a fetch function and a
// classifier; the poller owns the wait/abort discipline:
//
//   fetch -> classify -> Done   => Ok(status)
//                     -> Fail   => Err
//                     -> Wait   => budget check -> sleep -> fetch ...
//
// The budget is checked before committing to a sleep + fetch round trip, so
// an invocation is never killed by the host halfway through a poll.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{Clock, Deadline};
use crate::error::{LifecycleError, ProvisioningError, Result};
use crate::status::ResourceStatus;

/// Polling cadence for one resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Slack kept on top of the interval for the describe call and the report
    pub margin: Duration,
}

impl PollSettings {
    pub const fn new(interval: Duration, margin: Duration) -> Self {
        Self { interval, margin }
    }

    /// Domains take minutes to provision
    pub const fn domain() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(1))
    }

    pub const fn profile() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(1))
    }

    /// Minimum remaining budget required to start another poll round
    pub fn required_budget(&self) -> Duration {
        self.interval + self.margin
    }
}

/// Decision taken after observing a status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Wait,
    Done,
    Fail(LifecycleError),
}

/// Classifier for a resource being created
pub fn classify_create(status: &ResourceStatus) -> Step {
    match status {
        ResourceStatus::Pending => Step::Wait,
        ResourceStatus::InService => Step::Done,
        ResourceStatus::Deleting => Step::Fail(LifecycleError::ConcurrentDelete),
        other => Step::Fail(LifecycleError::TerminalStatus(other.clone())),
    }
}

/// Classifier for a resource being deleted. There is no Done state:
/// deletion is only confirmed by the record disappearing (NotFound on fetch).
pub fn classify_delete(status: &ResourceStatus) -> Step {
    match status {
        ResourceStatus::Deleting | ResourceStatus::Pending | ResourceStatus::InService => {
            Step::Wait
        }
        other => Step::Fail(LifecycleError::TerminalStatus(other.clone())),
    }
}

pub struct Poller<'a> {
    clock: &'a dyn Clock,
    deadline: Deadline,
    settings: PollSettings,
}

impl<'a> Poller<'a> {
    pub fn new(clock: &'a dyn Clock, deadline: Deadline, settings: PollSettings) -> Self {
        Self {
            clock,
            deadline,
            settings,
        }
    }

    /// Fetch the status until `classify` reaches a terminal decision.
    ///
    /// Fetch errors are returned as-is (wrapped in LifecycleError) so callers
    /// can interpret NotFound.
    pub async fn run<F, Fut>(
        &self,
        classify: fn(&ResourceStatus) -> Step,
        mut fetch: F,
    ) -> Result<ResourceStatus>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<ResourceStatus, ProvisioningError>>,
    {
        let mut status = fetch().await?;
        let mut polls = 1u32;

        loop {
            match classify(&status) {
                Step::Done => {
                    debug!(status = %status, polls, "Poll reached terminal status");
                    return Ok(status);
                }
                Step::Fail(err) => {
                    warn!(status = %status, polls, error_code = err.code().as_str(), "Poll failed: {}", err);
                    return Err(err);
                }
                Step::Wait => {}
            }

            let remaining = self.deadline.remaining(self.clock);
            let required = self.settings.required_budget();
            if remaining < required {
                warn!(
                    status = %status,
                    polls,
                    remaining_ms = remaining.as_millis() as u64,
                    required_ms = required.as_millis() as u64,
                    "Invocation about to time out; aborting poll"
                );
                return Err(LifecycleError::BudgetExhausted {
                    remaining,
                    required,
                });
            }

            debug!(
                status = %status,
                interval_secs = self.settings.interval.as_secs(),
                "Waiting before next status check"
            );
            self.clock.sleep(self.settings.interval).await;
            status = fetch().await?;
            polls += 1;
        }
    }
}

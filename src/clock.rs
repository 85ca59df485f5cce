// Time source and execution deadline
//
// The lifecycle never calls Utc::now() or tokio::time::sleep directly;
// it goes through Clock so tests can drive time forward instantly.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the Tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Instant at which the host forcibly terminates the invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(DateTime<Utc>);

impl Deadline {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Deadline expressed as milliseconds since the Unix epoch (Lambda context format)
    pub fn from_epoch_millis(millis: u64) -> Option<Self> {
        let millis = i64::try_from(millis).ok()?;
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Time left before the deadline; zero once it has passed
    pub fn remaining(&self, clock: &dyn Clock) -> Duration {
        (self.0 - clock.now()).to_std().unwrap_or(Duration::ZERO)
    }
}

// Event dispatch and outcome reporting
//
// handle_event is the only place that calls Reporter::report. Every branch
// below it produces a LifecycleOutcome value instead of reporting, which is
// what guarantees exactly one report per event.

use async_trait::async_trait;
use tracing::{error, info, Instrument};

use crate::clock::{Clock, Deadline};
use crate::error::ReportError;
use crate::outcome::LifecycleOutcome;
use crate::request::{CustomResourceEvent, LifecycleRequest, Operation, ResourceProperties};

/// Create/update/delete behaviour of one custom resource type
#[async_trait]
pub trait ResourceLifecycle: Send + Sync {
    type Properties: ResourceProperties;

    /// Short name used in logs ("domain", "profile")
    fn kind(&self) -> &'static str;

    async fn create(
        &self,
        request: &LifecycleRequest<Self::Properties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome;

    async fn update(
        &self,
        request: &LifecycleRequest<Self::Properties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome;

    async fn delete(
        &self,
        request: &LifecycleRequest<Self::Properties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome;
}

/// Delivers the outcome back to the orchestrator
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(
        &self,
        event: &CustomResourceEvent,
        outcome: &LifecycleOutcome,
    ) -> Result<(), ReportError>;
}

/// Handle one event end to end: validate, dispatch, report once.
///
/// Only a failure to deliver the report escapes as an error.
pub async fn handle_event<L>(
    lifecycle: &L,
    event: &CustomResourceEvent,
    deadline: Deadline,
    clock: &dyn Clock,
    reporter: &dyn Reporter,
) -> Result<LifecycleOutcome, ReportError>
where
    L: ResourceLifecycle + ?Sized,
{
    let span = tracing::info_span!(
        "custom_resource",
        resource_kind = lifecycle.kind(),
        request_type = %event.request_type,
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id,
    );

    async move {
        let outcome = run_lifecycle(lifecycle, event, deadline, clock).await;
        reporter.report(event, &outcome).await?;
        info!(status = ?outcome.status, "Reported outcome");
        Ok(outcome)
    }
    .instrument(span)
    .await
}

/// Validate and dispatch without reporting
pub async fn run_lifecycle<L>(
    lifecycle: &L,
    event: &CustomResourceEvent,
    deadline: Deadline,
    clock: &dyn Clock,
) -> LifecycleOutcome
where
    L: ResourceLifecycle + ?Sized,
{
    let request = match LifecycleRequest::<L::Properties>::from_event(event, deadline) {
        Ok(request) => request,
        Err(err) => {
            error!(error_code = err.code().as_str(), "Rejected event: {}", err);
            return LifecycleOutcome::failed(&err);
        }
    };

    info!(
        operation = %request.operation,
        remaining_ms = deadline.remaining(clock).as_millis() as u64,
        "Received {} event",
        request.operation
    );

    match request.operation {
        Operation::Create => lifecycle.create(&request, clock).await,
        Operation::Update => lifecycle.update(&request, clock).await,
        Operation::Delete => lifecycle.delete(&request, clock).await,
    }
}

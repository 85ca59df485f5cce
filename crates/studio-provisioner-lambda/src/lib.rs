// AWS Lambda runtime adapter
//
// Wires the platform-agnostic lifecycles to the real world: SageMaker SDK for
// provisioning, presigned-URL PUT for responses, Tokio for time.
//
// Philosophy: Use lambda_runtime's provided tokio
// Everything expensive (config, SDK client, HTTP client) is built once per
// cold start and shared across invocations.

use std::collections::BTreeMap;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Serialize;
use studio_provisioner::{
    handle_event, Clock, CustomResourceEvent, Deadline, DomainLifecycle, OutcomeStatus, PollSettings,
    ProfileLifecycle, ResourceLifecycle, SystemClock,
};
use studio_provisioner_config::{HandlerKind, RuntimeConfig};
use tracing::{error, info, warn};

mod init;
mod response;
mod sagemaker;

pub use response::HttpReporter;
pub use sagemaker::SageMakerApi;

/// Invocation result returned to the Lambda service (the real outcome goes to
/// CloudFormation through the ResponseURL)
#[derive(Debug, Serialize)]
pub struct HandlerSummary {
    pub status: OutcomeStatus,
    pub data: BTreeMap<String, String>,
}

pub(crate) struct LambdaState<L> {
    pub lifecycle: L,
    pub reporter: HttpReporter,
    pub clock: SystemClock,
}

/// Lambda handler for one custom resource event
async fn handle_request<L: ResourceLifecycle>(
    event: LambdaEvent<CustomResourceEvent>,
    state: Arc<LambdaState<L>>,
) -> Result<HandlerSummary, Error> {
    let (payload, context) = event.into_parts();

    // A bad deadline must not cost us the report; fall back to zero budget
    let deadline = Deadline::from_epoch_millis(context.deadline).unwrap_or_else(|| {
        warn!(deadline = context.deadline, "Invalid invocation deadline; assuming none left");
        Deadline::at(state.clock.now())
    });

    let outcome = handle_event(
        &state.lifecycle,
        &payload,
        deadline,
        &state.clock,
        &state.reporter,
    )
    .await
    .map_err(|e| {
        error!(request_id = %payload.request_id, "Failed to deliver custom resource response: {}", e);
        Error::from(e)
    })?;

    Ok(HandlerSummary {
        status: outcome.status,
        data: outcome.data,
    })
}

async fn serve<L>(lifecycle: L, reporter: HttpReporter) -> Result<(), Error>
where
    L: ResourceLifecycle + 'static,
{
    let state = Arc::new(LambdaState {
        lifecycle,
        reporter,
        clock: SystemClock,
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<CustomResourceEvent>| {
        let state = state.clone();
        async move { handle_request(event, state).await }
    }))
    .await
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    let config = RuntimeConfig::load()
        .map_err(|e| Error::from(format!("Failed to load configuration: {:#}", e)))?;
    init::init_tracing(&config.logging);

    let kind = config
        .handler_kind()
        .map_err(|e| Error::from(format!("{:#}", e)))?;
    info!(
        handler_kind = %kind,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        build_timestamp = env!("BUILD_TIMESTAMP"),
        "Starting studio-provisioner custom resource handler"
    );

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let api = SageMakerApi::new(aws_sdk_sagemaker::Client::new(&sdk_config));

    let reporter = HttpReporter::new(config.response.timeout(), init::log_stream_name())
        .map_err(|e| Error::from(format!("Failed to build HTTP client: {:#}", e)))?;

    let settings = PollSettings::new(
        config.polling.interval_for(kind),
        config.polling.timeout_margin(),
    );
    info!(
        poll_interval_secs = settings.interval.as_secs(),
        timeout_margin_secs = settings.margin.as_secs(),
        "Polling configured"
    );

    match kind {
        HandlerKind::Domain => {
            serve(DomainLifecycle::new(api).with_poll_settings(settings), reporter).await
        }
        HandlerKind::Profile => {
            serve(ProfileLifecycle::new(api).with_poll_settings(settings), reporter).await
        }
    }
}

// Studio domain lifecycle
//
// Create: CreateDomain, then poll DescribeDomain until InService.
// Update: no-op.
// Delete: ListDomains, DeleteDomain (home EFS removed), then poll until the
//         record disappears.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::clock::Clock;
use crate::error::LifecycleError;
use crate::lifecycle::ResourceLifecycle;
use crate::outcome::LifecycleOutcome;
use crate::poll::{classify_create, classify_delete, PollSettings, Poller};
use crate::provisioning::{domain_id_from_arn, DomainApi, DomainSpec, RetentionPolicy};
use crate::request::{DomainProperties, LifecycleRequest};

/// Data key carrying the domain id
pub const DOMAIN_ID_KEY: &str = "DomainId";

pub struct DomainLifecycle<A> {
    api: A,
    settings: PollSettings,
}

impl<A: DomainApi> DomainLifecycle<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            settings: PollSettings::domain(),
        }
    }

    pub fn with_poll_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn create_domain(&self, spec: &DomainSpec) -> Result<String, LifecycleError> {
        let arn = self.api.create_domain(spec).await?;
        domain_id_from_arn(&arn)
            .map(str::to_string)
            .ok_or(LifecycleError::MissingIdentifier("CreateDomain"))
    }
}

/// Unique default name, `default-<unix millis>`
pub fn generated_domain_name(now: DateTime<Utc>) -> String {
    format!("default-{}", now.timestamp_millis())
}

/// Studio domain ids look like `d-xxxxxxxxxxxx`
fn is_domain_id(id: &str) -> bool {
    id.strip_prefix("d-").is_some_and(|rest| !rest.is_empty())
}

/// Pick the domain to delete.
///
/// A physical id that is a domain id pins the choice: if that domain is no
/// longer listed there is nothing to delete. Any other physical id (the log
/// stream reported by a create that failed before a domain existed) falls
/// back to the first listed domain, as a Studio account holds one.
fn select_domain<'a>(domains: &'a [String], physical_id: Option<&str>) -> Option<&'a str> {
    match physical_id {
        Some(id) if is_domain_id(id) => domains
            .iter()
            .find(|d| d.as_str() == id)
            .map(String::as_str),
        _ => domains.first().map(String::as_str),
    }
}

#[async_trait]
impl<A: DomainApi> ResourceLifecycle for DomainLifecycle<A> {
    type Properties = DomainProperties;

    fn kind(&self) -> &'static str {
        "domain"
    }

    async fn create(
        &self,
        request: &LifecycleRequest<DomainProperties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome {
        let props = &request.properties;
        let spec = DomainSpec {
            name: props
                .domain_name
                .clone()
                .unwrap_or_else(|| generated_domain_name(clock.now())),
            auth_mode: props.auth_mode,
            vpc_id: props.vpc_id.clone(),
            subnet_ids: props.subnet_ids.clone(),
            default_execution_role: props.default_execution_role.clone(),
        };

        info!(domain_name = %spec.name, vpc_id = %spec.vpc_id, "Creating domain");
        let domain_id = match self.create_domain(&spec).await {
            Ok(id) => id,
            Err(err) => {
                error!(error_code = err.code().as_str(), "Create domain failed: {}", err);
                return LifecycleOutcome::failed(&err);
            }
        };

        let api = &self.api;
        let id = domain_id.as_str();
        let poller = Poller::new(clock, request.deadline, self.settings);
        match poller
            .run(classify_create, move || api.describe_domain(id))
            .await
        {
            Ok(_) => {
                info!(resource_id = %domain_id, "Domain is InService");
                LifecycleOutcome::success()
                    .with_data(DOMAIN_ID_KEY, domain_id.as_str())
                    .with_physical_id(domain_id)
            }
            Err(err) => {
                error!(
                    resource_id = %domain_id,
                    error_code = err.code().as_str(),
                    "Create domain failed: {}",
                    err
                );
                LifecycleOutcome::failed(&err)
                    .with_data(DOMAIN_ID_KEY, domain_id.as_str())
                    .with_physical_id(domain_id)
            }
        }
    }

    async fn update(
        &self,
        _request: &LifecycleRequest<DomainProperties>,
        _clock: &dyn Clock,
    ) -> LifecycleOutcome {
        info!("Domain updates are not supported; nothing to do");
        LifecycleOutcome::success()
    }

    async fn delete(
        &self,
        request: &LifecycleRequest<DomainProperties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome {
        let domains = match self.api.list_domains().await {
            Ok(domains) => domains,
            Err(err) => {
                let err = LifecycleError::from(err);
                error!(error_code = err.code().as_str(), "List domains failed: {}", err);
                return LifecycleOutcome::failed(&err);
            }
        };

        let physical_id = request.physical_resource_id.as_deref();
        let Some(domain_id) = select_domain(&domains, physical_id) else {
            info!(
                physical_resource_id = physical_id.unwrap_or_default(),
                listed = domains.len(),
                "Domain not found; nothing to delete"
            );
            return LifecycleOutcome::success();
        };

        info!(resource_id = %domain_id, "Deleting domain");
        let api = &self.api;
        let result = async {
            api.delete_domain(domain_id, RetentionPolicy::Delete)
                .await?;
            Poller::new(clock, request.deadline, self.settings)
                .run(classify_delete, move || api.describe_domain(domain_id))
                .await
        }
        .await;

        let err = match result {
            Err(err) if err.is_not_found() => {
                info!(resource_id = %domain_id, "Domain successfully deleted");
                return LifecycleOutcome::success().with_data(DOMAIN_ID_KEY, domain_id);
            }
            Err(err) => err,
            // classify_delete never settles on a status
            Ok(status) => LifecycleError::TerminalStatus(status),
        };

        error!(
            resource_id = %domain_id,
            error_code = err.code().as_str(),
            "Delete domain failed: {}",
            err
        );
        LifecycleOutcome::failed(&err).with_data(DOMAIN_ID_KEY, domain_id)
    }
}

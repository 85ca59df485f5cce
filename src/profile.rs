// Studio user profile lifecycle

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::error::LifecycleError;
use crate::lifecycle::ResourceLifecycle;
use crate::outcome::LifecycleOutcome;
use crate::poll::{classify_create, classify_delete, PollSettings, Poller};
use crate::provisioning::{ApiResult, ProfileApi, ProfileSpec, TagChanges};
use crate::request::{LifecycleRequest, ProfileProperties};

pub const PROFILE_ARN_KEY: &str = "UserProfileArn";
pub const PROFILE_NAME_KEY: &str = "UserProfileName";

pub struct ProfileLifecycle<A> {
    api: A,
    settings: PollSettings,
}

impl<A: ProfileApi> ProfileLifecycle<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            settings: PollSettings::profile(),
        }
    }

    pub fn with_poll_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn create_and_wait(
        &self,
        request: &LifecycleRequest<ProfileProperties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome {
        let spec = profile_spec(&request.properties);

        info!(domain_id = %spec.domain_id, profile = %spec.profile_name, "Creating user profile");
        let arn = match self.api.create_profile(&spec).await {
            Ok(arn) => arn,
            Err(err) => {
                let err = LifecycleError::from(err);
                error!(error_code = err.code().as_str(), "Create user profile failed: {}", err);
                return LifecycleOutcome::failed(&err);
            }
        };

        let api = &self.api;
        let (domain_id, name) = (spec.domain_id.as_str(), spec.profile_name.as_str());
        let result = Poller::new(clock, request.deadline, self.settings)
            .run(classify_create, move || api.describe_profile(domain_id, name))
            .await;

        match result {
            Ok(_) => {
                info!(resource_id = %arn, "User profile is InService");
                LifecycleOutcome::success()
                    .with_data(PROFILE_ARN_KEY, arn)
                    .with_physical_id(name)
            }
            Err(err) => {
                error!(
                    resource_id = %arn,
                    error_code = err.code().as_str(),
                    "Create user profile failed: {}",
                    err
                );
                LifecycleOutcome::failed(&err)
                    .with_data(PROFILE_ARN_KEY, arn)
                    .with_physical_id(name)
            }
        }
    }

    /// UpdateUserProfile does not touch tags; reconcile them on the ARN
    async fn sync_tags(&self, arn: &str, changes: &TagChanges) -> ApiResult<()> {
        if !changes.remove.is_empty() {
            info!(resource_id = %arn, keys = ?changes.remove, "Removing user profile tags");
            self.api.delete_tags(arn, &changes.remove).await?;
        }
        if !changes.upsert.is_empty() {
            info!(resource_id = %arn, count = changes.upsert.len(), "Applying user profile tags");
            self.api.add_tags(arn, &changes.upsert).await?;
        }
        Ok(())
    }
}

fn profile_spec(props: &ProfileProperties) -> ProfileSpec {
    ProfileSpec {
        domain_id: props.domain_id.clone(),
        profile_name: props.user_profile_name.clone(),
        execution_role: props.execution_role.clone(),
        tags: props.tags.clone(),
    }
}

#[async_trait]
impl<A: ProfileApi> ResourceLifecycle for ProfileLifecycle<A> {
    type Properties = ProfileProperties;

    fn kind(&self) -> &'static str {
        "profile"
    }

    async fn create(
        &self,
        request: &LifecycleRequest<ProfileProperties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome {
        self.create_and_wait(request, clock).await
    }

    /// Update in place; recreate when the profile was removed out of band.
    async fn update(
        &self,
        request: &LifecycleRequest<ProfileProperties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome {
        let spec = profile_spec(&request.properties);

        info!(domain_id = %spec.domain_id, profile = %spec.profile_name, "Updating user profile");
        let arn = match self.api.update_profile(&spec).await {
            Ok(arn) => arn,
            Err(err) if err.is_not_found() => {
                warn!(profile = %spec.profile_name, "User profile not found; creating it");
                return self.create_and_wait(request, clock).await;
            }
            Err(err) => {
                let err = LifecycleError::from(err);
                error!(error_code = err.code().as_str(), "Update user profile failed: {}", err);
                return LifecycleOutcome::failed(&err);
            }
        };

        // Without readable old properties every tag is re-applied
        let old_tags = request
            .old_properties
            .as_ref()
            .map(|old| old.tags.as_slice())
            .unwrap_or_default();
        let changes = TagChanges::between(old_tags, &spec.tags);

        match self.sync_tags(&arn, &changes).await {
            Ok(()) => LifecycleOutcome::success()
                .with_data(PROFILE_ARN_KEY, arn)
                .with_physical_id(spec.profile_name),
            Err(err) => {
                let err = LifecycleError::from(err);
                error!(
                    resource_id = %arn,
                    error_code = err.code().as_str(),
                    "Update user profile tags failed: {}",
                    err
                );
                LifecycleOutcome::failed(&err)
                    .with_data(PROFILE_ARN_KEY, arn)
                    .with_physical_id(spec.profile_name)
            }
        }
    }

    async fn delete(
        &self,
        request: &LifecycleRequest<ProfileProperties>,
        clock: &dyn Clock,
    ) -> LifecycleOutcome {
        let props = &request.properties;
        let domain_id = props.domain_id.as_str();
        let name = props.user_profile_name.as_str();

        if !props.identifies_profile() {
            info!("Properties name no user profile; nothing to delete");
            return LifecycleOutcome::success();
        }

        info!(domain_id = %domain_id, profile = %name, "Deleting user profile");
        let api = &self.api;
        let result = async {
            api.delete_profile(domain_id, name).await?;
            Poller::new(clock, request.deadline, self.settings)
                .run(classify_delete, move || api.describe_profile(domain_id, name))
                .await
        }
        .await;

        let err = match result {
            Err(err) if err.is_not_found() => {
                info!(profile = %name, "User profile successfully deleted");
                return LifecycleOutcome::success().with_data(PROFILE_NAME_KEY, name);
            }
            Err(err) => err,
            // classify_delete never settles on a status
            Ok(status) => LifecycleError::TerminalStatus(status),
        };

        error!(
            profile = %name,
            error_code = err.code().as_str(),
            "Delete user profile failed: {}",
            err
        );
        LifecycleOutcome::failed(&err).with_data(PROFILE_NAME_KEY, name)
    }
}

// SageMaker control plane adapter
//
// Implements the provisioning traits on top of aws-sdk-sagemaker. The only
// error the lifecycles interpret is ResourceNotFound; everything else is
// flattened into ProvisioningError::Api with the service error code.

use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_sagemaker::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sagemaker::types::{
    AuthMode as SdkAuthMode, RetentionPolicy as SdkRetentionPolicy, RetentionType,
    Tag as SdkTag, UserSettings,
};
use aws_sdk_sagemaker::Client;
use studio_provisioner::{
    ApiResult, AuthMode, DomainApi, DomainSpec, ProfileApi, ProfileSpec, ProvisioningError,
    ResourceStatus, RetentionPolicy, Tag,
};
use tracing::debug;

const NOT_FOUND_CODE: &str = "ResourceNotFound";

#[derive(Clone)]
pub struct SageMakerApi {
    client: Client,
}

impl SageMakerApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Map an SDK error onto the provisioning taxonomy
fn classify_error<E, R>(operation: &'static str, subject: &str, err: SdkError<E, R>) -> ProvisioningError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    match err.code() {
        Some(NOT_FOUND_CODE) => ProvisioningError::NotFound(subject.to_string()),
        code => {
            let code = code.map(str::to_string);
            ProvisioningError::api(operation, code, DisplayErrorContext(&err).to_string())
        }
    }
}

fn status_from(status: Option<&str>) -> ResourceStatus {
    ResourceStatus::from_provider(status.unwrap_or("Unknown"))
}

fn sdk_auth_mode(mode: AuthMode) -> SdkAuthMode {
    match mode {
        AuthMode::Iam => SdkAuthMode::Iam,
        AuthMode::Sso => SdkAuthMode::Sso,
    }
}

fn sdk_tags(operation: &'static str, tags: &[Tag]) -> ApiResult<Vec<SdkTag>> {
    tags.iter()
        .map(|tag| {
            // `Tag::build` is infallible in this SDK version.
            let _ = operation;
            Ok(SdkTag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build())
        })
        .collect()
}

fn user_settings(execution_role: &str) -> UserSettings {
    UserSettings::builder()
        .execution_role(execution_role)
        .build()
}

#[async_trait]
impl DomainApi for SageMakerApi {
    async fn create_domain(&self, spec: &DomainSpec) -> ApiResult<String> {
        let output = self
            .client
            .create_domain()
            .domain_name(&spec.name)
            .auth_mode(sdk_auth_mode(spec.auth_mode))
            .vpc_id(&spec.vpc_id)
            .set_subnet_ids(Some(spec.subnet_ids.clone()))
            .default_user_settings(user_settings(&spec.default_execution_role))
            .send()
            .await
            .map_err(|e| classify_error("CreateDomain", &spec.name, e))?;

        output.domain_arn().map(str::to_string).ok_or_else(|| {
            ProvisioningError::api("CreateDomain", None, "response did not include DomainArn")
        })
    }

    async fn describe_domain(&self, domain_id: &str) -> ApiResult<ResourceStatus> {
        let output = self
            .client
            .describe_domain()
            .domain_id(domain_id)
            .send()
            .await
            .map_err(|e| classify_error("DescribeDomain", domain_id, e))?;

        let status = status_from(output.status().map(|s| s.as_str()));
        debug!(resource_id = %domain_id, status = %status, "Described domain");
        Ok(status)
    }

    async fn list_domains(&self) -> ApiResult<Vec<String>> {
        let mut ids = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_domains()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| classify_error("ListDomains", "domains", e))?;

            ids.extend(
                output
                    .domains()
                    .iter()
                    .filter_map(|d| d.domain_id().map(str::to_string)),
            );

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(ids)
    }

    async fn delete_domain(&self, domain_id: &str, retention: RetentionPolicy) -> ApiResult<()> {
        let retention_type = match retention {
            RetentionPolicy::Retain => RetentionType::Retain,
            RetentionPolicy::Delete => RetentionType::Delete,
        };

        self.client
            .delete_domain()
            .domain_id(domain_id)
            .retention_policy(
                SdkRetentionPolicy::builder()
                    .home_efs_file_system(retention_type)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_error("DeleteDomain", domain_id, e))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileApi for SageMakerApi {
    async fn create_profile(&self, spec: &ProfileSpec) -> ApiResult<String> {
        let tags = sdk_tags("CreateUserProfile", &spec.tags)?;
        let output = self
            .client
            .create_user_profile()
            .domain_id(&spec.domain_id)
            .user_profile_name(&spec.profile_name)
            .user_settings(user_settings(&spec.execution_role))
            .set_tags((!tags.is_empty()).then_some(tags))
            .send()
            .await
            .map_err(|e| classify_error("CreateUserProfile", &spec.profile_name, e))?;

        output.user_profile_arn().map(str::to_string).ok_or_else(|| {
            ProvisioningError::api(
                "CreateUserProfile",
                None,
                "response did not include UserProfileArn",
            )
        })
    }

    async fn describe_profile(
        &self,
        domain_id: &str,
        profile_name: &str,
    ) -> ApiResult<ResourceStatus> {
        let output = self
            .client
            .describe_user_profile()
            .domain_id(domain_id)
            .user_profile_name(profile_name)
            .send()
            .await
            .map_err(|e| classify_error("DescribeUserProfile", profile_name, e))?;

        let status = status_from(output.status().map(|s| s.as_str()));
        debug!(profile = %profile_name, status = %status, "Described user profile");
        Ok(status)
    }

    async fn update_profile(&self, spec: &ProfileSpec) -> ApiResult<String> {
        let output = self
            .client
            .update_user_profile()
            .domain_id(&spec.domain_id)
            .user_profile_name(&spec.profile_name)
            .user_settings(user_settings(&spec.execution_role))
            .send()
            .await
            .map_err(|e| classify_error("UpdateUserProfile", &spec.profile_name, e))?;

        output.user_profile_arn().map(str::to_string).ok_or_else(|| {
            ProvisioningError::api(
                "UpdateUserProfile",
                None,
                "response did not include UserProfileArn",
            )
        })
    }

    async fn delete_profile(&self, domain_id: &str, profile_name: &str) -> ApiResult<()> {
        self.client
            .delete_user_profile()
            .domain_id(domain_id)
            .user_profile_name(profile_name)
            .send()
            .await
            .map_err(|e| classify_error("DeleteUserProfile", profile_name, e))?;
        Ok(())
    }

    async fn add_tags(&self, profile_arn: &str, tags: &[Tag]) -> ApiResult<()> {
        let tags = sdk_tags("AddTags", tags)?;
        self.client
            .add_tags()
            .resource_arn(profile_arn)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| classify_error("AddTags", profile_arn, e))?;
        Ok(())
    }

    async fn delete_tags(&self, profile_arn: &str, keys: &[String]) -> ApiResult<()> {
        self.client
            .delete_tags()
            .resource_arn(profile_arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(|e| classify_error("DeleteTags", profile_arn, e))?;
        Ok(())
    }
}

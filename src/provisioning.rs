// Provisioning API seam
//
// The lifecycles only talk to the remote service through these traits. The
// Lambda crate implements them on top of the SageMaker SDK; tests use
// scripted fakes.

use async_trait::async_trait;

use crate::error::ProvisioningError;
use crate::request::{AuthMode, Tag};
use crate::status::ResourceStatus;

pub type ApiResult<T> = std::result::Result<T, ProvisioningError>;

/// Arguments of a domain create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub name: String,
    pub auth_mode: AuthMode,
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub default_execution_role: String,
}

/// What happens to the domain's home file system on delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Retain,
    Delete,
}

/// Arguments of a profile create or update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSpec {
    pub domain_id: String,
    pub profile_name: String,
    pub execution_role: String,
    pub tags: Vec<Tag>,
}

#[async_trait]
pub trait DomainApi: Send + Sync {
    /// Returns the ARN of the new domain
    async fn create_domain(&self, spec: &DomainSpec) -> ApiResult<String>;

    async fn describe_domain(&self, domain_id: &str) -> ApiResult<ResourceStatus>;

    /// Ids of all domains in the account and region
    async fn list_domains(&self) -> ApiResult<Vec<String>>;

    async fn delete_domain(&self, domain_id: &str, retention: RetentionPolicy) -> ApiResult<()>;
}

#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Returns the ARN of the new profile
    async fn create_profile(&self, spec: &ProfileSpec) -> ApiResult<String>;

    async fn describe_profile(&self, domain_id: &str, profile_name: &str)
        -> ApiResult<ResourceStatus>;

    /// Returns the ARN of the updated profile
    async fn update_profile(&self, spec: &ProfileSpec) -> ApiResult<String>;

    async fn delete_profile(&self, domain_id: &str, profile_name: &str) -> ApiResult<()>;

    /// Add or overwrite tags on the profile ARN
    async fn add_tags(&self, profile_arn: &str, tags: &[Tag]) -> ApiResult<()>;

    async fn delete_tags(&self, profile_arn: &str, keys: &[String]) -> ApiResult<()>;
}

/// Tag changes needed to move a resource from `old` to `new`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    /// New or changed tags
    pub upsert: Vec<Tag>,
    /// Keys present before and absent now
    pub remove: Vec<String>,
}

impl TagChanges {
    pub fn between(old: &[Tag], new: &[Tag]) -> Self {
        let upsert = new
            .iter()
            .filter(|tag| !old.contains(tag))
            .cloned()
            .collect();
        let remove = old
            .iter()
            .filter(|tag| !new.iter().any(|n| n.key == tag.key))
            .map(|tag| tag.key.clone())
            .collect();
        Self { upsert, remove }
    }

    pub fn is_empty(&self) -> bool {
        self.upsert.is_empty() && self.remove.is_empty()
    }
}

/// Domain id from a domain ARN (`arn:aws:sagemaker:<region>:<account>:domain/<id>`)
pub fn domain_id_from_arn(arn: &str) -> Option<&str> {
    arn.split_once('/')
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

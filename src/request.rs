// Inbound custom resource events and their validated form
//
// CloudFormation delivers a loosely typed JSON event. It is deserialized into
// CustomResourceEvent (which must always succeed far enough to know where to
// send the response), then validated into a LifecycleRequest with typed
// properties before anything touches the provisioning API.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Deadline;
use crate::error::{LifecycleError, Result};

/// Raw custom resource event as sent by CloudFormation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "Create"),
            Operation::Update => write!(f, "Update"),
            Operation::Delete => write!(f, "Delete"),
        }
    }
}

impl FromStr for Operation {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Create" => Ok(Operation::Create),
            "Update" => Ok(Operation::Update),
            "Delete" => Ok(Operation::Delete),
            other => Err(LifecycleError::UnknownRequestType(other.to_string())),
        }
    }
}

/// Typed resource properties with a construction-time validation step.
///
/// Only Create and Update validate. A Delete must go through even when the
/// properties that failed the original Create are replayed to it, so Delete
/// parses leniently and falls back to `Default`.
pub trait ResourceProperties: DeserializeOwned + Default + Send + Sync {
    fn validate(&self) -> Result<()>;
}

/// A validated lifecycle invocation
#[derive(Debug, Clone)]
pub struct LifecycleRequest<P> {
    pub operation: Operation,
    pub properties: P,
    /// Previous properties on Update, when they parse
    pub old_properties: Option<P>,
    pub physical_resource_id: Option<String>,
    pub deadline: Deadline,
}

impl<P: ResourceProperties> LifecycleRequest<P> {
    /// Validate a raw event. Fails before any remote call is attempted.
    pub fn from_event(event: &CustomResourceEvent, deadline: Deadline) -> Result<Self> {
        let operation = event.request_type.parse::<Operation>()?;

        let properties: P = match operation {
            Operation::Create | Operation::Update => {
                let properties: P = serde_json::from_value(event.resource_properties.clone())
                    .map_err(|e| LifecycleError::InvalidProperties(e.to_string()))?;
                properties.validate()?;
                properties
            }
            Operation::Delete => serde_json::from_value(event.resource_properties.clone())
                .unwrap_or_else(|e| {
                    warn!("Unreadable resource properties on Delete: {}", e);
                    P::default()
                }),
        };

        let old_properties = event
            .old_resource_properties
            .clone()
            .and_then(|value| serde_json::from_value(value).ok());

        let physical_resource_id = event
            .physical_resource_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(Self {
            operation,
            properties,
            old_properties,
            physical_resource_id,
            deadline,
        })
    }
}

/// Studio authentication mode for a new domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthMode {
    #[default]
    #[serde(rename = "IAM")]
    Iam,
    #[serde(rename = "SSO")]
    Sso,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Iam => "IAM",
            AuthMode::Sso => "SSO",
        }
    }
}

/// Properties of the domain custom resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DomainProperties {
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub default_execution_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    pub auth_mode: AuthMode,
}

impl ResourceProperties for DomainProperties {
    fn validate(&self) -> Result<()> {
        require_non_empty("VpcId", &self.vpc_id)?;
        require_non_empty("DefaultExecutionRole", &self.default_execution_role)?;

        if self.subnet_ids.is_empty() {
            return Err(LifecycleError::InvalidProperties(
                "SubnetIds must contain at least one subnet".to_string(),
            ));
        }
        if self.subnet_ids.iter().any(|s| s.trim().is_empty()) {
            return Err(LifecycleError::InvalidProperties(
                "SubnetIds must not contain empty entries".to_string(),
            ));
        }
        if let Some(name) = &self.domain_name {
            require_non_empty("DomainName", name)?;
        }

        Ok(())
    }
}

/// Key/value tag attached to a user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Properties of the user profile custom resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProfileProperties {
    pub domain_id: String,
    pub user_profile_name: String,
    pub execution_role: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl ProfileProperties {
    /// Whether the properties still identify a profile to delete
    pub fn identifies_profile(&self) -> bool {
        !self.domain_id.trim().is_empty() && !self.user_profile_name.trim().is_empty()
    }
}

impl ResourceProperties for ProfileProperties {
    fn validate(&self) -> Result<()> {
        require_non_empty("DomainId", &self.domain_id)?;
        require_non_empty("UserProfileName", &self.user_profile_name)?;
        require_non_empty("ExecutionRole", &self.execution_role)?;

        for tag in &self.tags {
            require_non_empty("Tags[].Key", &tag.key)?;
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LifecycleError::InvalidProperties(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

// Remote resource status as reported by the provisioning API
//
// Only the statuses the lifecycle reasons about get their own variant.
// Everything else (Updating, Update_Failed, Delete_Failed, ...) is kept
// verbatim in Other so it can be logged and reported.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Pending,
    InService,
    Deleting,
    Failed,
    Other(String),
}

impl ResourceStatus {
    /// Map a provider status string onto the known subset
    pub fn from_provider(status: &str) -> Self {
        match status {
            "Pending" => ResourceStatus::Pending,
            "InService" => ResourceStatus::InService,
            "Deleting" => ResourceStatus::Deleting,
            "Failed" => ResourceStatus::Failed,
            other => ResourceStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResourceStatus::Pending => "Pending",
            ResourceStatus::InService => "InService",
            ResourceStatus::Deleting => "Deleting",
            ResourceStatus::Failed => "Failed",
            ResourceStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Terminal outcome of a lifecycle invocation and its wire representation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::request::CustomResourceEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// The single terminal result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub status: OutcomeStatus,
    pub data: BTreeMap<String, String>,
    pub reason: Option<String>,
    pub physical_resource_id: Option<String>,
}

impl LifecycleOutcome {
    pub fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
            data: BTreeMap::new(),
            reason: None,
            physical_resource_id: None,
        }
    }

    pub fn failed(error: &LifecycleError) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            data: BTreeMap::new(),
            reason: Some(format!("[{}] {}", error.code().as_str(), error)),
            physical_resource_id: None,
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_physical_id(mut self, id: impl Into<String>) -> Self {
        self.physical_resource_id = Some(id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Response body PUT to the event's ResponseURL
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: OutcomeStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: BTreeMap<String, String>,
}

impl CustomResourceResponse {
    /// Build the response for `event`.
    ///
    /// The physical id falls back from the outcome, to the id CloudFormation
    /// already knows, to the log stream name. The reason always points at the
    /// log stream so operators can find the invocation logs.
    pub fn new(event: &CustomResourceEvent, outcome: &LifecycleOutcome, log_stream: &str) -> Self {
        let log_hint = format!("See the details in CloudWatch Log Stream: {}", log_stream);
        let reason = match &outcome.reason {
            Some(reason) => format!("{} ({})", reason, log_hint),
            None => log_hint,
        };

        let physical_resource_id = outcome
            .physical_resource_id
            .clone()
            .or_else(|| {
                event
                    .physical_resource_id
                    .clone()
                    .filter(|id| !id.is_empty())
            })
            .unwrap_or_else(|| log_stream.to_string());

        Self {
            status: outcome.status,
            reason,
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: outcome.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(physical_id: Option<&str>) -> CustomResourceEvent {
        CustomResourceEvent {
            request_type: "Delete".to_string(),
            response_url: "https://example.com/response".to_string(),
            stack_id: "stack-1".to_string(),
            request_id: "req-1".to_string(),
            resource_type: "Custom::StudioDomain".to_string(),
            logical_resource_id: "StudioDomain".to_string(),
            physical_resource_id: physical_id.map(str::to_string),
            resource_properties: json!({}),
            old_resource_properties: None,
        }
    }

    #[test]
    fn test_response_wire_format() {
        let outcome = LifecycleOutcome::success()
            .with_data("DomainId", "d-123")
            .with_physical_id("d-123");
        let response = CustomResourceResponse::new(&event(None), &outcome, "2024/01/01/[$LATEST]abc");

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "Status": "SUCCESS",
                "Reason": "See the details in CloudWatch Log Stream: 2024/01/01/[$LATEST]abc",
                "PhysicalResourceId": "d-123",
                "StackId": "stack-1",
                "RequestId": "req-1",
                "LogicalResourceId": "StudioDomain",
                "NoEcho": false,
                "Data": { "DomainId": "d-123" }
            })
        );
    }

    #[test]
    fn test_physical_id_fallbacks() {
        let outcome = LifecycleOutcome::success();
        let from_event = CustomResourceResponse::new(&event(Some("d-existing")), &outcome, "stream");
        assert_eq!(from_event.physical_resource_id, "d-existing");

        let from_stream = CustomResourceResponse::new(&event(Some("")), &outcome, "stream");
        assert_eq!(from_stream.physical_resource_id, "stream");
    }

    #[test]
    fn test_failed_reason_includes_code() {
        let outcome = LifecycleOutcome::failed(&LifecycleError::ConcurrentDelete);
        let response = CustomResourceResponse::new(&event(None), &outcome, "stream");
        assert_eq!(response.status, OutcomeStatus::Failed);
        assert!(response.reason.starts_with("[SP005] resource is being deleted"));
        assert!(response.reason.ends_with("Log Stream: stream)"));
    }
}

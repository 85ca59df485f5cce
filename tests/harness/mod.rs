//! Test doubles for lifecycle integration tests
//!
//! - `FakeClock`: time only moves when the lifecycle sleeps
//! - `ScriptedDomainApi` / `ScriptedProfileApi`: replay a scripted sequence of
//!   describe results and record every call
//! - `RecordingReporter`: captures every reported outcome
//!
//! An exhausted describe script answers NotFound, which is what the real API
//! does once a record is gone.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use studio_provisioner::{
    ApiResult, Clock, CustomResourceEvent, CustomResourceResponse, Deadline, DomainApi,
    DomainSpec, LifecycleOutcome, ProfileApi, ProfileSpec, ProvisioningError, ReportError,
    Reporter, ResourceStatus, RetentionPolicy, Tag,
};

pub const DOMAIN_ID: &str = "d-abcdef123456";
pub const DOMAIN_ARN: &str = "arn:aws:sagemaker:us-east-1:123456789012:domain/d-abcdef123456";
pub const PROFILE_NAME: &str = "data-scientist-full";
pub const PROFILE_ARN: &str =
    "arn:aws:sagemaker:us-east-1:123456789012:user-profile/d-abcdef123456/data-scientist-full";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        let start = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Deadline `secs` seconds from the current fake time
    pub fn deadline_in(&self, secs: i64) -> Deadline {
        Deadline::at(self.now() + chrono::Duration::seconds(secs))
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(duration).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Provisioning APIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateDomain(DomainSpec),
    DescribeDomain(String),
    ListDomains,
    DeleteDomain(String, RetentionPolicy),
    CreateProfile(ProfileSpec),
    DescribeProfile(String, String),
    UpdateProfile(ProfileSpec),
    DeleteProfile(String, String),
    AddTags(String, Vec<Tag>),
    DeleteTags(String, Vec<String>),
}

pub fn not_found(what: &str) -> ProvisioningError {
    ProvisioningError::NotFound(what.to_string())
}

pub fn throttled(operation: &'static str) -> ProvisioningError {
    ProvisioningError::api(operation, Some("ThrottlingException".into()), "Rate exceeded")
}

pub struct ScriptedDomainApi {
    pub create_result: Mutex<ApiResult<String>>,
    pub describe_script: Mutex<VecDeque<ApiResult<ResourceStatus>>>,
    pub domains: Mutex<Vec<String>>,
    pub delete_result: Mutex<ApiResult<()>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedDomainApi {
    pub fn new() -> Self {
        Self {
            create_result: Mutex::new(Ok(DOMAIN_ARN.to_string())),
            describe_script: Mutex::new(VecDeque::new()),
            domains: Mutex::new(Vec::new()),
            delete_result: Mutex::new(Ok(())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = ResourceStatus>) -> Self {
        self.describe_script
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(Ok));
        self
    }

    pub fn then_describe(self, result: ApiResult<ResourceStatus>) -> Self {
        self.describe_script.lock().unwrap().push_back(result);
        self
    }

    pub fn with_domains(self, domains: &[&str]) -> Self {
        *self.domains.lock().unwrap() = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::DescribeDomain(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DomainApi for ScriptedDomainApi {
    async fn create_domain(&self, spec: &DomainSpec) -> ApiResult<String> {
        self.record(Call::CreateDomain(spec.clone()));
        self.create_result.lock().unwrap().clone()
    }

    async fn describe_domain(&self, domain_id: &str) -> ApiResult<ResourceStatus> {
        self.record(Call::DescribeDomain(domain_id.to_string()));
        self.describe_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(not_found(domain_id)))
    }

    async fn list_domains(&self) -> ApiResult<Vec<String>> {
        self.record(Call::ListDomains);
        Ok(self.domains.lock().unwrap().clone())
    }

    async fn delete_domain(&self, domain_id: &str, retention: RetentionPolicy) -> ApiResult<()> {
        self.record(Call::DeleteDomain(domain_id.to_string(), retention));
        let result = self.delete_result.lock().unwrap().clone();
        if result.is_ok() {
            self.domains.lock().unwrap().retain(|d| d != domain_id);
        }
        result
    }
}

pub struct ScriptedProfileApi {
    pub create_result: Mutex<ApiResult<String>>,
    pub update_result: Mutex<ApiResult<String>>,
    pub describe_script: Mutex<VecDeque<ApiResult<ResourceStatus>>>,
    pub delete_result: Mutex<ApiResult<()>>,
    pub tag_result: Mutex<ApiResult<()>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProfileApi {
    pub fn new() -> Self {
        Self {
            create_result: Mutex::new(Ok(PROFILE_ARN.to_string())),
            update_result: Mutex::new(Ok(PROFILE_ARN.to_string())),
            describe_script: Mutex::new(VecDeque::new()),
            delete_result: Mutex::new(Ok(())),
            tag_result: Mutex::new(Ok(())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = ResourceStatus>) -> Self {
        self.describe_script
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(Ok));
        self
    }

    pub fn then_describe(self, result: ApiResult<ResourceStatus>) -> Self {
        self.describe_script.lock().unwrap().push_back(result);
        self
    }

    pub fn with_tag_result(self, result: ApiResult<()>) -> Self {
        *self.tag_result.lock().unwrap() = result;
        self
    }

    pub fn with_update_result(self, result: ApiResult<String>) -> Self {
        *self.update_result.lock().unwrap() = result;
        self
    }

    pub fn with_delete_result(self, result: ApiResult<()>) -> Self {
        *self.delete_result.lock().unwrap() = result;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ProfileApi for ScriptedProfileApi {
    async fn create_profile(&self, spec: &ProfileSpec) -> ApiResult<String> {
        self.record(Call::CreateProfile(spec.clone()));
        self.create_result.lock().unwrap().clone()
    }

    async fn describe_profile(
        &self,
        domain_id: &str,
        profile_name: &str,
    ) -> ApiResult<ResourceStatus> {
        self.record(Call::DescribeProfile(
            domain_id.to_string(),
            profile_name.to_string(),
        ));
        self.describe_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(not_found(profile_name)))
    }

    async fn update_profile(&self, spec: &ProfileSpec) -> ApiResult<String> {
        self.record(Call::UpdateProfile(spec.clone()));
        self.update_result.lock().unwrap().clone()
    }

    async fn delete_profile(&self, domain_id: &str, profile_name: &str) -> ApiResult<()> {
        self.record(Call::DeleteProfile(
            domain_id.to_string(),
            profile_name.to_string(),
        ));
        self.delete_result.lock().unwrap().clone()
    }

    async fn add_tags(&self, profile_arn: &str, tags: &[Tag]) -> ApiResult<()> {
        self.record(Call::AddTags(profile_arn.to_string(), tags.to_vec()));
        self.tag_result.lock().unwrap().clone()
    }

    async fn delete_tags(&self, profile_arn: &str, keys: &[String]) -> ApiResult<()> {
        self.record(Call::DeleteTags(profile_arn.to_string(), keys.to_vec()));
        self.tag_result.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<CustomResourceResponse>>,
    pub fail_delivery: bool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail_delivery: true,
        }
    }

    pub fn reports(&self) -> Vec<CustomResourceResponse> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(
        &self,
        event: &CustomResourceEvent,
        outcome: &LifecycleOutcome,
    ) -> Result<(), ReportError> {
        self.reports
            .lock()
            .unwrap()
            .push(CustomResourceResponse::new(event, outcome, "test-stream"));
        if self.fail_delivery {
            return Err(ReportError::Delivery("connection reset".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

fn event(
    request_type: &str,
    resource_type: &str,
    logical_id: &str,
    physical_id: Option<&str>,
    properties: serde_json::Value,
) -> CustomResourceEvent {
    let mut value = json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:studio",
        "ResponseURL": "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/presigned",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/studio/1234",
        "RequestId": "5d478078-13e9-baf0-464a-7ef285ecc786",
        "ResourceType": resource_type,
        "LogicalResourceId": logical_id,
        "ResourceProperties": properties,
    });
    if let Some(id) = physical_id {
        value["PhysicalResourceId"] = json!(id);
    }
    serde_json::from_value(value).unwrap()
}

pub fn domain_event(request_type: &str, physical_id: Option<&str>) -> CustomResourceEvent {
    event(
        request_type,
        "Custom::StudioDomain",
        "SageMakerDomain",
        physical_id,
        json!({
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:studio-domain",
            "VpcId": "vpc-0a1b2c3d",
            "SubnetIds": ["subnet-1111", "subnet-2222"],
            "DefaultExecutionRole": "arn:aws:iam::123456789012:role/StudioDefault"
        }),
    )
}

pub fn profile_event(request_type: &str, physical_id: Option<&str>) -> CustomResourceEvent {
    event(
        request_type,
        "Custom::StudioUserProfile",
        "SageMakerUserProfileDataScientistFull",
        physical_id,
        json!({
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:studio-profile",
            "DomainId": DOMAIN_ID,
            "UserProfileName": PROFILE_NAME,
            "ExecutionRole": "arn:aws:iam::123456789012:role/DataScientistFull",
            "Tags": [{ "Key": "studiouserid", "Value": PROFILE_NAME }]
        }),
    )
}

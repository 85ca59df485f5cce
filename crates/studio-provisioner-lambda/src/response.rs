// Custom resource response delivery
//
// CloudFormation waits on a presigned S3 URL for the outcome. The body is the
// JSON CustomResourceResponse; the Content-Type header is sent empty because
// the URL signature does not cover one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use studio_provisioner::{
    CustomResourceEvent, CustomResourceResponse, LifecycleOutcome, ReportError, Reporter,
};
use tracing::{debug, info};

pub struct HttpReporter {
    client: reqwest::Client,
    log_stream: String,
}

impl HttpReporter {
    pub fn new(timeout: Duration, log_stream: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            log_stream: log_stream.into(),
        })
    }
}

#[async_trait]
impl Reporter for HttpReporter {
    async fn report(
        &self,
        event: &CustomResourceEvent,
        outcome: &LifecycleOutcome,
    ) -> Result<(), ReportError> {
        let response = CustomResourceResponse::new(event, outcome, &self.log_stream);
        let body = serde_json::to_string(&response)?;
        debug!(body = %body, "Sending custom resource response");

        let http_response = self
            .client
            .put(&event.response_url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| ReportError::Delivery(e.to_string()))?;

        let status = http_response.status();
        if !status.is_success() {
            let body = http_response.text().await.unwrap_or_default();
            return Err(ReportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            status = ?response.status,
            physical_resource_id = %response.physical_resource_id,
            "Custom resource response delivered"
        );
        Ok(())
    }
}

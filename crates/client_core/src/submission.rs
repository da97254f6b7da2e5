//! Payload assembly and the single outbound submission call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{LocationSelection, MouzaRecord, SubmissionPayload},
    error::ApiError,
    protocol::SubmitAck,
};
use tracing::{info, warn};
use url::Url;

use crate::error::SubmitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub message: Option<String>,
}

#[async_trait]
pub trait SubmissionEndpoint: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError>;
}

/// Builds the request body from the current form state. Pure.
pub fn build_payload(selection: &LocationSelection, mouzas: &[MouzaRecord]) -> SubmissionPayload {
    SubmissionPayload {
        division: selection.division.clone(),
        district: selection.district.clone(),
        upazila: selection.upazila.clone(),
        union: selection.union.clone(),
        mouza_data: mouzas.to_vec(),
    }
}

#[derive(Clone)]
pub struct SubmissionAssembler {
    endpoint: Arc<dyn SubmissionEndpoint>,
}

impl SubmissionAssembler {
    pub fn new(endpoint: Arc<dyn SubmissionEndpoint>) -> Self {
        Self { endpoint }
    }

    pub fn build_payload(
        selection: &LocationSelection,
        mouzas: &[MouzaRecord],
    ) -> SubmissionPayload {
        build_payload(selection, mouzas)
    }

    /// Exactly one request per call. Failures are never retried here.
    pub async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmitError> {
        info!(
            division = %payload.division,
            district = %payload.district,
            mouzas = payload.mouza_data.len(),
            "submitting form"
        );
        let result = self.endpoint.submit(payload).await;
        match &result {
            Ok(receipt) => info!(status = receipt.status, "submission accepted"),
            Err(err) => warn!(status = ?err.status(), error = %err, "submission failed"),
        }
        result
    }
}

pub struct HttpSubmissionClient {
    http: Client,
    submit_url: Url,
}

impl HttpSubmissionClient {
    pub fn new(submit_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), submit_url)
    }

    pub fn with_client(http: Client, submit_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            submit_url: Url::parse(submit_url)?,
        })
    }
}

#[async_trait]
impl SubmissionEndpoint for HttpSubmissionClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmitError> {
        let response = self
            .http
            .post(self.submit_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|err| SubmitError::NetworkFailure(err.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let message = serde_json::from_str::<SubmitAck>(&body)
                .ok()
                .and_then(|ack| ack.message);
            return Ok(SubmissionReceipt {
                status: status.as_u16(),
                message,
            });
        }

        Err(SubmitError::ServerRejection {
            status: status.as_u16(),
            message: rejection_message(status, &body),
        })
    }
}

fn rejection_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) if !err.message.is_empty() => err.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_string(),
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;

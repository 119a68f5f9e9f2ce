use std::error::Error as _;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::domain::PredictionResult;
use super::profile::EmployeeProfile;
use crate::config::ServiceConfig;

/// Shown under every failure notification.
pub const REMEDIATION_HINT: &str =
    "Make sure the prediction service is running:\nuvicorn main:app --reload";
const GENERIC_FAILURE: &str = "API error";

/// Why a request to the prediction service produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// Non-success status; `message` is the service's `detail` when it sent one.
    #[error("{message}")]
    Service { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
}

impl PredictionError {
    pub fn message(&self) -> &str {
        match self {
            PredictionError::Service { message, .. } => message,
            PredictionError::Transport(message) | PredictionError::Decode(message) => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PredictionError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Blocking notification text: the error followed by the remediation hint.
    pub fn alert_text(&self) -> String {
        format!("Error: {}\n\n{}", self.message(), REMEDIATION_HINT)
    }
}

/// Anything that can turn a profile into a prediction.
pub trait PredictionService: Send + Sync {
    fn predict(
        &self,
        profile: &EmployeeProfile,
    ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send;
}

/// Reachability check used by the health monitor. `true` means online.
pub trait HealthProbe: Send + Sync {
    fn probe(&self) -> impl Future<Output = bool> + Send;
}

/// HTTP client for the attrition prediction service.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    service: ServiceConfig,
}

impl PredictionClient {
    pub fn new(service: ServiceConfig) -> Result<Self, PredictionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| PredictionError::Transport(error_chain(&err)))?;
        Ok(Self { http, service })
    }

    pub fn base_url(&self) -> &str {
        &self.service.base_url
    }

    /// `POST /predict` with the profile as the JSON body. No timeout, no retries.
    pub async fn predict(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<PredictionResult, PredictionError> {
        let url = self.service.endpoint("/predict");
        debug!(%url, fields = profile.len(), "submitting employee profile");

        let response = self
            .http
            .post(&url)
            .json(profile)
            .send()
            .await
            .map_err(transport_error)?;

        decode(response).await
    }

    /// `GET /model-info`; the metadata shape belongs to the service.
    pub async fn model_info(&self) -> Result<Value, PredictionError> {
        let url = self.service.endpoint("/model-info");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        decode(response).await
    }

    /// `GET /`; any 2xx within the configured timeout counts as online.
    pub async fn check_health(&self) -> bool {
        let url = self.service.endpoint("/");
        match self
            .http
            .get(&url)
            .timeout(self.service.health_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(status = %response.status(), "health probe rejected");
                false
            }
            Err(err) => {
                debug!(error = %error_chain(&err), "health probe failed");
                false
            }
        }
    }
}

impl PredictionService for PredictionClient {
    fn predict(
        &self,
        profile: &EmployeeProfile,
    ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send {
        PredictionClient::predict(self, profile)
    }
}

impl HealthProbe for PredictionClient {
    fn probe(&self) -> impl Future<Output = bool> + Send {
        self.check_health()
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PredictionError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        let message = failure_message(&body);
        warn!(status = status.as_u16(), %message, "prediction service reported failure");
        return Err(PredictionError::Service {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|err| PredictionError::Decode(err.to_string()))
}

/// Pulls `detail` out of an error body. Structured details (validation error
/// lists) are passed on as compact JSON.
pub fn failure_message(body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(Value::String(message)) if !message.is_empty() => message,
        Some(Value::Null) | Some(Value::String(_)) | None => GENERIC_FAILURE.to_string(),
        Some(other) => other.to_string(),
    }
}

fn transport_error(err: reqwest::Error) -> PredictionError {
    if err.is_decode() {
        PredictionError::Decode(error_chain(&err))
    } else {
        PredictionError::Transport(error_chain(&err))
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_surfaced_verbatim() {
        assert_eq!(
            failure_message(br#"{"detail": "model not loaded"}"#),
            "model not loaded"
        );
    }

    #[test]
    fn missing_or_empty_detail_uses_generic_message() {
        assert_eq!(failure_message(br#"{"error": "boom"}"#), "API error");
        assert_eq!(failure_message(br#"{"detail": ""}"#), "API error");
        assert_eq!(failure_message(br#"{"detail": null}"#), "API error");
        assert_eq!(failure_message(b"<html>502</html>"), "API error");
        assert_eq!(failure_message(b""), "API error");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let body = br#"{"detail": [{"loc": ["body", "Age"], "msg": "field required"}]}"#;
        let message = failure_message(body);
        assert!(message.starts_with('['));
        assert!(message.contains("field required"));
    }

    #[test]
    fn alert_text_carries_remediation_hint() {
        let err = PredictionError::Service {
            status: 503,
            message: "model not loaded".to_string(),
        };
        let text = err.alert_text();
        assert!(text.starts_with("Error: model not loaded"));
        assert!(text.ends_with(REMEDIATION_HINT));
        assert_eq!(err.status(), Some(503));
    }
}

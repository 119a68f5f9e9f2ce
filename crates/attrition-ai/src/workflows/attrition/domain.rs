use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LOW_RISK_COLOR: &str = "#29e07b";
pub const MEDIUM_RISK_COLOR: &str = "#f5c842";
pub const HIGH_RISK_COLOR: &str = "#ff4d4d";

/// Risk bucket assigned by the prediction service.
///
/// Labels outside Low/Medium/High are kept verbatim so they can still be shown,
/// but they are styled like `High`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Unrecognized(String),
}

impl RiskTier {
    pub fn label(&self) -> &str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Unrecognized(label) => label,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            RiskTier::Low => "✓",
            RiskTier::Medium => "⚠",
            RiskTier::High | RiskTier::Unrecognized(_) => "⚡",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => LOW_RISK_COLOR,
            RiskTier::Medium => MEDIUM_RISK_COLOR,
            RiskTier::High | RiskTier::Unrecognized(_) => HIGH_RISK_COLOR,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, RiskTier::Unrecognized(_))
    }
}

impl From<String> for RiskTier {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Low" => RiskTier::Low,
            "Medium" => RiskTier::Medium,
            "High" => RiskTier::High,
            _ => RiskTier::Unrecognized(value),
        }
    }
}

impl From<&str> for RiskTier {
    fn from(value: &str) -> Self {
        RiskTier::from(value.to_string())
    }
}

impl From<RiskTier> for String {
    fn from(value: RiskTier) -> Self {
        match value {
            RiskTier::Unrecognized(label) => label,
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Successful `/predict` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub will_attrite: bool,
    pub attrition_probability: f64,
    pub risk_level: RiskTier,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Latest reachability observation for the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub online: bool,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    pub fn online() -> Self {
        Self {
            online: true,
            checked_at: Utc::now(),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            checked_at: Utc::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        if self.online {
            "API Online"
        } else {
            "API Offline - start the prediction service first"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_service_response() {
        let body = json!({
            "will_attrite": true,
            "attrition_probability": 0.8123,
            "risk_level": "High",
            "recommended_actions": ["Immediate retention interview recommended"],
            "status": "success"
        });

        let result: PredictionResult = serde_json::from_value(body).expect("response parses");
        assert!(result.will_attrite);
        assert_eq!(result.risk_level, RiskTier::High);
        assert_eq!(result.recommended_actions.len(), 1);
        assert_eq!(result.status.as_deref(), Some("success"));
    }

    #[test]
    fn unknown_tier_is_kept_verbatim() {
        let body = json!({
            "will_attrite": false,
            "attrition_probability": 0.5,
            "risk_level": "Critical",
            "recommended_actions": []
        });

        let result: PredictionResult = serde_json::from_value(body).expect("response parses");
        assert_eq!(
            result.risk_level,
            RiskTier::Unrecognized("Critical".to_string())
        );
        assert!(!result.risk_level.is_recognized());
        assert_eq!(
            serde_json::to_value(&result.risk_level).expect("tier serializes"),
            json!("Critical")
        );
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        let body = json!({ "risk_level": "Low" });
        assert!(serde_json::from_value::<PredictionResult>(body).is_err());
    }
}

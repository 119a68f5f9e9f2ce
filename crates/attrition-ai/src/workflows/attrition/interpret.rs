//! Pure decision logic turning a prediction and its input into display values.

use std::time::Duration;

use serde::Serialize;

use super::domain::{PredictionResult, RiskTier, HIGH_RISK_COLOR, LOW_RISK_COLOR};
use super::profile::{EmployeeProfile, FieldValue, ProfileField};

pub const GAUGE_TRACK_COLOR: &str = "#1e2028";
pub const RISKY_SIGNAL_COLOR: &str = "#ff8c42";
pub const SAFE_SIGNAL_COLOR: &str = LOW_RISK_COLOR;
pub const SATISFACTION_SCALE_MAX: f64 = 4.0;
pub const ACTION_REVEAL_STEP: Duration = Duration::from_millis(80);

const DISTANCE_RISK_KM: f64 = 15.0;
const SALARY_HIKE_RISK_PCT: f64 = 13.0;
const COMPANIES_RISK_COUNT: f64 = 4.0;
const FREQUENT_TRAVEL: &str = "Travel_Frequently";
const MISSING: &str = "n/a";

/// Everything the presentation layer needs for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub risk: RiskBadge,
    pub probability_percent: i64,
    pub bar: ProgressBar,
    pub gauge: GaugeSpec,
    pub verdict: Verdict,
    pub actions: Vec<RecommendedAction>,
    pub satisfaction: SatisfactionVector,
    pub signals: Vec<SignalChip>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskBadge {
    pub tier: RiskTier,
    pub label: String,
    pub glyph: &'static str,
    pub color: &'static str,
    pub panel_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressBar {
    pub percent: i64,
    pub color: &'static str,
}

/// Half-circle gauge: `filled` and `remainder` always sum to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSpec {
    pub filled: f64,
    pub remainder: f64,
    pub color: &'static str,
    pub track_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub likely_to_leave: bool,
    pub icon: &'static str,
    pub headline: &'static str,
    pub headline_color: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedAction {
    pub position: usize,
    pub text: String,
    #[serde(rename = "reveal_delay_ms", serialize_with = "serialize_millis")]
    pub reveal_delay: Duration,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionAxis {
    pub label: &'static str,
    pub field: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionVector {
    pub axes: Vec<SatisfactionAxis>,
}

impl SatisfactionVector {
    pub fn values(&self) -> Vec<f64> {
        self.axes.iter().map(|axis| axis.value).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalChip {
    pub label: &'static str,
    pub display_value: String,
    pub risky: bool,
}

impl SignalChip {
    pub fn accent(&self) -> &'static str {
        if self.risky {
            RISKY_SIGNAL_COLOR
        } else {
            SAFE_SIGNAL_COLOR
        }
    }
}

pub fn interpret(result: &PredictionResult, profile: &EmployeeProfile) -> RenderModel {
    let tier = &result.risk_level;
    let percent = bar_percent(result.attrition_probability);

    RenderModel {
        risk: risk_badge(tier),
        probability_percent: percent,
        bar: ProgressBar {
            percent,
            color: tier.color(),
        },
        gauge: gauge(result.attrition_probability, tier),
        verdict: verdict(result.will_attrite, percent),
        actions: recommended_actions(&result.recommended_actions),
        satisfaction: satisfaction_vector(profile),
        signals: key_signals(profile),
    }
}

pub fn risk_badge(tier: &RiskTier) -> RiskBadge {
    RiskBadge {
        tier: tier.clone(),
        label: format!("{} Risk", tier.label()),
        glyph: tier.badge(),
        color: tier.color(),
        panel_class: format!("risk-{}", tier.label().to_lowercase()),
    }
}

/// Probability as a whole percentage, rounding halves up (0.125 -> 13).
pub fn bar_percent(probability: f64) -> i64 {
    (probability * 100.0 + 0.5).floor() as i64
}

pub fn gauge(probability: f64, tier: &RiskTier) -> GaugeSpec {
    GaugeSpec {
        filled: probability,
        remainder: 1.0 - probability,
        color: tier.color(),
        track_color: GAUGE_TRACK_COLOR,
    }
}

/// Retention confidence is only the complement of the attrition percentage.
pub fn verdict(will_attrite: bool, percent: i64) -> Verdict {
    if will_attrite {
        Verdict {
            likely_to_leave: true,
            icon: "⚠️",
            headline: "Employee Likely to Leave",
            headline_color: HIGH_RISK_COLOR,
            detail: format!(
                "{percent}% probability of attrition. Immediate attention recommended."
            ),
        }
    } else {
        Verdict {
            likely_to_leave: false,
            icon: "✅",
            headline: "Employee Likely to Stay",
            headline_color: LOW_RISK_COLOR,
            detail: format!(
                "{}% confidence in retention. Continue engagement programs.",
                100i64.saturating_sub(percent)
            ),
        }
    }
}

pub fn recommended_actions(actions: &[String]) -> Vec<RecommendedAction> {
    actions
        .iter()
        .enumerate()
        .map(|(position, text)| RecommendedAction {
            position,
            text: text.clone(),
            reveal_delay: ACTION_REVEAL_STEP * position as u32,
        })
        .collect()
}

const SATISFACTION_AXES: [(&str, ProfileField); 5] = [
    ("Job Satisfaction", ProfileField::JobSatisfaction),
    ("Environment", ProfileField::EnvironmentSatisfaction),
    ("Relationship", ProfileField::RelationshipSatisfaction),
    ("Work-Life", ProfileField::WorkLifeBalance),
    ("Job Involvement", ProfileField::JobInvolvement),
];

/// Radar axes in fixed order; absent or non-numeric values plot as zero.
pub fn satisfaction_vector(profile: &EmployeeProfile) -> SatisfactionVector {
    let axes = SATISFACTION_AXES
        .iter()
        .map(|&(label, field)| SatisfactionAxis {
            label,
            field: field.name(),
            value: profile
                .number(field)
                .filter(|value| !value.is_nan())
                .unwrap_or(0.0),
        })
        .collect();
    SatisfactionVector { axes }
}

pub fn key_signals(profile: &EmployeeProfile) -> Vec<SignalChip> {
    vec![
        overtime_signal(profile),
        threshold_signal(
            profile,
            "Distance",
            ProfileField::DistanceFromHome,
            |value| format!("{value} km"),
            |km| km > DISTANCE_RISK_KM,
        ),
        threshold_signal(
            profile,
            "Salary Hike",
            ProfileField::PercentSalaryHike,
            |value| format!("{value}%"),
            |pct| pct < SALARY_HIKE_RISK_PCT,
        ),
        threshold_signal(
            profile,
            "Companies",
            ProfileField::NumCompaniesWorked,
            |value| value.to_string(),
            |count| count > COMPANIES_RISK_COUNT,
        ),
        travel_signal(profile),
        stock_signal(profile),
    ]
}

fn overtime_signal(profile: &EmployeeProfile) -> SignalChip {
    let risky = profile.number(ProfileField::OverTime) == Some(1.0);
    SignalChip {
        label: "Overtime",
        display_value: if risky { "Yes ⚠" } else { "No ✓" }.to_string(),
        risky,
    }
}

fn threshold_signal(
    profile: &EmployeeProfile,
    label: &'static str,
    field: ProfileField,
    display: impl Fn(&FieldValue) -> String,
    risky_when: impl Fn(f64) -> bool,
) -> SignalChip {
    match profile.field(field) {
        Some(value) => SignalChip {
            label,
            display_value: display(value),
            risky: value.as_number().is_some_and(risky_when),
        },
        None => missing_signal(label),
    }
}

fn travel_signal(profile: &EmployeeProfile) -> SignalChip {
    match profile.field(ProfileField::BusinessTravel) {
        Some(FieldValue::Text(travel)) if travel == FREQUENT_TRAVEL => SignalChip {
            label: "Travel",
            display_value: "Frequent ⚠".to_string(),
            risky: true,
        },
        Some(value) => SignalChip {
            label: "Travel",
            display_value: value.to_string(),
            risky: false,
        },
        None => missing_signal("Travel"),
    }
}

fn stock_signal(profile: &EmployeeProfile) -> SignalChip {
    match profile.field(ProfileField::StockOptionLevel) {
        Some(FieldValue::Number(level)) if *level == 0.0 => SignalChip {
            label: "Stock Options",
            display_value: "None ⚠".to_string(),
            risky: true,
        },
        Some(value) => SignalChip {
            label: "Stock Options",
            display_value: format!("Level {value}"),
            risky: false,
        },
        None => missing_signal("Stock Options"),
    }
}

fn missing_signal(label: &'static str) -> SignalChip {
    SignalChip {
        label,
        display_value: MISSING.to_string(),
        risky: false,
    }
}

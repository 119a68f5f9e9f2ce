use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Fields accepted by the prediction service's `/predict` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileField {
    Age,
    BusinessTravel,
    DailyRate,
    Department,
    DistanceFromHome,
    Education,
    EducationField,
    EnvironmentSatisfaction,
    Gender,
    HourlyRate,
    JobInvolvement,
    JobLevel,
    JobRole,
    JobSatisfaction,
    MaritalStatus,
    MonthlyIncome,
    MonthlyRate,
    NumCompaniesWorked,
    OverTime,
    PercentSalaryHike,
    PerformanceRating,
    RelationshipSatisfaction,
    StockOptionLevel,
    TotalWorkingYears,
    TrainingTimesLastYear,
    WorkLifeBalance,
    YearsAtCompany,
    YearsInCurrentRole,
    YearsSinceLastPromotion,
    YearsWithCurrManager,
}

impl ProfileField {
    pub const ALL: [ProfileField; 30] = [
        ProfileField::Age,
        ProfileField::BusinessTravel,
        ProfileField::DailyRate,
        ProfileField::Department,
        ProfileField::DistanceFromHome,
        ProfileField::Education,
        ProfileField::EducationField,
        ProfileField::EnvironmentSatisfaction,
        ProfileField::Gender,
        ProfileField::HourlyRate,
        ProfileField::JobInvolvement,
        ProfileField::JobLevel,
        ProfileField::JobRole,
        ProfileField::JobSatisfaction,
        ProfileField::MaritalStatus,
        ProfileField::MonthlyIncome,
        ProfileField::MonthlyRate,
        ProfileField::NumCompaniesWorked,
        ProfileField::OverTime,
        ProfileField::PercentSalaryHike,
        ProfileField::PerformanceRating,
        ProfileField::RelationshipSatisfaction,
        ProfileField::StockOptionLevel,
        ProfileField::TotalWorkingYears,
        ProfileField::TrainingTimesLastYear,
        ProfileField::WorkLifeBalance,
        ProfileField::YearsAtCompany,
        ProfileField::YearsInCurrentRole,
        ProfileField::YearsSinceLastPromotion,
        ProfileField::YearsWithCurrManager,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProfileField::Age => "Age",
            ProfileField::BusinessTravel => "BusinessTravel",
            ProfileField::DailyRate => "DailyRate",
            ProfileField::Department => "Department",
            ProfileField::DistanceFromHome => "DistanceFromHome",
            ProfileField::Education => "Education",
            ProfileField::EducationField => "EducationField",
            ProfileField::EnvironmentSatisfaction => "EnvironmentSatisfaction",
            ProfileField::Gender => "Gender",
            ProfileField::HourlyRate => "HourlyRate",
            ProfileField::JobInvolvement => "JobInvolvement",
            ProfileField::JobLevel => "JobLevel",
            ProfileField::JobRole => "JobRole",
            ProfileField::JobSatisfaction => "JobSatisfaction",
            ProfileField::MaritalStatus => "MaritalStatus",
            ProfileField::MonthlyIncome => "MonthlyIncome",
            ProfileField::MonthlyRate => "MonthlyRate",
            ProfileField::NumCompaniesWorked => "NumCompaniesWorked",
            ProfileField::OverTime => "OverTime",
            ProfileField::PercentSalaryHike => "PercentSalaryHike",
            ProfileField::PerformanceRating => "PerformanceRating",
            ProfileField::RelationshipSatisfaction => "RelationshipSatisfaction",
            ProfileField::StockOptionLevel => "StockOptionLevel",
            ProfileField::TotalWorkingYears => "TotalWorkingYears",
            ProfileField::TrainingTimesLastYear => "TrainingTimesLastYear",
            ProfileField::WorkLifeBalance => "WorkLifeBalance",
            ProfileField::YearsAtCompany => "YearsAtCompany",
            ProfileField::YearsInCurrentRole => "YearsInCurrentRole",
            ProfileField::YearsSinceLastPromotion => "YearsSinceLastPromotion",
            ProfileField::YearsWithCurrManager => "YearsWithCurrManager",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single coerced form value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    fn integral(value: f64) -> Option<i64> {
        let in_range = value.abs() < 9_007_199_254_740_992.0;
        (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => match Self::integral(*value) {
                Some(whole) => write!(f, "{whole}"),
                None => write!(f, "{value}"),
            },
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

// Whole numbers go out as JSON integers so integer-typed service fields accept them.
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Number(value) => match Self::integral(*value) {
                Some(whole) => serializer.serialize_i64(whole),
                None => serializer.serialize_f64(*value),
            },
            FieldValue::Text(value) => serializer.serialize_str(value),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Employee attributes submitted for a single prediction.
///
/// Keys are whatever the form supplied; nothing is required client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeProfile {
    fields: BTreeMap<String, FieldValue>,
}

impl EmployeeProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn field(&self, field: ProfileField) -> Option<&FieldValue> {
        self.get(field.name())
    }

    pub fn number(&self, field: ProfileField) -> Option<f64> {
        self.field(field).and_then(FieldValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Keys outside the service schema. They are still submitted.
    pub fn unknown_fields(&self) -> Vec<&str> {
        self.fields
            .keys()
            .map(String::as_str)
            .filter(|key| ProfileField::from_name(key).is_none())
            .collect()
    }

    /// Layers `overlay` on top of `self`; overlay values win.
    pub fn merged(mut self, overlay: EmployeeProfile) -> Self {
        self.fields.extend(overlay.fields);
        self
    }

    /// The example employee documented by the prediction service.
    pub fn sample() -> Self {
        Self::new()
            .with("Age", 32)
            .with("BusinessTravel", "Travel_Frequently")
            .with("DailyRate", 800)
            .with("Department", "Sales")
            .with("DistanceFromHome", 15)
            .with("Education", 3)
            .with("EducationField", "Life Sciences")
            .with("EnvironmentSatisfaction", 2)
            .with("Gender", "Male")
            .with("HourlyRate", 65)
            .with("JobInvolvement", 2)
            .with("JobLevel", 2)
            .with("JobRole", "Sales Representative")
            .with("JobSatisfaction", 2)
            .with("MaritalStatus", "Single")
            .with("MonthlyIncome", 3500)
            .with("MonthlyRate", 14000)
            .with("NumCompaniesWorked", 3)
            .with("OverTime", 1)
            .with("PercentSalaryHike", 11)
            .with("PerformanceRating", 3)
            .with("RelationshipSatisfaction", 2)
            .with("StockOptionLevel", 0)
            .with("TotalWorkingYears", 8)
            .with("TrainingTimesLastYear", 2)
            .with("WorkLifeBalance", 2)
            .with("YearsAtCompany", 3)
            .with("YearsInCurrentRole", 2)
            .with("YearsSinceLastPromotion", 2)
            .with("YearsWithCurrManager", 1)
    }

    /// Sample employee with the attributes most associated with leaving.
    pub fn high_risk_demo() -> Self {
        let overlay = Self::new()
            .with("Age", 28)
            .with("OverTime", 1)
            .with("BusinessTravel", "Travel_Frequently")
            .with("JobSatisfaction", 1)
            .with("EnvironmentSatisfaction", 1)
            .with("WorkLifeBalance", 1)
            .with("MonthlyIncome", 2000)
            .with("DistanceFromHome", 28)
            .with("NumCompaniesWorked", 7)
            .with("PercentSalaryHike", 10)
            .with("StockOptionLevel", 0)
            .with("YearsAtCompany", 1)
            .with("YearsSinceLastPromotion", 3);
        Self::sample().merged(overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_names_round_trip() {
        for field in ProfileField::ALL {
            assert_eq!(ProfileField::from_name(field.name()), Some(field));
        }
        assert_eq!(ProfileField::from_name("Attrition"), None);
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        let profile = EmployeeProfile::new()
            .with("Age", 28.0)
            .with("Ratio", 0.25)
            .with("Department", "Sales");

        let value = serde_json::to_value(&profile).expect("profile serializes");
        assert_eq!(
            value,
            json!({ "Age": 28, "Department": "Sales", "Ratio": 0.25 })
        );
    }

    #[test]
    fn sample_covers_the_service_schema() {
        let sample = EmployeeProfile::sample();
        assert_eq!(sample.len(), ProfileField::ALL.len());
        assert!(sample.unknown_fields().is_empty());
    }

    #[test]
    fn high_risk_demo_overrides_sample_values() {
        let demo = EmployeeProfile::high_risk_demo();
        assert_eq!(demo.number(ProfileField::DistanceFromHome), Some(28.0));
        assert_eq!(demo.number(ProfileField::NumCompaniesWorked), Some(7.0));
        assert_eq!(demo.number(ProfileField::DailyRate), Some(800.0));
        assert_eq!(demo.len(), ProfileField::ALL.len());
    }

    #[test]
    fn display_drops_trailing_zero_fraction() {
        assert_eq!(FieldValue::Number(16.0).to_string(), "16");
        assert_eq!(FieldValue::Number(16.5).to_string(), "16.5");
        assert_eq!(FieldValue::from("Non-Travel").to_string(), "Non-Travel");
    }
}

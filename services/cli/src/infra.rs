use attrition_ai::workflows::attrition::form;
use attrition_ai::workflows::attrition::EmployeeProfile;
use clap::ValueEnum;

/// Starting point the `--field` overrides are layered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Preset {
    /// Start from an empty form
    #[default]
    None,
    /// The service's documented example employee
    Sample,
    /// Sample employee with high-risk attributes filled in
    HighRisk,
}

impl Preset {
    pub(crate) fn profile(self) -> EmployeeProfile {
        match self {
            Preset::None => EmployeeProfile::new(),
            Preset::Sample => EmployeeProfile::sample(),
            Preset::HighRisk => EmployeeProfile::high_risk_demo(),
        }
    }
}

pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    form::parse_pair(raw).map_err(|err| err.to_string())
}

/// Preset values overlaid with the coerced `--field` entries.
pub(crate) fn build_profile(preset: Preset, fields: &[(String, String)]) -> EmployeeProfile {
    let overrides = form::collect(fields.iter().map(|(key, value)| (key.clone(), value)));
    preset.profile().merged(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_ai::workflows::attrition::{FieldValue, ProfileField};

    #[test]
    fn fields_override_preset_values() {
        let fields = vec![
            parse_field("DistanceFromHome=3").expect("valid field"),
            parse_field("Department=Research & Development").expect("valid field"),
        ];
        let profile = build_profile(Preset::HighRisk, &fields);

        assert_eq!(profile.number(ProfileField::DistanceFromHome), Some(3.0));
        assert_eq!(
            profile.field(ProfileField::Department),
            Some(&FieldValue::Text("Research & Development".to_string()))
        );
        assert_eq!(profile.number(ProfileField::NumCompaniesWorked), Some(7.0));
    }

    #[test]
    fn empty_preset_only_has_given_fields() {
        let fields = vec![parse_field("OverTime=1").expect("valid field")];
        let profile = build_profile(Preset::None, &fields);
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn parse_field_reports_malformed_entry() {
        let err = parse_field("OverTime").expect_err("missing separator");
        assert!(err.contains("Key=Value"));
    }
}

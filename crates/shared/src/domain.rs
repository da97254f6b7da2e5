use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownSurveyType;

/// Canonical selection value for an option label.
///
/// Pickers show the directory's label ("Dhaka") but the form stores and
/// looks up by the lowercase form ("dhaka"). Both labels and values map to
/// the same canonical value, so either may be passed to a selector.
pub fn option_value(label: &str) -> String {
    label.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Division,
    District,
    Upazila,
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdminLevel::Division => "division",
            AdminLevel::District => "district",
            AdminLevel::Upazila => "upazila",
        };
        f.write_str(name)
    }
}

/// The four top-level location fields of the form. Empty string means unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub division: String,
    pub district: String,
    pub upazila: String,
    pub union: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurveyType {
    #[serde(rename = "Land Survey")]
    Land,
    #[serde(rename = "Population Survey")]
    Population,
    #[serde(rename = "Agriculture Survey")]
    Agriculture,
    #[serde(rename = "Economic Survey")]
    Economic,
    #[serde(rename = "Census Survey")]
    Census,
}

impl SurveyType {
    pub const ALL: [SurveyType; 5] = [
        SurveyType::Land,
        SurveyType::Population,
        SurveyType::Agriculture,
        SurveyType::Economic,
        SurveyType::Census,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SurveyType::Land => "Land Survey",
            SurveyType::Population => "Population Survey",
            SurveyType::Agriculture => "Agriculture Survey",
            SurveyType::Economic => "Economic Survey",
            SurveyType::Census => "Census Survey",
        }
    }
}

impl fmt::Display for SurveyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SurveyType {
    type Err = UnknownSurveyType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SurveyType::ALL
            .into_iter()
            .find(|kind| kind.label() == value)
            .ok_or_else(|| UnknownSurveyType(value.to_string()))
    }
}

/// One repeatable mouza sub-record. An unset survey type travels as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouzaRecord {
    pub mouza_name: String,
    #[serde(with = "survey_type_field")]
    pub survey_type: Option<SurveyType>,
    pub sheet_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub division: String,
    pub district: String,
    pub upazila: String,
    pub union: String,
    pub mouza_data: Vec<MouzaRecord>,
}

mod survey_type_field {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::SurveyType;

    pub fn serialize<S: Serializer>(
        value: &Option<SurveyType>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(SurveyType::label).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SurveyType>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_value_is_lowercase_label() {
        assert_eq!(option_value("Dhaka"), "dhaka");
        assert_eq!(option_value("Cox's Bazar"), "cox's bazar");
        assert_eq!(option_value(""), "");
    }

    #[test]
    fn survey_type_parses_only_exact_labels() {
        assert_eq!(
            "Census Survey".parse::<SurveyType>().expect("known"),
            SurveyType::Census
        );
        assert!("census survey".parse::<SurveyType>().is_err());
        assert!("Not A Real Type".parse::<SurveyType>().is_err());
    }

    #[test]
    fn payload_serializes_with_camel_case_keys() {
        let payload = SubmissionPayload {
            division: "dhaka".into(),
            district: "gazipur".into(),
            upazila: "kaliakair".into(),
            union: "Mouchak".into(),
            mouza_data: vec![
                MouzaRecord {
                    mouza_name: "Boro Bari".into(),
                    survey_type: Some(SurveyType::Land),
                    sheet_number: "12".into(),
                },
                MouzaRecord::default(),
            ],
        };

        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "division": "dhaka",
                "district": "gazipur",
                "upazila": "kaliakair",
                "union": "Mouchak",
                "mouzaData": [
                    {"mouzaName": "Boro Bari", "surveyType": "Land Survey", "sheetNumber": "12"},
                    {"mouzaName": "", "surveyType": "", "sheetNumber": ""}
                ]
            })
        );
    }

    #[test]
    fn record_rejects_unknown_survey_type_on_decode() {
        let raw = r#"{"mouzaName":"x","surveyType":"Soil Survey","sheetNumber":"1"}"#;
        assert!(serde_json::from_str::<MouzaRecord>(raw).is_err());
    }
}

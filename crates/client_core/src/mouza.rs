use std::str::FromStr;

use shared::domain::{MouzaRecord, SurveyType};

use crate::error::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouzaField {
    MouzaName,
    SurveyType,
    SheetNumber,
}

impl MouzaField {
    pub fn name(self) -> &'static str {
        match self {
            MouzaField::MouzaName => "mouzaName",
            MouzaField::SurveyType => "surveyType",
            MouzaField::SheetNumber => "sheetNumber",
        }
    }
}

impl FromStr for MouzaField {
    type Err = FormError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mouzaName" => Ok(MouzaField::MouzaName),
            "surveyType" => Ok(MouzaField::SurveyType),
            "sheetNumber" => Ok(MouzaField::SheetNumber),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

/// Ordered mouza sub-records. Position is the only identity a record has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MouzaListController {
    records: Vec<MouzaRecord>,
}

impl MouzaListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MouzaRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&MouzaRecord> {
        self.records.get(position)
    }

    /// Appends an empty record and returns its position.
    pub fn add_mouza(&mut self) -> usize {
        self.records.push(MouzaRecord::default());
        self.records.len() - 1
    }

    pub fn remove_mouza(&mut self, position: usize) -> Result<MouzaRecord, FormError> {
        self.check_position(position)?;
        Ok(self.records.remove(position))
    }

    /// `""` resets the survey type to unset; any other value must be one of
    /// the fixed survey type labels.
    pub fn update_field(
        &mut self,
        position: usize,
        field: MouzaField,
        value: &str,
    ) -> Result<(), FormError> {
        self.check_position(position)?;
        let survey_type = match field {
            MouzaField::SurveyType => parse_survey_type(value)?,
            _ => None,
        };

        let record = &mut self.records[position];
        match field {
            MouzaField::MouzaName => record.mouza_name = value.to_string(),
            MouzaField::SurveyType => record.survey_type = survey_type,
            MouzaField::SheetNumber => record.sheet_number = value.to_string(),
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<MouzaRecord> {
        self.records.clone()
    }

    fn check_position(&self, position: usize) -> Result<(), FormError> {
        if position < self.records.len() {
            Ok(())
        } else {
            Err(FormError::IndexOutOfRange {
                position,
                len: self.records.len(),
            })
        }
    }
}

fn parse_survey_type(value: &str) -> Result<Option<SurveyType>, FormError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<SurveyType>()
        .map(Some)
        .map_err(|_| FormError::InvalidSurveyType {
            value: value.to_string(),
        })
}

#[cfg(test)]
#[path = "tests/mouza_tests.rs"]
mod tests;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::parser::segment::parse_field;

/// Turns the content of a patient-info section into structured fields.
///
/// The structurer calls this once per patient-info heading and attaches the
/// result to that heading's metadata.
pub trait PatientFieldsParser {
    fn parse(&self, content: &str) -> PatientFields;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientFields {
    Record(PatientRecord),
    /// One message per offending field.
    Errors(Vec<String>),
}

impl PatientFields {
    pub fn record(&self) -> Option<&PatientRecord> {
        match self {
            PatientFields::Record(record) => Some(record),
            PatientFields::Errors(_) => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            PatientFields::Record(_) => &[],
            PatientFields::Errors(errors) => errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub mrn: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u32>,
    /// Fields with no dedicated slot, keyed as written.
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Male,
    Female,
    Other,
    Unknown,
}

/// Default collaborator: reads `key: value` lines.
///
/// `name` and `dob` are required. Dates are `YYYY-MM-DD` or `MM/DD/YYYY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemographicsParser;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

impl PatientFieldsParser for DemographicsParser {
    fn parse(&self, content: &str) -> PatientFields {
        let mut errors = Vec::new();
        let mut name = None;
        let mut date_of_birth = None;
        let mut saw_dob = false;
        let mut mrn = None;
        let mut sex = None;
        let mut age = None;
        let mut extra = BTreeMap::new();

        for line in content.lines() {
            let Some((key, value)) = parse_field(line) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match key.to_lowercase().as_str() {
                "name" | "patient name" | "patient" => name = Some(value.to_string()),
                "dob" | "date of birth" | "birth date" => {
                    saw_dob = true;
                    match parse_date(value) {
                        Some(date) => date_of_birth = Some(date),
                        None => errors.push(format!("invalid date of birth: `{value}`")),
                    }
                }
                "mrn" | "medical record number" => {
                    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                        mrn = Some(value.to_string());
                    } else {
                        errors.push(format!("invalid MRN: `{value}`"));
                    }
                }
                "sex" | "gender" => match parse_sex(value) {
                    Some(parsed) => sex = Some(parsed),
                    None => errors.push(format!("invalid sex: `{value}`")),
                },
                "age" => match value.trim_end_matches(['y', 'o']).trim().parse::<u32>() {
                    Ok(years) => age = Some(years),
                    Err(_) => errors.push(format!("invalid age: `{value}`")),
                },
                _ => {
                    extra.insert(key.to_string(), value.to_string());
                }
            }
        }

        if name.is_none() {
            errors.push("missing required field: name".to_string());
        }
        if !saw_dob {
            errors.push("missing required field: dob".to_string());
        }

        match (name, date_of_birth) {
            (Some(name), Some(date_of_birth)) if errors.is_empty() => {
                PatientFields::Record(PatientRecord {
                    name,
                    date_of_birth,
                    mrn,
                    sex,
                    age,
                    extra,
                })
            }
            _ => PatientFields::Errors(errors),
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_sex(value: &str) -> Option<Sex> {
    match value.to_lowercase().as_str() {
        "m" | "male" => Some(Sex::Male),
        "f" | "female" => Some(Sex::Female),
        "other" | "x" => Some(Sex::Other),
        "unknown" | "u" => Some(Sex::Unknown),
        _ => None,
    }
}

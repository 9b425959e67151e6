use std::fmt;

use serde::Serialize;

/// The clinical role of a section, derived from its heading title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    Hpi,
    ChiefComplaint,
    Allergies,
    Medications,
    AssessmentPlan,
    PatientInfo,
    PastMedicalHistory,
    Vitals,
    PhysicalExam,
    FamilyHistory,
    SocialHistory,
}

impl SectionType {
    pub const ALL: [SectionType; 11] = [
        SectionType::Hpi,
        SectionType::ChiefComplaint,
        SectionType::Allergies,
        SectionType::Medications,
        SectionType::AssessmentPlan,
        SectionType::PatientInfo,
        SectionType::PastMedicalHistory,
        SectionType::Vitals,
        SectionType::PhysicalExam,
        SectionType::FamilyHistory,
        SectionType::SocialHistory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Hpi => "hpi",
            SectionType::ChiefComplaint => "chief-complaint",
            SectionType::Allergies => "allergies",
            SectionType::Medications => "medications",
            SectionType::AssessmentPlan => "assessment-plan",
            SectionType::PatientInfo => "patient-info",
            SectionType::PastMedicalHistory => "past-medical-history",
            SectionType::Vitals => "vitals",
            SectionType::PhysicalExam => "physical-exam",
            SectionType::FamilyHistory => "family-history",
            SectionType::SocialHistory => "social-history",
        }
    }

    pub fn from_name(name: &str) -> Option<SectionType> {
        SectionType::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Needle {
    /// Substring anywhere in the lowercased title.
    Contains(&'static str),
    /// A whole word of the title, for abbreviations and short words.
    Word(&'static str),
}

use Needle::{Contains, Word};

/// First matching rule wins, so specific phrases precede generic ones
/// ("past medical history" before "history", "hpi" before "plan").
const RULES: &[(&[Needle], SectionType)] = &[
    (&[Contains("history of present illness"), Word("hpi")], SectionType::Hpi),
    (&[Contains("chief complaint"), Word("cc")], SectionType::ChiefComplaint),
    (&[Contains("allerg")], SectionType::Allergies),
    (&[Contains("past medical history"), Word("pmh")], SectionType::PastMedicalHistory),
    (&[Contains("family history")], SectionType::FamilyHistory),
    (&[Contains("social history")], SectionType::SocialHistory),
    (&[Contains("medication"), Word("meds"), Word("rx")], SectionType::Medications),
    (&[Contains("assessment"), Word("plan"), Word("a/p")], SectionType::AssessmentPlan),
    (&[Contains("demographic"), Contains("patient info")], SectionType::PatientInfo),
    (&[Contains("vital")], SectionType::Vitals),
    (&[Contains("physical exam"), Word("pe")], SectionType::PhysicalExam),
];

/// Classify a heading title; `None` when no rule applies.
pub fn classify_section(title: &str) -> Option<SectionType> {
    let lowered = title.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '(' | ')' | '-'))
        .filter(|w| !w.is_empty())
        .collect();

    RULES.iter().find_map(|(needles, section)| {
        needles
            .iter()
            .any(|needle| match needle {
                Contains(s) => lowered.contains(s),
                Word(w) => words.contains(w),
            })
            .then_some(*section)
    })
}

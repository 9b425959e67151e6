mod heading;
mod lines;
pub(crate) mod segment;

use tracing::debug;

use crate::document::StructuredDocument;
use crate::patient::{DemographicsParser, PatientFieldsParser};

/// Structurer entry point.
///
/// Every call re-parses the whole text; nothing is cached between calls.
pub struct Structurer {
    patients: Box<dyn PatientFieldsParser + Send + Sync>,
}

impl Default for Structurer {
    fn default() -> Self {
        Structurer::new()
    }
}

impl Structurer {
    /// A structurer using [`DemographicsParser`] for patient-info sections.
    pub fn new() -> Self {
        Structurer {
            patients: Box::new(DemographicsParser),
        }
    }

    pub fn with_patient_parser(parser: impl PatientFieldsParser + Send + Sync + 'static) -> Self {
        Structurer {
            patients: Box::new(parser),
        }
    }

    /// Split `source` into blocks and build the section tree over them.
    pub fn structure(&self, source: &str) -> StructuredDocument {
        let lines = lines::split_lines(source);
        let blocks = segment::segment(source, &lines, self.patients.as_ref());
        let document = StructuredDocument::from_blocks(blocks);
        debug!(
            lines = lines.len(),
            blocks = document.blocks().len(),
            sections = document.tree().len(),
            "structured document"
        );
        document
    }
}

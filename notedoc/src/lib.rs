pub mod block;
pub mod classify;
pub mod document;
pub mod outline;
pub mod parser;
pub mod patient;

pub use block::{Block, BlockKind, BlockMetadata, Position, SourceRange};
pub use classify::{SectionType, classify_section};
pub use document::StructuredDocument;
pub use outline::{NodeId, SectionNode, SectionTree};
pub use parser::Structurer;
pub use patient::{DemographicsParser, PatientFields, PatientFieldsParser, PatientRecord, Sex};

/// Structure a note using the default patient-fields parser.
pub fn structure_document(source: &str) -> StructuredDocument {
    Structurer::new().structure(source)
}

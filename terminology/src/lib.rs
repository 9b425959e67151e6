pub mod code;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod matcher;
pub mod normalize;
pub mod recognizer;
pub mod resolver;
pub mod text;
pub mod validator;

pub use code::{Code, Vocabulary};
pub use dictionary::{BUILTIN_DICTIONARY, TermDictionary, TermEntry};
pub use error::{DictionaryError, DictionaryErrorKind};
pub use index::TermIndex;
pub use matcher::{Annotation, Candidate, Span, SpanMatcher};
pub use normalize::normalize;
pub use recognizer::{Recognizer, recognize_terms};
pub use resolver::{ResolverConfig, resolve};
pub use validator::{CodeShape, CodeValidation, classify_code_shape};

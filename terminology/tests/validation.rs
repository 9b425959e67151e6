use terminology::{
    CodeShape, CodeValidation, TermDictionary, TermIndex, Vocabulary, classify_code_shape,
};

fn builtin() -> TermIndex {
    TermIndex::new(TermDictionary::builtin().expect("builtin dictionary")).expect("index")
}

#[test]
fn known_code_is_valid() {
    let index = builtin();
    let result = index.validate_code("I10");
    assert!(result.is_valid());
    assert_eq!(result.term().map(|t| t.canonical_term.as_str()), Some("hypertension"));
    assert_eq!(result.reason(), None);

    assert!(index.validate_code("243670").is_valid());
    assert!(index.validate_code("J45.909").is_valid());
}

#[test]
fn too_short_code_is_unrecognized() {
    let index = builtin();
    let result = index.validate_code("A1");
    assert_eq!(
        result,
        CodeValidation::Invalid {
            reason: CodeShape::Unrecognized
        }
    );
    assert!(result.term().is_none());
}

#[test]
fn unknown_codes_are_classified_by_shape() {
    let index = builtin();
    assert_eq!(index.validate_code("Z99").reason(), Some(CodeShape::Icd10));
    assert_eq!(index.validate_code("E11.65").reason(), Some(CodeShape::Icd10));
    assert_eq!(index.validate_code("99999999").reason(), Some(CodeShape::RxNorm));
    assert_eq!(index.validate_code("i10").reason(), Some(CodeShape::Unrecognized));
}

#[test]
fn shape_classification() {
    assert_eq!(classify_code_shape("I10"), CodeShape::Icd10);
    assert_eq!(classify_code_shape("I50.9"), CodeShape::Icd10);
    assert_eq!(classify_code_shape("I48.91"), CodeShape::Icd10);
    assert_eq!(classify_code_shape("J45.909"), CodeShape::Unrecognized);
    assert_eq!(classify_code_shape("I10."), CodeShape::Unrecognized);
    assert_eq!(classify_code_shape("I1O"), CodeShape::Unrecognized);
    assert_eq!(classify_code_shape("IA0"), CodeShape::Unrecognized);
    assert_eq!(classify_code_shape("723"), CodeShape::RxNorm);
    assert_eq!(classify_code_shape("7"), CodeShape::RxNorm);
    assert_eq!(classify_code_shape("72 3"), CodeShape::Unrecognized);
    assert_eq!(classify_code_shape(""), CodeShape::Unrecognized);
    assert_eq!(classify_code_shape("I١٠"), CodeShape::Unrecognized);
}

#[test]
fn shapes_name_their_vocabulary() {
    assert_eq!(CodeShape::Icd10.expected_vocabulary(), Some(Vocabulary::Icd10));
    assert_eq!(CodeShape::RxNorm.expected_vocabulary(), Some(Vocabulary::RxNorm));
    assert_eq!(CodeShape::Unrecognized.expected_vocabulary(), None);
}

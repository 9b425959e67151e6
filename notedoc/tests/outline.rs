use notedoc::{BlockKind, NodeId, SectionType, StructuredDocument, structure_document};

const NOTE: &str = "\
# Patient Information
Name: Jane Doe
DOB: 1958-03-14
MRN: 12345

# Chief Complaint
Chest pain for two days.

## History of Present Illness
Started while walking.
Radiates to left arm.

### Timeline
Day 1: onset

## Allergies
PENICILLINS

# Assessment and Plan
Likely angina.
";

fn title(doc: &StructuredDocument, id: NodeId) -> &str {
    doc.section(id)
        .and_then(|block| block.title.as_deref())
        .unwrap_or("<missing>")
}

fn titles(doc: &StructuredDocument, ids: impl IntoIterator<Item = NodeId>) -> Vec<&str> {
    ids.into_iter().map(|id| title(doc, id)).collect()
}

fn node(doc: &StructuredDocument, wanted: &str) -> NodeId {
    doc.tree()
        .ids()
        .find(|&id| title(doc, id) == wanted)
        .unwrap_or_else(|| panic!("no section titled {wanted:?}"))
}

#[test]
fn flat_block_list() {
    let doc = structure_document(NOTE);
    let kinds: Vec<BlockKind> = doc.blocks().iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Heading,
            BlockKind::KeyValue,
            BlockKind::Heading,
            BlockKind::Text,
            BlockKind::Heading,
            BlockKind::Text,
            BlockKind::Heading,
            BlockKind::KeyValue,
            BlockKind::Heading,
            BlockKind::Text,
            BlockKind::Heading,
            BlockKind::Text,
        ]
    );
    assert_eq!(doc.blocks()[4].content, "Started while walking.\nRadiates to left arm.");
    assert_eq!(doc.blocks()[7].metadata.fields["Day 1"], "onset");
}

#[test]
fn outline_nesting() {
    let doc = structure_document(NOTE);
    assert_eq!(
        titles(&doc, doc.roots().iter().copied()),
        vec!["Patient Information", "Chief Complaint", "Assessment and Plan"]
    );

    let cc = node(&doc, "Chief Complaint");
    assert_eq!(
        titles(&doc, doc.tree().children(cc).iter().copied()),
        vec!["History of Present Illness", "Allergies"]
    );

    let hpi = node(&doc, "History of Present Illness");
    assert_eq!(
        titles(&doc, doc.tree().children(hpi).iter().copied()),
        vec!["Timeline"]
    );
}

#[test]
fn children_are_deeper_than_parents() {
    let doc = structure_document(NOTE);
    let tree = doc.tree();
    for &root in doc.roots() {
        assert_eq!(tree.parent(root), None);
    }
    for id in tree.ids() {
        let Some(node) = tree.get(id) else {
            panic!("missing node {id:?}");
        };
        assert_eq!(doc.blocks()[node.block].level, Some(node.depth));
        for &child in &node.children {
            let child_node = tree.get(child).map(|n| n.depth);
            assert!(child_node > Some(node.depth));
            assert_eq!(tree.parent(child), Some(id));
        }
    }
}

#[test]
fn skipped_levels_nest_under_nearest_shallower_heading() {
    let doc = structure_document("# A\n### C\n## B\n### D\n");
    let a = node(&doc, "A");
    let b = node(&doc, "B");
    assert_eq!(titles(&doc, doc.roots().iter().copied()), vec!["A"]);
    assert_eq!(titles(&doc, doc.tree().children(a).iter().copied()), vec!["C", "B"]);
    assert_eq!(titles(&doc, doc.tree().children(b).iter().copied()), vec!["D"]);
}

#[test]
fn shallower_heading_after_deeper_start_is_a_root() {
    let doc = structure_document("## X\n# Y\n");
    assert_eq!(titles(&doc, doc.roots().iter().copied()), vec!["X", "Y"]);
}

#[test]
fn navigation_helpers() {
    let doc = structure_document(NOTE);
    let tree = doc.tree();
    let info = node(&doc, "Patient Information");
    let cc = node(&doc, "Chief Complaint");
    let hpi = node(&doc, "History of Present Illness");
    let timeline = node(&doc, "Timeline");
    let allergies = node(&doc, "Allergies");
    let plan = node(&doc, "Assessment and Plan");

    assert_eq!(tree.next_sibling(hpi), Some(allergies));
    assert_eq!(tree.previous_sibling(allergies), Some(hpi));
    assert_eq!(tree.previous_sibling(hpi), None);
    assert_eq!(tree.next_sibling(allergies), None);
    assert_eq!(tree.next_sibling(info), Some(cc));
    assert_eq!(tree.previous_sibling(plan), Some(cc));

    assert_eq!(tree.ancestors(timeline).collect::<Vec<_>>(), vec![hpi, cc]);
    assert_eq!(tree.ancestors(info).count(), 0);
    assert_eq!(tree.descendants(cc), vec![hpi, timeline, allergies]);
    assert!(tree.descendants(plan).is_empty());
    assert!(tree.children(plan).is_empty());
}

#[test]
fn section_indices() {
    let doc = structure_document(NOTE);

    let allergies: Vec<_> = doc
        .sections_of_type(SectionType::Allergies)
        .filter_map(|b| b.title.as_deref())
        .collect();
    assert_eq!(allergies, vec!["Allergies"]);

    let level_two: Vec<_> = doc
        .sections_at_level(2)
        .filter_map(|b| b.title.as_deref())
        .collect();
    assert_eq!(level_two, vec!["History of Present Illness", "Allergies"]);

    assert_eq!(doc.sections_at_level(1).count(), 3);
    assert_eq!(doc.sections_at_level(4).count(), 0);
    assert!(doc.has_section(SectionType::PatientInfo));
    assert!(!doc.has_section(SectionType::Vitals));
    assert_eq!(doc.sections_of_type(SectionType::Medications).count(), 0);
}

#[test]
fn body_blocks_resolve_to_their_heading() {
    let doc = structure_document(NOTE);
    let hpi = node(&doc, "History of Present Illness");
    let timeline = node(&doc, "Timeline");

    assert_eq!(doc.enclosing_section(5), Some(hpi));
    assert_eq!(doc.enclosing_section(7), Some(timeline));
    assert_eq!(doc.enclosing_section(6), Some(timeline));
    assert_eq!(doc.enclosing_section(99), None);

    let heading = doc.tree().get(timeline).map(|node| node.block);
    assert_eq!(heading, Some(6));
    assert_eq!(timeline.index(), 3);
    assert_eq!(
        doc.block(6).and_then(|b| b.title.as_deref()),
        Some("Timeline")
    );
    assert!(doc.block(12).is_none());
}

#[test]
fn preamble_has_no_enclosing_section() {
    let doc = structure_document("Intro line\n\n# A\nbody\n");
    let a = node(&doc, "A");
    assert_eq!(doc.enclosing_section(0), None);
    assert_eq!(doc.enclosing_section(1), Some(a));
    assert_eq!(doc.enclosing_section(2), Some(a));
}

#[test]
fn offsets_map_to_sections() {
    let doc = structure_document("Intro line\n\n# A\nbody\n");
    let a = node(&doc, "A");
    assert_eq!(doc.section_at_offset(5), None);
    assert_eq!(doc.section_at_offset(11), None);
    assert_eq!(doc.section_at_offset(12), Some(a));
    assert_eq!(doc.section_at_offset(17), Some(a));
    assert_eq!(doc.section_at_offset(20), None);
}

#[test]
fn offsets_map_to_innermost_section() {
    let doc = structure_document(NOTE);
    let offset = NOTE.find("Radiates").map(|b| NOTE[..b].chars().count());
    let Some(offset) = offset else {
        panic!("marker not found");
    };
    assert_eq!(doc.section_at_offset(offset), Some(node(&doc, "History of Present Illness")));

    let onset = NOTE.find("onset").map(|b| NOTE[..b].chars().count());
    assert_eq!(
        onset.and_then(|o| doc.section_at_offset(o)),
        Some(node(&doc, "Timeline"))
    );
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::block::Block;
use crate::classify::SectionType;
use crate::outline::{NodeId, SectionTree};

/// The result of structuring a note: the flat block list, the heading
/// hierarchy over it, and lookup indices built alongside the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredDocument {
    blocks: Vec<Block>,
    tree: SectionTree,
    /// Heading block indices per section type, in source order.
    sections_by_type: BTreeMap<SectionType, Vec<usize>>,
    /// Heading block indices per level, in source order.
    sections_by_level: BTreeMap<u8, Vec<usize>>,
}

impl StructuredDocument {
    pub(crate) fn from_blocks(blocks: Vec<Block>) -> Self {
        let tree = SectionTree::build(&blocks);
        let mut sections_by_type: BTreeMap<SectionType, Vec<usize>> = BTreeMap::new();
        let mut sections_by_level: BTreeMap<u8, Vec<usize>> = BTreeMap::new();

        for node in tree.nodes() {
            let block = &blocks[node.block];
            if let Some(section_type) = block.section_type() {
                sections_by_type
                    .entry(section_type)
                    .or_default()
                    .push(node.block);
            }
            sections_by_level
                .entry(node.depth)
                .or_default()
                .push(node.block);
        }

        StructuredDocument {
            blocks,
            tree,
            sections_by_type,
            sections_by_level,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block in source order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn tree(&self) -> &SectionTree {
        &self.tree
    }

    pub fn roots(&self) -> &[NodeId] {
        self.tree.roots()
    }

    /// The heading block behind a node.
    pub fn section(&self, id: NodeId) -> Option<&Block> {
        self.tree.get(id).and_then(|node| self.blocks.get(node.block))
    }

    pub fn sections_of_type(&self, section_type: SectionType) -> impl Iterator<Item = &Block> {
        self.indexed(self.sections_by_type.get(&section_type))
    }

    pub fn sections_at_level(&self, level: u8) -> impl Iterator<Item = &Block> {
        self.indexed(self.sections_by_level.get(&level))
    }

    pub fn has_section(&self, section_type: SectionType) -> bool {
        self.sections_by_type.contains_key(&section_type)
    }

    fn indexed<'a>(&'a self, indices: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Block> {
        indices
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.blocks.get(idx))
    }

    /// The section a block belongs to: the nearest preceding heading whose
    /// range contains it. A heading is its own section.
    pub fn enclosing_section(&self, block: usize) -> Option<NodeId> {
        if let Some(id) = self.tree.node_for_block(block) {
            return Some(id);
        }
        let target = self.blocks.get(block)?;
        let id = self.tree.last_before_block(block)?;
        let heading = self.section(id)?;
        (heading.span.start <= target.span.start && target.span.end <= heading.span.end)
            .then_some(id)
    }

    /// The section whose range contains a character offset into the source,
    /// for mapping term annotations back onto the outline.
    pub fn section_at_offset(&self, offset: usize) -> Option<NodeId> {
        let after = self.tree.nodes().partition_point(|node| {
            self.blocks
                .get(node.block)
                .is_some_and(|b| b.span.start <= offset)
        });
        let id = self.tree.ids().nth(after.checked_sub(1)?)?;
        self.section(id)
            .is_some_and(|heading| heading.contains_offset(offset))
            .then_some(id)
    }
}

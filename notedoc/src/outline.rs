use serde::Serialize;

use crate::block::Block;

/// Index of a node in its [`SectionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A heading's place in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionNode {
    /// Index of the heading in the flat block list.
    pub block: usize,
    /// Equal to the heading level.
    pub depth: u8,
    /// Lookup only; the tree owns nodes through `children`.
    pub parent: Option<NodeId>,
    /// In source order.
    pub children: Vec<NodeId>,
}

/// The heading hierarchy as a flat node table with index links.
///
/// Nodes are stored in source order, so a node's id also orders it
/// against every other node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionTree {
    nodes: Vec<SectionNode>,
    roots: Vec<NodeId>,
}

impl SectionTree {
    /// Nest headings under the nearest preceding shallower heading.
    pub(crate) fn build(blocks: &[Block]) -> Self {
        let mut tree = SectionTree::default();
        // Open sections, innermost last.
        let mut stack: Vec<NodeId> = Vec::new();

        for (block, heading) in blocks.iter().enumerate() {
            let Some(level) = heading.level else {
                continue;
            };

            // Close sections at the same or deeper level
            while let Some(&top) = stack.last() {
                if tree.nodes[top.0].depth >= level {
                    stack.pop();
                } else {
                    break;
                }
            }

            let id = NodeId(tree.nodes.len());
            let parent = stack.last().copied();
            tree.nodes.push(SectionNode {
                block,
                depth: level,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(parent) => tree.nodes[parent.0].children.push(id),
                None => tree.roots.push(id),
            }
            stack.push(id);
        }

        tree
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&SectionNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[SectionNode] {
        &self.nodes
    }

    /// Node ids in source order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// The list `id` belongs to: its parent's children, or the roots.
    fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(SectionNode {
                parent: Some(parent),
                ..
            }) => self.children(*parent),
            Some(_) => &self.roots,
            None => &[],
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.siblings(id);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.siblings(id);
        let pos = siblings.iter().position(|&s| s == id)?;
        pos.checked_sub(1).map(|prev| siblings[prev])
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Every node below `id`, in source (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// The node whose heading is block `block`.
    pub fn node_for_block(&self, block: usize) -> Option<NodeId> {
        self.nodes
            .binary_search_by_key(&block, |node| node.block)
            .ok()
            .map(NodeId)
    }

    /// The last node whose heading precedes block `block`.
    pub(crate) fn last_before_block(&self, block: usize) -> Option<NodeId> {
        let after = self.nodes.partition_point(|node| node.block < block);
        after.checked_sub(1).map(NodeId)
    }
}

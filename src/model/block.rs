// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::ids::{BlockId, DocumentId};

/// Closed set of block types a note can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    BulletListItem,
    NumberedListItem,
    CheckListItem { checked: bool },
    Quote,
    CodeBlock { language: Option<String> },
}

impl BlockKind {
    pub const MAX_HEADING_LEVEL: u8 = 6;

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::BulletListItem => "bulletListItem",
            Self::NumberedListItem => "numberedListItem",
            Self::CheckListItem { .. } => "checkListItem",
            Self::Quote => "quote",
            Self::CodeBlock { .. } => "codeBlock",
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::Heading { level } => Some(*level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanStyles {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
}

/// A run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InlineSpan {
    pub text: String,
    pub styles: SpanStyles,
    pub link: Option<String>,
}

impl InlineSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    kind: BlockKind,
    content: Vec<InlineSpan>,
    children: Vec<Block>,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind, content: Vec<InlineSpan>) -> Self {
        Self {
            id,
            kind,
            content,
            children: Vec::new(),
        }
    }

    pub fn paragraph(id: BlockId, text: impl Into<String>) -> Self {
        Self::new(id, BlockKind::Paragraph, vec![InlineSpan::plain(text)])
    }

    pub fn heading(id: BlockId, level: u8, text: impl Into<String>) -> Self {
        Self::new(id, BlockKind::Heading { level }, vec![InlineSpan::plain(text)])
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: BlockKind) {
        self.kind = kind;
    }

    pub fn content(&self) -> &[InlineSpan] {
        &self.content
    }

    pub fn set_content(&mut self, content: Vec<InlineSpan>) {
        self.content = content;
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.children
    }

    pub fn plain_text(&self) -> String {
        self.content.iter().map(|span| span.text.as_str()).collect()
    }

    /// True when `id` is this block or one of its descendants.
    pub fn contains(&self, id: &BlockId) -> bool {
        &self.id == id || self.children.iter().any(|child| child.contains(id))
    }

    /// Levels in this subtree, counting the block itself.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(Block::height).max().unwrap_or(0)
    }

    /// This block's id followed by every descendant id, pre-order.
    pub fn subtree_ids(&self) -> Vec<&BlockId> {
        let mut ids = Vec::new();
        self.walk_inner(0, &mut |block, _| ids.push(block.id()));
        ids
    }

    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn find_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    fn walk_inner<'a>(&'a self, depth: usize, visit: &mut dyn FnMut(&'a Block, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_inner(depth + 1, visit);
        }
    }
}

/// Where a block sits in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockLocation {
    pub parent: Option<BlockId>,
    pub index: usize,
}

/// A note: a title plus an ordered tree of blocks.
#[derive(Debug, Clone)]
pub struct BlockDocument {
    id: DocumentId,
    title: String,
    blocks: Vec<Block>,
    revision: u64,
    read_only: bool,
}

impl BlockDocument {
    /// Deepest nesting a note may reach; top-level blocks sit at level 1.
    pub const MAX_DEPTH: usize = 32;

    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            blocks: Vec::new(),
            revision: 0,
            read_only: false,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find_map(|block| block.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find_map(|block| block.find_mut(id))
    }

    /// Depth-first, pre-order traversal; top-level blocks have depth 0.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a Block, usize)) {
        for block in &self.blocks {
            block.walk_inner(0, &mut visit);
        }
    }

    /// Nesting depth of the whole tree (0 for an empty note).
    pub fn depth(&self) -> usize {
        self.blocks.iter().map(Block::height).max().unwrap_or(0)
    }

    /// 1-based nesting level of `id`.
    pub fn level_of(&self, id: &BlockId) -> Option<usize> {
        let mut level = None;
        self.walk(|block, depth| {
            if level.is_none() && block.id() == id {
                level = Some(depth + 1);
            }
        });
        level
    }

    pub fn block_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }

    pub fn block_ids(&self) -> BTreeSet<&BlockId> {
        let mut ids = BTreeSet::new();
        self.walk(|block, _| {
            ids.insert(block.id());
        });
        ids
    }

    /// Ids that appear more than once in the tree.
    pub fn duplicate_block_ids(&self) -> Vec<&BlockId> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        self.walk(|block, _| {
            if !seen.insert(block.id()) {
                duplicates.push(block.id());
            }
        });
        duplicates
    }

    pub(crate) fn locate(&self, id: &BlockId) -> Option<BlockLocation> {
        fn search(
            blocks: &[Block],
            parent: Option<&BlockId>,
            id: &BlockId,
        ) -> Option<BlockLocation> {
            for (index, block) in blocks.iter().enumerate() {
                if block.id() == id {
                    return Some(BlockLocation {
                        parent: parent.cloned(),
                        index,
                    });
                }
                if let Some(found) = search(block.children(), Some(block.id()), id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.blocks, None, id)
    }

    /// Sibling list under `parent` (`None` = top level).
    pub(crate) fn siblings_mut(&mut self, parent: Option<&BlockId>) -> Option<&mut Vec<Block>> {
        match parent {
            None => Some(&mut self.blocks),
            Some(parent_id) => self.find_mut(parent_id).map(Block::children_mut),
        }
    }

    /// Detaches the block (with its subtree) from the tree.
    pub(crate) fn take(&mut self, id: &BlockId) -> Option<(BlockLocation, Block)> {
        let location = self.locate(id)?;
        let siblings = self.siblings_mut(location.parent.as_ref())?;
        let block = siblings.remove(location.index);
        Some((location, block))
    }
}

impl PartialEq for BlockDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.blocks == other.blocks
            && self.revision == other.revision
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockDocument, BlockLocation};
    use crate::model::{BlockId, DocumentId};

    fn bid(value: &str) -> BlockId {
        BlockId::new(value).expect("block id")
    }

    fn nested_note() -> BlockDocument {
        BlockDocument::new(DocumentId::new("n1").expect("doc id"), "Note").with_blocks(vec![
            Block::heading(bid("h"), 1, "Head").with_children(vec![
                Block::paragraph(bid("p1"), "one"),
                Block::paragraph(bid("p2"), "two")
                    .with_children(vec![Block::paragraph(bid("p3"), "three")]),
            ]),
            Block::paragraph(bid("tail"), "tail"),
        ])
    }

    #[test]
    fn walk_visits_depth_first_with_depths() {
        let doc = nested_note();
        let mut order = Vec::new();
        doc.walk(|block, depth| order.push((block.id().to_string(), depth)));
        let expected = [("h", 0), ("p1", 1), ("p2", 1), ("p3", 2), ("tail", 0)];
        assert_eq!(
            order,
            expected.iter().map(|(id, d)| (id.to_string(), *d)).collect::<Vec<_>>()
        );
        assert_eq!(doc.block_count(), 5);
    }

    #[test]
    fn locate_and_take_detach_subtrees() {
        let mut doc = nested_note();
        assert_eq!(
            doc.locate(&bid("p3")),
            Some(BlockLocation { parent: Some(bid("p2")), index: 0 })
        );

        let (location, taken) = doc.take(&bid("p2")).expect("p2 present");
        assert_eq!(location, BlockLocation { parent: Some(bid("h")), index: 1 });
        assert!(taken.contains(&bid("p3")));
        assert!(doc.find(&bid("p3")).is_none());
        assert_eq!(doc.block_count(), 3);
    }

    #[test]
    fn depth_and_levels_count_from_one() {
        let doc = nested_note();
        assert_eq!(doc.depth(), 3);
        assert_eq!(doc.level_of(&bid("h")), Some(1));
        assert_eq!(doc.level_of(&bid("p3")), Some(3));
        assert_eq!(doc.level_of(&bid("tail")), Some(1));
        assert_eq!(doc.level_of(&bid("missing")), None);
        assert_eq!(doc.blocks()[0].height(), 3);
        assert_eq!(BlockDocument::new(doc.id().clone(), "").depth(), 0);
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let id = DocumentId::new("n1").expect("doc id");
        let doc = BlockDocument::new(id, "Note").with_blocks(vec![
            Block::paragraph(bid("a"), "x"),
            Block::paragraph(bid("b"), "y").with_children(vec![Block::paragraph(bid("a"), "z")]),
        ]);
        assert_eq!(doc.duplicate_block_ids(), vec![&bid("a")]);
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Note to concept map conversion.
//!
//! Headings become concept shapes; a heading owns its tree children plus the siblings that follow
//! it until the next heading of the same or a higher level. Nested headings become child shapes
//! connected from their owner. Every other block is folded into the label of the shape that owns
//! it, so paragraphs never turn into nodes of their own. Content with no owning heading lands on an
//! implicit root shape labeled with the note title.
//!
//! Conversion is total and one-way: the note is only read, and the produced map is a new document
//! at revision 0.

mod layout;

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{
    Block, BlockDocument, BlockKind, CanvasDocument, Connector, ConnectorId, DocumentId, Shape,
    ShapeId, ShapeKind,
};

pub const UNTITLED_HEADING: &str = "Untitled";
pub const UNTITLED_NOTE: &str = "Untitled note";
pub const MAP_TITLE_PREFIX: &str = "From note: ";

/// A freshly produced map, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    source_block_document_id: DocumentId,
    canvas: CanvasDocument,
}

impl ConversionResult {
    pub fn source_block_document_id(&self) -> &DocumentId {
        &self.source_block_document_id
    }

    pub fn canvas(&self) -> &CanvasDocument {
        &self.canvas
    }

    pub fn into_canvas(self) -> CanvasDocument {
        self.canvas
    }
}

/// Converts `note` into a new concept map with a freshly minted id.
pub fn convert(note: &BlockDocument) -> ConversionResult {
    convert_with_id(note, DocumentId::fresh())
}

/// Converts `note` into a new concept map stored under `canvas_id`.
pub fn convert_with_id(note: &BlockDocument, canvas_id: DocumentId) -> ConversionResult {
    let mut builder = MapBuilder::new(note);
    builder.fold_sequence(note.blocks(), None);
    if builder.shapes.is_empty() {
        builder.root();
    }

    ConversionResult {
        source_block_document_id: note.id().clone(),
        canvas: builder.finish(canvas_id),
    }
}

struct ShapeDraft {
    id: ShapeId,
    heading: String,
    lines: Vec<String>,
}

impl ShapeDraft {
    fn label(&self) -> String {
        let mut label = self.heading.clone();
        for line in &self.lines {
            label.push('\n');
            label.push_str(line);
        }
        label
    }
}

struct MapBuilder<'a> {
    note: &'a BlockDocument,
    shapes: Vec<ShapeDraft>,
    edges: Vec<(usize, usize)>,
    root: Option<usize>,
}

impl<'a> MapBuilder<'a> {
    fn new(note: &'a BlockDocument) -> Self {
        Self {
            note,
            shapes: Vec::new(),
            edges: Vec::new(),
            root: None,
        }
    }

    fn push_shape(&mut self, id: ShapeId, heading: String) -> usize {
        self.shapes.push(ShapeDraft {
            id,
            heading,
            lines: Vec::new(),
        });
        self.shapes.len() - 1
    }

    /// The implicit root shape, created on first use.
    fn root(&mut self) -> usize {
        if let Some(root) = self.root {
            return root;
        }
        let id = root_shape_id(self.note);
        let label = non_empty_or(collapse_whitespace(self.note.title()), UNTITLED_NOTE);
        let index = self.push_shape(id, label);
        self.root = Some(index);
        index
    }

    /// Walks one sibling list. `owner` is the shape that owns the list (`None` at top level).
    fn fold_sequence(&mut self, blocks: &[Block], owner: Option<usize>) {
        let mut sections: Vec<(u8, usize)> = Vec::new();
        let mut numbered_run = 0usize;

        for block in blocks {
            if let Some(level) = block.kind().heading_level() {
                numbered_run = 0;
                while sections.last().is_some_and(|(open, _)| *open >= level) {
                    sections.pop();
                }
                let parent = sections.last().map(|(_, shape)| *shape).or(owner);

                let heading =
                    non_empty_or(collapse_whitespace(&block.plain_text()), UNTITLED_HEADING);
                let shape = self.push_shape(block_shape_id(block), heading);
                if let Some(parent) = parent {
                    self.edges.push((parent, shape));
                }
                sections.push((level, shape));
                self.fold_sequence(block.children(), Some(shape));
                continue;
            }

            numbered_run = match block.kind() {
                BlockKind::NumberedListItem => numbered_run + 1,
                _ => 0,
            };

            let target = match sections.last().map(|(_, shape)| *shape).or(owner) {
                Some(shape) => shape,
                None => self.root(),
            };
            if let Some(line) = folded_line(block, numbered_run) {
                self.shapes[target].lines.push(line);
            }
            self.fold_sequence(block.children(), Some(target));
        }
    }

    fn finish(self, canvas_id: DocumentId) -> CanvasDocument {
        let title = non_empty_or(collapse_whitespace(self.note.title()), UNTITLED_NOTE);
        let mut canvas = CanvasDocument::new(canvas_id, format!("{MAP_TITLE_PREFIX}{title}"));

        let order = self
            .shapes
            .iter()
            .map(|draft| draft.id.clone())
            .collect::<Vec<_>>();
        let edges = self
            .edges
            .iter()
            .map(|(from, to)| (order[*from].clone(), order[*to].clone()))
            .collect::<Vec<_>>();

        for draft in &self.shapes {
            canvas
                .shapes_mut()
                .insert(draft.id.clone(), Shape::labeled(ShapeKind::Concept, draft.label()));
        }
        for (index, (from, to)) in edges.iter().enumerate() {
            canvas
                .connectors_mut()
                .insert(connector_id(index + 1), Connector::new(from.clone(), to.clone()));
        }

        layout::layered(&mut canvas, &order, &edges);
        canvas
    }
}

fn folded_line(block: &Block, numbered_run: usize) -> Option<String> {
    let text = collapse_whitespace(&block.plain_text());
    if text.is_empty() {
        return None;
    }
    let line = match block.kind() {
        BlockKind::BulletListItem => format!("• {text}"),
        BlockKind::NumberedListItem => format!("{numbered_run}. {text}"),
        BlockKind::CheckListItem { checked: true } => format!("[x] {text}"),
        BlockKind::CheckListItem { checked: false } => format!("[ ] {text}"),
        BlockKind::Paragraph
        | BlockKind::Heading { .. }
        | BlockKind::Quote
        | BlockKind::CodeBlock { .. } => text,
    };
    Some(line)
}

fn collapse_whitespace(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace =
        WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("hard-coded regex is valid"));
    whitespace.replace_all(text.trim(), " ").into_owned()
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_owned()
    } else {
        text
    }
}

fn block_shape_id(block: &Block) -> ShapeId {
    ShapeId::new(format!("s:{}", block.id())).unwrap_or_else(|_| ShapeId::fresh())
}

/// `s:root`, unless a block already claims that shape id.
fn root_shape_id(note: &BlockDocument) -> ShapeId {
    let taken = note.block_ids();
    let mut suffix = 0usize;
    loop {
        let candidate = match suffix {
            0 => "root".to_owned(),
            n => format!("root-{n}"),
        };
        if !taken.iter().any(|id| id.as_str() == candidate) {
            return ShapeId::new(format!("s:{candidate}")).unwrap_or_else(|_| ShapeId::fresh());
        }
        suffix += 1;
    }
}

fn connector_id(ordinal: usize) -> ConnectorId {
    ConnectorId::new(format!("c:{ordinal}")).unwrap_or_else(|_| ConnectorId::fresh())
}

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for concept maps and notes.
//!
//! A batch of ops is applied atomically: work happens on a draft copy and is committed only when
//! every op succeeds. The result carries a minimal delta that callers can use to refresh derived
//! state. Revisions are not touched here; only a successful save advances them.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::ErrorKind;
use crate::model::{
    Block, BlockDocument, BlockId, BlockKind, CanvasDocument, Connector, ConnectorId, DocumentId,
    InlineSpan, Point, Shape, ShapeId, ShapeKind, Size, Style,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    AddShape {
        shape_id: ShapeId,
        shape: Shape,
    },
    UpdateShape {
        shape_id: ShapeId,
        patch: ShapePatch,
    },
    /// Also removes every connector that touches the shape.
    RemoveShape {
        shape_id: ShapeId,
    },
    AddConnector {
        connector_id: ConnectorId,
        connector: Connector,
    },
    UpdateConnector {
        connector_id: ConnectorId,
        patch: ConnectorPatch,
    },
    RemoveConnector {
        connector_id: ConnectorId,
    },
    SetTitle {
        title: String,
    },
}

/// Optional-field patch; `None` leaves the field unchanged. `label: Some(None)` clears the label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub kind: Option<ShapeKind>,
    pub label: Option<Option<String>>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub style: Option<Style>,
    pub properties: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorPatch {
    pub from: Option<ShapeId>,
    pub to: Option<ShapeId>,
    pub label: Option<Option<String>>,
    pub style: Option<Style>,
    pub properties: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOp {
    /// `index` past the end of the sibling list appends.
    InsertBlock {
        parent: Option<BlockId>,
        index: usize,
        block: Block,
    },
    RemoveBlock {
        block_id: BlockId,
    },
    /// Moves a block (with its subtree) under `new_parent` at `index`.
    ReorderBlock {
        block_id: BlockId,
        new_parent: Option<BlockId>,
        index: usize,
    },
    EditContent {
        block_id: BlockId,
        content: Vec<InlineSpan>,
    },
    SetKind {
        block_id: BlockId,
        kind: BlockKind,
    },
    SetTitle {
        title: String,
    },
}

/// An element of either document type, as reported in a [`Delta`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRef {
    Title,
    Shape(ShapeId),
    Connector(ConnectorId),
    Block(BlockId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which elements changed as the result of applying ops.
///
/// Coarse on purpose: an element appears in at most one list, and an element added and removed
/// within the same batch is reported as removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ElementRef>,
    pub removed: Vec<ElementRef>,
    pub updated: Vec<ElementRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<ElementRef>,
    removed: HashSet<ElementRef>,
    updated: HashSet<ElementRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, element: ElementRef) {
        self.removed.remove(&element);
        self.updated.remove(&element);
        self.added.insert(element);
    }

    fn record_removed(&mut self, element: ElementRef) {
        self.added.remove(&element);
        self.updated.remove(&element);
        self.removed.insert(element);
    }

    fn record_updated(&mut self, element: ElementRef) {
        if self.added.contains(&element) || self.removed.contains(&element) {
            return;
        }
        self.updated.insert(element);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta {
            added,
            removed,
            updated,
        }
    }
}

/// Applies `ops` to a concept map as one atomic batch.
pub fn apply_canvas_ops(
    doc: &mut CanvasDocument,
    ops: &[CanvasOp],
) -> Result<ApplyResult, ApplyError> {
    if doc.is_read_only() {
        return Err(ApplyError::ReadOnly {
            document_id: doc.id().clone(),
        });
    }
    if ops.is_empty() {
        return Ok(ApplyResult {
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut draft = doc.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_canvas_op(&mut draft, op, &mut delta)?;
    }
    *doc = draft;

    Ok(ApplyResult {
        applied: ops.len(),
        delta: delta.finish(),
    })
}

/// Applies `ops` to a note as one atomic batch.
pub fn apply_block_ops(
    doc: &mut BlockDocument,
    ops: &[BlockOp],
) -> Result<ApplyResult, ApplyError> {
    if doc.is_read_only() {
        return Err(ApplyError::ReadOnly {
            document_id: doc.id().clone(),
        });
    }
    if ops.is_empty() {
        return Ok(ApplyResult {
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut draft = doc.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_block_op(&mut draft, op, &mut delta)?;
    }
    *doc = draft;

    Ok(ApplyResult {
        applied: ops.len(),
        delta: delta.finish(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Shape,
    Connector,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    ReadOnly { document_id: DocumentId },
    CycleRejected { block_id: BlockId, new_parent: BlockId },
    AlreadyExists { kind: ElementKind, element_id: String },
    NotFound { kind: ElementKind, element_id: String },
    MissingEndpoint { connector_id: ConnectorId, shape_id: ShapeId },
    InvalidHeadingLevel { block_id: BlockId, level: u8 },
    NonFiniteGeometry { shape_id: ShapeId },
    TooDeep { block_id: BlockId, depth: usize },
}

impl ApplyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadOnly { .. } => ErrorKind::ReadOnlyViolation,
            Self::CycleRejected { .. } => ErrorKind::CycleRejected,
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::MissingEndpoint { .. }
            | Self::InvalidHeadingLevel { .. }
            | Self::NonFiniteGeometry { .. }
            | Self::TooDeep { .. } => ErrorKind::InvalidMutation,
        }
    }
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly { document_id } => write!(f, "document {document_id} is read-only"),
            Self::CycleRejected {
                block_id,
                new_parent,
            } => write!(
                f,
                "cannot move block {block_id} under {new_parent}: target is inside the moved block"
            ),
            Self::AlreadyExists { kind, element_id } => {
                write!(f, "element already exists ({kind:?}, id={element_id})")
            }
            Self::NotFound { kind, element_id } => {
                write!(f, "element not found ({kind:?}, id={element_id})")
            }
            Self::MissingEndpoint {
                connector_id,
                shape_id,
            } => write!(
                f,
                "connector {connector_id} references missing shape {shape_id}"
            ),
            Self::InvalidHeadingLevel { block_id, level } => write!(
                f,
                "heading level {level} on block {block_id} is outside 1..={}",
                BlockKind::MAX_HEADING_LEVEL
            ),
            Self::NonFiniteGeometry { shape_id } => {
                write!(f, "shape {shape_id} has a non-finite position or size")
            }
            Self::TooDeep { block_id, depth } => write!(
                f,
                "block {block_id} would nest {depth} levels deep (max {})",
                BlockDocument::MAX_DEPTH
            ),
        }
    }
}

impl std::error::Error for ApplyError {}

// Per-op implementation for canvas/block mutations.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Two editable document types (concept maps and block notes) plus the read-only shared view.

pub mod block;
pub mod canvas;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod kind;
pub mod share;

pub use block::{Block, BlockDocument, BlockKind, InlineSpan, SpanStyles};
pub use canvas::{
    CanvasDocument, Connector, ParseShapeKindError, Point, Shape, ShapeKind, Size, Style,
};
pub use ids::{BlockId, ConnectorId, DocumentId, Id, IdError, ShapeId, ShareId};
pub use kind::DocumentKind;
pub use share::{new_share_id, RenderedArtifact, SharedView};

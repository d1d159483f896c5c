// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendering for shared views.
//!
//! Maps render to standalone SVG, notes to an HTML `<article>` fragment. Both are plain strings so
//! gateways can store them as-is.

pub mod html;
pub mod svg;
mod text;

pub use html::render_note_html;
pub use svg::render_canvas_svg;

use crate::codec::{decode, DecodeError, Snapshot};
use crate::model::{BlockDocument, CanvasDocument, DocumentId, DocumentKind, RenderedArtifact};

/// Decodes a stored snapshot and renders it. Returns the document title with the artifact.
pub fn render_snapshot(
    id: &DocumentId,
    snapshot: Option<&Snapshot>,
    kind: DocumentKind,
) -> Result<(String, RenderedArtifact), DecodeError> {
    match kind {
        DocumentKind::Canvas => {
            let canvas: CanvasDocument = decode(id, snapshot)?;
            Ok((canvas.title().to_owned(), RenderedArtifact::svg(render_canvas_svg(&canvas))))
        }
        DocumentKind::Block => {
            let note: BlockDocument = decode(id, snapshot)?;
            Ok((note.title().to_owned(), RenderedArtifact::html(render_note_html(&note))))
        }
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::codec::SnapshotCodec;
use crate::model::{BlockDocument, CanvasDocument, DocumentId};
use crate::ops::{apply_block_ops, apply_canvas_ops, ApplyError, ApplyResult, BlockOp, CanvasOp};

/// A document type a session can own: persistable through the codec and editable through ops.
pub trait DocumentModel: SnapshotCodec + Clone + Send + 'static {
    type Op: Send + Sync;

    /// A brand-new titled document at revision 0.
    fn titled(id: DocumentId, title: &str) -> Self;

    fn document_id(&self) -> &DocumentId;

    /// Applies `ops` as one atomic batch.
    fn apply(&mut self, ops: &[Self::Op]) -> Result<ApplyResult, ApplyError>;

    fn set_read_only(&mut self, read_only: bool);

    fn set_revision(&mut self, revision: u64);
}

impl DocumentModel for CanvasDocument {
    type Op = CanvasOp;

    fn titled(id: DocumentId, title: &str) -> Self {
        CanvasDocument::new(id, title)
    }

    fn document_id(&self) -> &DocumentId {
        self.id()
    }

    fn apply(&mut self, ops: &[CanvasOp]) -> Result<ApplyResult, ApplyError> {
        apply_canvas_ops(self, ops)
    }

    fn set_read_only(&mut self, read_only: bool) {
        CanvasDocument::set_read_only(self, read_only);
    }

    fn set_revision(&mut self, revision: u64) {
        CanvasDocument::set_revision(self, revision);
    }
}

impl DocumentModel for BlockDocument {
    type Op = BlockOp;

    fn titled(id: DocumentId, title: &str) -> Self {
        BlockDocument::new(id, title)
    }

    fn document_id(&self) -> &DocumentId {
        self.id()
    }

    fn apply(&mut self, ops: &[BlockOp]) -> Result<ApplyResult, ApplyError> {
        apply_block_ops(self, ops)
    }

    fn set_read_only(&mut self, read_only: bool) {
        BlockDocument::set_read_only(self, read_only);
    }

    fn set_revision(&mut self, revision: u64) {
        BlockDocument::set_revision(self, revision);
    }
}

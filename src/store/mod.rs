// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence gateway: the storage boundary the core talks to.
//!
//! The core only depends on [`PersistenceGateway`]. Two implementations ship with the crate: an
//! in-process [`MemoryGateway`] and a folder-backed [`FolderGateway`] used by the CLI.

pub mod folder;
pub mod memory;

pub use folder::{FolderGateway, StoreError, WriteDurability};
pub use memory::MemoryGateway;

use tracing::info;

use crate::codec::{encode, DecodeError, Snapshot};
use crate::convert::convert;
use crate::error::ErrorKind;
use crate::model::{BlockDocument, DocumentId, DocumentKind, ShareId, SharedView};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("document not found: {id}")]
    NotFound { id: String },
    #[error("revision conflict on {id}: expected {expected_revision}, store has {remote_revision}")]
    Conflict {
        id: String,
        expected_revision: u64,
        remote_revision: u64,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl GatewayError {
    pub(crate) fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Decode(err) => err.kind(),
            Self::Transport { .. } => ErrorKind::TransportFailure,
        }
    }
}

/// One row of [`PersistenceGateway::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub title: String,
    pub revision: u64,
}

/// Storage boundary for documents and shared views.
///
/// `load` distinguishes three outcomes: `Ok(Some(_))` for a stored snapshot, `Ok(None)` for a
/// document that exists but was never saved, and `Err(NotFound)` for an id the store does not
/// know (or that was deleted).
#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn load(&self, id: &DocumentId) -> Result<Option<Snapshot>, GatewayError>;

    /// Stores a new document at revision 0. The id is taken from the snapshot payload.
    async fn create(&self, initial: Snapshot) -> Result<DocumentId, GatewayError>;

    /// Replaces the stored snapshot when the store is still at `expected_revision`.
    /// Returns the new revision (`expected_revision + 1`).
    async fn update(
        &self,
        id: &DocumentId,
        snapshot: Snapshot,
        expected_revision: u64,
    ) -> Result<u64, GatewayError>;

    async fn get_shared(&self, share_id: &ShareId) -> Result<SharedView, GatewayError>;

    /// Issues a shared view for a stored document. Without `regenerate` an already issued share id
    /// is returned unchanged; with it the old share is revoked and a fresh render is issued.
    async fn publish(&self, id: &DocumentId, regenerate: bool) -> Result<ShareId, GatewayError>;

    /// Soft delete: the document (and its shares) disappear from `load`, `update` and `list`.
    async fn delete(&self, id: &DocumentId) -> Result<(), GatewayError>;

    /// Live documents, ordered by id.
    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError>;
}

/// Id recorded in a snapshot about to be created.
pub(crate) fn snapshot_document_id(snapshot: &Snapshot) -> Result<DocumentId, GatewayError> {
    snapshot
        .document_id()
        .ok_or_else(|| {
            GatewayError::Decode(DecodeError::malformed(
                "snapshot payload carries no document id",
            ))
        })
}

/// Converts `note` into a new concept map and persists it. Returns the new map id.
pub async fn convert_and_create<G>(gateway: &G, note: &BlockDocument) -> crate::Result<DocumentId>
where
    G: PersistenceGateway + ?Sized,
{
    let result = convert(note);
    let canvas = result.canvas();
    let id = gateway.create(encode(canvas)).await?;
    info!(
        source_document_id = %result.source_block_document_id(),
        document_id = %id,
        shapes = canvas.shapes().len(),
        connectors = canvas.connectors().len(),
        "converted note into concept map"
    );
    Ok(id)
}

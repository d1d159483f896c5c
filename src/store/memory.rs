// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec::{DecodeError, Snapshot};
use crate::model::{new_share_id, DocumentId, DocumentKind, ShareId, SharedView};
use crate::render::render_snapshot;

use super::{snapshot_document_id, DocumentSummary, GatewayError, PersistenceGateway};

#[derive(Debug, Clone)]
struct StoredDocument {
    kind: DocumentKind,
    snapshot: Option<Snapshot>,
}

impl StoredDocument {
    fn revision(&self) -> u64 {
        self.snapshot.as_ref().map_or(0, |snapshot| snapshot.revision)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: BTreeMap<DocumentId, StoredDocument>,
    deleted: BTreeMap<DocumentId, StoredDocument>,
    shares: BTreeMap<ShareId, (DocumentId, SharedView)>,
}

impl MemoryState {
    fn share_of(&self, id: &DocumentId) -> Option<ShareId> {
        self.shares
            .iter()
            .find(|(_, (document_id, _))| document_id == id)
            .map(|(share_id, _)| share_id.clone())
    }

    fn revoke_shares_of(&mut self, id: &DocumentId) {
        self.shares.retain(|_, (document_id, _)| document_id != id);
    }
}

/// In-process gateway. Nothing survives the process; cloning is not supported, share it with `Arc`.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document that exists but has never been saved (`load` yields `None`).
    pub fn insert_placeholder(&self, id: DocumentId, kind: DocumentKind) {
        self.lock().documents.insert(
            id,
            StoredDocument {
                kind,
                snapshot: None,
            },
        );
    }

    /// Stores `snapshot` as-is, bypassing revision checks.
    pub fn insert_snapshot(&self, id: DocumentId, snapshot: Snapshot) {
        self.lock().documents.insert(
            id,
            StoredDocument {
                kind: snapshot.kind,
                snapshot: Some(snapshot),
            },
        );
    }

    /// Current stored revision, if the document is live.
    pub fn revision(&self, id: &DocumentId) -> Option<u64> {
        self.lock().documents.get(id).map(StoredDocument::revision)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load(&self, id: &DocumentId) -> Result<Option<Snapshot>, GatewayError> {
        let state = self.lock();
        let stored = state
            .documents
            .get(id)
            .ok_or_else(|| GatewayError::not_found(id))?;
        Ok(stored.snapshot.clone())
    }

    async fn create(&self, mut initial: Snapshot) -> Result<DocumentId, GatewayError> {
        let id = snapshot_document_id(&initial)?;
        let mut state = self.lock();
        if let Some(existing) = state.documents.get(&id) {
            return Err(GatewayError::Conflict {
                id: id.to_string(),
                expected_revision: 0,
                remote_revision: existing.revision(),
            });
        }
        initial.revision = 0;
        state.documents.insert(
            id.clone(),
            StoredDocument {
                kind: initial.kind,
                snapshot: Some(initial),
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: &DocumentId,
        mut snapshot: Snapshot,
        expected_revision: u64,
    ) -> Result<u64, GatewayError> {
        let mut state = self.lock();
        let stored = state
            .documents
            .get_mut(id)
            .ok_or_else(|| GatewayError::not_found(id))?;

        if stored.kind != snapshot.kind {
            return Err(GatewayError::Decode(DecodeError::malformed(format!(
                "cannot store a {} snapshot over a {} document",
                snapshot.kind, stored.kind
            ))));
        }
        let remote_revision = stored.revision();
        if remote_revision != expected_revision {
            return Err(GatewayError::Conflict {
                id: id.to_string(),
                expected_revision,
                remote_revision,
            });
        }

        let new_revision = expected_revision + 1;
        snapshot.revision = new_revision;
        stored.snapshot = Some(snapshot);
        Ok(new_revision)
    }

    async fn get_shared(&self, share_id: &ShareId) -> Result<SharedView, GatewayError> {
        self.lock()
            .shares
            .get(share_id)
            .map(|(_, view)| view.clone())
            .ok_or_else(|| GatewayError::not_found(share_id))
    }

    async fn publish(&self, id: &DocumentId, regenerate: bool) -> Result<ShareId, GatewayError> {
        let mut state = self.lock();
        let stored = state
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(id))?;

        if let Some(existing) = state.share_of(id) {
            if !regenerate {
                return Ok(existing);
            }
            state.revoke_shares_of(id);
        }

        let (title, artifact) = render_snapshot(id, stored.snapshot.as_ref(), stored.kind)?;
        let share_id = new_share_id();
        state.shares.insert(
            share_id.clone(),
            (id.clone(), SharedView::new(share_id.clone(), title, artifact)),
        );
        Ok(share_id)
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), GatewayError> {
        let mut state = self.lock();
        let stored = state
            .documents
            .remove(id)
            .ok_or_else(|| GatewayError::not_found(id))?;
        state.revoke_shares_of(id);
        state.deleted.insert(id.clone(), stored);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError> {
        let state = self.lock();
        Ok(state
            .documents
            .iter()
            .map(|(id, stored)| DocumentSummary {
                id: id.clone(),
                kind: stored.kind,
                title: stored
                    .snapshot
                    .as_ref()
                    .and_then(Snapshot::title)
                    .unwrap_or_default()
                    .to_owned(),
                revision: stored.revision(),
            })
            .collect())
    }
}

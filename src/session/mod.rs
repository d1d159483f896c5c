// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Session controller: the lifetime of one opened-for-editing document.
//!
//! ```text
//! Unloaded -> Loading -> Ready -> Saving -> Ready
//!                 \         \         \
//!                  +---------+---------+--> Errored
//! ```
//!
//! The controller owns the only mutable instance of the document. Callers get owned clones via
//! [`SessionController::view`]. At most one gateway `update` is in flight per session: the
//! `Saving` state doubles as the lock, so a second `save()` fails fast with `SaveInProgress`.

mod document;

pub use document::DocumentModel;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::codec::{decode, encode};
use crate::error::{Error, ErrorKind, Result};
use crate::model::DocumentId;
use crate::ops::ApplyResult;
use crate::store::PersistenceGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Unloaded,
    Loading,
    Ready,
    Saving,
    Errored,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Saving => "saving",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing to save; no gateway call was made.
    Clean,
    Saved { revision: u64 },
}

#[derive(Debug)]
struct Slot<D> {
    state: SessionState,
    id: Option<DocumentId>,
    document: Option<D>,
    dirty: bool,
    read_only: bool,
    last_error: Option<Error>,
    // Bumped whenever the slot is reset, so a load or save that settles after `close()` is
    // not applied to whatever the session holds by then.
    epoch: u64,
}

impl<D> Slot<D> {
    fn empty() -> Self {
        Self {
            state: SessionState::Unloaded,
            id: None,
            document: None,
            dirty: false,
            read_only: false,
            last_error: None,
            epoch: 0,
        }
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            debug!(
                document_id = self.id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
                from = %self.state,
                to = %to,
                "session state"
            );
            self.state = to;
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        self.transition(SessionState::Errored);
        self.last_error = Some(err.clone());
        err
    }

    fn invalid(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state,
        }
    }

    fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self::empty();
        self.epoch = epoch;
    }
}

pub struct SessionController<D, G: ?Sized> {
    gateway: Arc<G>,
    slot: Mutex<Slot<D>>,
}

impl<D, G> fmt::Debug for SessionController<D, G>
where
    D: fmt::Debug,
    G: ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("slot", &*self.slot())
            .finish_non_exhaustive()
    }
}

impl<D, G> SessionController<D, G>
where
    G: ?Sized,
{
    fn slot(&self) -> MutexGuard<'_, Slot<D>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D, G> SessionController<D, G>
where
    D: DocumentModel,
    G: PersistenceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            slot: Mutex::new(Slot::empty()),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn state(&self) -> SessionState {
        self.slot().state
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.slot().id.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.slot().dirty
    }

    pub fn is_read_only(&self) -> bool {
        self.slot().read_only
    }

    /// The error that moved the session to `Errored`, if any.
    pub fn last_error(&self) -> Option<Error> {
        self.slot().last_error.clone()
    }

    /// An owned copy of the current document for rendering.
    pub fn view(&self) -> Option<D> {
        self.slot().document.clone()
    }

    /// Loads `id` from the gateway. A missing id is reported as `NotFound`, never replaced by an
    /// empty document; a document that exists but was never saved opens empty.
    pub async fn open(&self, id: &DocumentId) -> Result<()> {
        let epoch = self.begin_load("open", id, false)?;
        self.finish_load(id, epoch).await
    }

    pub async fn open_read_only(&self, id: &DocumentId) -> Result<()> {
        let epoch = self.begin_load("open_read_only", id, true)?;
        self.finish_load(id, epoch).await
    }

    /// Re-reads the document from the gateway, discarding local edits. This is the "reload" way
    /// out of `Errored` (including after a conflict).
    pub async fn reload(&self) -> Result<()> {
        let (id, epoch) = {
            let mut slot = self.slot();
            let Some(id) = slot.id.clone() else {
                return Err(slot.invalid("reload"));
            };
            if !matches!(slot.state, SessionState::Ready | SessionState::Errored) {
                return Err(slot.invalid("reload"));
            }
            if slot.dirty {
                debug!(document_id = %id, "reload discards unsaved changes");
            }
            let read_only = slot.read_only;
            slot.reset();
            slot.id = Some(id.clone());
            slot.read_only = read_only;
            slot.transition(SessionState::Loading);
            (id, slot.epoch)
        };
        self.finish_load(&id, epoch).await
    }

    /// Creates a new document titled `title` and enters `Ready` holding it.
    pub async fn create(&self, title: &str) -> Result<DocumentId> {
        let id = DocumentId::fresh();
        let epoch = self.begin_load("create", &id, false)?;

        let document = D::titled(id.clone(), title);
        let created = self.gateway.create(encode(&document)).await;

        let mut slot = self.slot();
        if slot.epoch != epoch {
            return Err(slot.invalid("create"));
        }
        match created {
            Ok(created_id) => {
                info!(document_id = %created_id, kind = %D::KIND, "created document");
                slot.document = Some(document);
                slot.transition(SessionState::Ready);
                Ok(created_id)
            }
            Err(err) => {
                let err = Error::from(err);
                log_gateway_failure("create", &id, &err);
                Err(slot.fail(err))
            }
        }
    }

    /// Applies `ops` to the owned document and marks the session dirty. Legal only in `Ready`.
    ///
    /// A rejected batch leaves the document untouched and moves the session to `Errored`.
    pub fn mutate(&self, ops: &[D::Op]) -> Result<ApplyResult> {
        let mut slot = self.slot();
        if slot.state != SessionState::Ready {
            return Err(slot.invalid("mutate"));
        }
        let Some(document) = slot.document.as_mut() else {
            return Err(slot.invalid("mutate"));
        };

        match document.apply(ops) {
            Ok(result) => {
                if result.applied > 0 {
                    slot.dirty = true;
                }
                Ok(result)
            }
            Err(err) => {
                warn!(
                    document_id = %document.document_id(),
                    kind = %err.kind(),
                    "mutation rejected: {err}"
                );
                Err(slot.fail(Error::Apply(err)))
            }
        }
    }

    /// Persists the document if it is dirty.
    ///
    /// On a revision conflict the session moves to `Errored` carrying the remote revision; the
    /// local document is left as it was.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let (id, snapshot, expected_revision, epoch) = {
            let mut slot = self.slot();
            match slot.state {
                SessionState::Ready => {}
                SessionState::Saving => {
                    let id = slot.id.as_ref().map(ToString::to_string).unwrap_or_default();
                    debug!(document_id = %id, "save rejected while another is in flight");
                    return Err(Error::SaveInProgress { id });
                }
                _ => return Err(slot.invalid("save")),
            }
            if !slot.dirty {
                return Ok(SaveOutcome::Clean);
            }
            let Some(document) = slot.document.as_ref() else {
                return Err(slot.invalid("save"));
            };
            let id = document.document_id().clone();
            let snapshot = encode(document);
            let expected_revision = document.revision();
            slot.transition(SessionState::Saving);
            (id, snapshot, expected_revision, slot.epoch)
        };

        let updated = self.gateway.update(&id, snapshot, expected_revision).await;

        let mut slot = self.slot();
        if slot.epoch != epoch {
            debug!(document_id = %id, "session closed while saving; result dropped");
            return updated.map(|revision| SaveOutcome::Saved { revision }).map_err(Error::from);
        }
        match updated {
            Ok(revision) => {
                if let Some(document) = slot.document.as_mut() {
                    document.set_revision(revision);
                }
                slot.dirty = false;
                slot.transition(SessionState::Ready);
                info!(document_id = %id, revision, "saved document");
                Ok(SaveOutcome::Saved { revision })
            }
            Err(err) => {
                let err = Error::from(err);
                log_gateway_failure("save", &id, &err);
                Err(slot.fail(err))
            }
        }
    }

    /// Accepts the remote revision reported by a conflict as the new base, so the next `save()`
    /// overwrites the stored document. Returns that revision.
    pub fn overwrite_after_conflict(&self) -> Result<u64> {
        let mut slot = self.slot();
        let remote_revision = match (&slot.state, &slot.last_error) {
            (SessionState::Errored, Some(err)) => err.remote_revision(),
            _ => None,
        };
        let Some(remote_revision) = remote_revision else {
            return Err(slot.invalid("overwrite_after_conflict"));
        };
        let Some(document) = slot.document.as_mut() else {
            return Err(slot.invalid("overwrite_after_conflict"));
        };

        document.set_revision(remote_revision);
        let id = document.document_id().clone();
        slot.last_error = None;
        slot.transition(SessionState::Ready);
        warn!(
            document_id = %id,
            revision = remote_revision,
            "overwriting remote changes on next save"
        );
        Ok(remote_revision)
    }

    pub fn set_read_only(&self, read_only: bool) -> Result<()> {
        let mut slot = self.slot();
        if slot.state != SessionState::Ready {
            return Err(slot.invalid("set_read_only"));
        }
        let Some(document) = slot.document.as_mut() else {
            return Err(slot.invalid("set_read_only"));
        };
        document.set_read_only(read_only);
        slot.read_only = read_only;
        Ok(())
    }

    /// Drops the in-memory document from any state. Unsaved changes are discarded.
    pub fn close(&self) {
        let mut slot = self.slot();
        if slot.dirty {
            warn!(
                document_id = slot.id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
                "closing session with unsaved changes"
            );
        }
        slot.transition(SessionState::Unloaded);
        slot.reset();
    }

    fn begin_load(&self, operation: &'static str, id: &DocumentId, read_only: bool) -> Result<u64> {
        let mut slot = self.slot();
        if slot.state != SessionState::Unloaded {
            return Err(slot.invalid(operation));
        }
        slot.reset();
        slot.id = Some(id.clone());
        slot.read_only = read_only;
        slot.transition(SessionState::Loading);
        Ok(slot.epoch)
    }

    async fn finish_load(&self, id: &DocumentId, epoch: u64) -> Result<()> {
        let loaded = self.gateway.load(id).await;

        let mut slot = self.slot();
        if slot.epoch != epoch {
            return Err(slot.invalid("open"));
        }

        let document = loaded
            .map_err(Error::from)
            .and_then(|snapshot| Ok(decode::<D>(id, snapshot.as_ref())?));
        match document {
            Ok(mut document) => {
                if slot.read_only {
                    document.set_read_only(true);
                }
                debug!(document_id = %id, revision = document.revision(), "opened document");
                slot.document = Some(document);
                slot.dirty = false;
                slot.transition(SessionState::Ready);
                Ok(())
            }
            Err(err) => {
                log_gateway_failure("open", id, &err);
                Err(slot.fail(err))
            }
        }
    }
}

fn log_gateway_failure(operation: &str, id: &DocumentId, err: &Error) {
    match err.kind() {
        ErrorKind::TransportFailure => {
            error!(document_id = %id, operation, "gateway unreachable: {err}");
        }
        ErrorKind::Conflict => {
            warn!(
                document_id = %id,
                operation,
                remote_revision = err.remote_revision(),
                "revision conflict"
            );
        }
        kind => {
            warn!(document_id = %id, operation, kind = %kind, "{err}");
        }
    }
}

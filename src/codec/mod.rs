// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Snapshot codec: in-memory documents to persistable snapshots and back.
//!
//! Persisted layout: `{ "schemaVersion", "kind", "payload", "revision" }`. The codec is pure: no
//! I/O, no logging, and `encode` is deterministic (same document state, same bytes).

mod payload;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorKind;
use crate::model::{BlockDocument, CanvasDocument, DocumentId, DocumentKind};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed snapshot: {detail}")]
    Malformed { detail: String },
    #[error("unsupported snapshot schema version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },
}

impl DecodeError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
        }
    }
}

/// The storage-ready form of a document at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: u32,
    pub kind: DocumentKind,
    pub payload: Value,
    pub revision: u64,
}

impl Snapshot {
    /// Snapshot of a document that exists but has never been saved.
    pub fn empty(kind: DocumentKind) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            kind,
            payload: Value::Null,
            revision: 0,
        }
    }

    /// Parses stored bytes. Empty (or whitespace-only) input is the absent snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>, DecodeError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| DecodeError::malformed(format!("snapshot is not valid JSON: {err}")))?;
        Self::from_value(value).map(Some)
    }

    /// Validates the schema version before the rest of the structure, so snapshots written by a
    /// newer schema report `UnsupportedVersion` even when their layout changed.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let Value::Object(fields) = &value else {
            return Err(DecodeError::malformed("snapshot must be a JSON object"));
        };
        let version = fields
            .get("schemaVersion")
            .ok_or_else(|| DecodeError::malformed("missing field `schemaVersion`"))?
            .as_u64()
            .ok_or_else(|| {
                DecodeError::malformed("`schemaVersion` must be a non-negative integer")
            })?;
        check_schema_version(version)?;

        serde_json::from_value(value).map_err(|err| DecodeError::malformed(err.to_string()))
    }

    /// Canonical bytes: pretty JSON, keys in sorted order, trailing newline.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut fields = Map::new();
        fields.insert("schemaVersion".to_owned(), Value::from(self.schema_version));
        fields.insert("kind".to_owned(), Value::from(self.kind.as_str()));
        fields.insert("payload".to_owned(), self.payload.clone());
        fields.insert("revision".to_owned(), Value::from(self.revision));
        format!("{:#}\n", Value::Object(fields)).into_bytes()
    }

    /// Document id recorded in the payload, if any.
    pub fn document_id(&self) -> Option<DocumentId> {
        self.payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| DocumentId::new(id).ok())
    }

    /// Title recorded in the payload, if any.
    pub fn title(&self) -> Option<&str> {
        self.payload.get("title").and_then(Value::as_str)
    }
}

fn check_schema_version(version: u64) -> Result<(), DecodeError> {
    if version == 0 {
        return Err(DecodeError::malformed("`schemaVersion` must be at least 1"));
    }
    if version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(DecodeError::UnsupportedVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(())
}

/// A document type the codec can persist.
pub trait SnapshotCodec: Sized {
    const KIND: DocumentKind;

    /// The canonical empty document for `id` at `revision`.
    fn empty_at(id: DocumentId, revision: u64) -> Self;

    /// The canonical empty document for `id` (the never-saved state).
    fn empty(id: DocumentId) -> Self {
        Self::empty_at(id, 0)
    }

    fn revision(&self) -> u64;

    fn encode_payload(&self) -> Value;

    /// Decodes a non-null payload. Implementations must check that the payload id matches `id`.
    fn decode_payload(id: &DocumentId, payload: Value, revision: u64) -> Result<Self, DecodeError>;
}

pub fn encode<D: SnapshotCodec>(doc: &D) -> Snapshot {
    Snapshot {
        schema_version: CURRENT_SCHEMA_VERSION,
        kind: D::KIND,
        payload: doc.encode_payload(),
        revision: doc.revision(),
    }
}

/// Decodes `snapshot` into the document stored under `id`.
///
/// An absent snapshot, or one whose payload is `null`, yields the canonical empty document.
pub fn decode<D: SnapshotCodec>(
    id: &DocumentId,
    snapshot: Option<&Snapshot>,
) -> Result<D, DecodeError> {
    let Some(snapshot) = snapshot else {
        return Ok(D::empty(id.clone()));
    };

    check_schema_version(u64::from(snapshot.schema_version))?;
    if snapshot.kind != D::KIND {
        return Err(DecodeError::malformed(format!(
            "expected a {} snapshot, found {}",
            D::KIND,
            snapshot.kind
        )));
    }

    if snapshot.payload.is_null() {
        return Ok(D::empty_at(id.clone(), snapshot.revision));
    }

    D::decode_payload(id, snapshot.payload.clone(), snapshot.revision)
}

impl SnapshotCodec for CanvasDocument {
    const KIND: DocumentKind = DocumentKind::Canvas;

    fn empty_at(id: DocumentId, revision: u64) -> Self {
        let mut doc = CanvasDocument::new(id, "");
        doc.set_revision(revision);
        doc
    }

    fn revision(&self) -> u64 {
        CanvasDocument::revision(self)
    }

    fn encode_payload(&self) -> Value {
        payload::encode_canvas(self)
    }

    fn decode_payload(id: &DocumentId, payload: Value, revision: u64) -> Result<Self, DecodeError> {
        payload::decode_canvas(id, payload, revision)
    }
}

impl SnapshotCodec for BlockDocument {
    const KIND: DocumentKind = DocumentKind::Block;

    fn empty_at(id: DocumentId, revision: u64) -> Self {
        let mut doc = BlockDocument::new(id, "");
        doc.set_revision(revision);
        doc
    }

    fn revision(&self) -> u64 {
        BlockDocument::revision(self)
    }

    fn encode_payload(&self) -> Value {
        payload::encode_block(self)
    }

    fn decode_payload(id: &DocumentId, payload: Value, revision: u64) -> Result<Self, DecodeError> {
        payload::decode_block(id, payload, revision)
    }
}

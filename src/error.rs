// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Crate-wide error taxonomy.
//!
//! Module errors (`DecodeError`, `ApplyError`, `GatewayError`) convert into [`Error`]; callers
//! branch on [`Error::kind`]. `NotFound` on open and `Conflict` on save are the two kinds a caller
//! is expected to resolve (reload vs. overwrite); every other kind ends the session.

use std::fmt;

use crate::codec::DecodeError;
use crate::ops::ApplyError;
use crate::session::SessionState;
use crate::store::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Malformed,
    UnsupportedVersion,
    NotFound,
    Conflict,
    ReadOnlyViolation,
    CycleRejected,
    SaveInProgress,
    TransportFailure,
    InvalidMutation,
    InvalidState,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        Self::Malformed,
        Self::UnsupportedVersion,
        Self::NotFound,
        Self::Conflict,
        Self::ReadOnlyViolation,
        Self::CycleRejected,
        Self::SaveInProgress,
        Self::TransportFailure,
        Self::InvalidMutation,
        Self::InvalidState,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::UnsupportedVersion => "unsupported_version",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ReadOnlyViolation => "read_only_violation",
            Self::CycleRejected => "cycle_rejected",
            Self::SaveInProgress => "save_in_progress",
            Self::TransportFailure => "transport_failure",
            Self::InvalidMutation => "invalid_mutation",
            Self::InvalidState => "invalid_state",
        }
    }

    /// Message suitable for showing to the person editing the document.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Malformed => "This document could not be read because its saved data is damaged.",
            Self::UnsupportedVersion => {
                "This document was saved by a newer version and cannot be opened here."
            }
            Self::NotFound => "This document no longer exists. Reload to pick another one.",
            Self::Conflict => {
                "Someone saved this document since you opened it. Reload it, or overwrite their changes."
            }
            Self::ReadOnlyViolation => "This document is read-only and cannot be edited.",
            Self::CycleRejected => "A block cannot be moved inside itself.",
            Self::SaveInProgress => "A save is already running. Wait for it to finish.",
            Self::TransportFailure => "The document store could not be reached. Try again later.",
            Self::InvalidMutation => "That change does not fit the document and was not applied.",
            Self::InvalidState => "The document is not ready for that action yet.",
        }
    }

    /// Kinds the caller must explicitly resolve instead of treating as terminal.
    pub fn needs_caller_resolution(self) -> bool {
        matches!(self, Self::NotFound | Self::Conflict)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error("document not found: {id}")]
    NotFound { id: String },
    #[error("save conflict on {id}: expected revision {expected_revision}, store has {remote_revision}")]
    Conflict {
        id: String,
        expected_revision: u64,
        remote_revision: u64,
    },
    #[error("a save is already in flight for {id}")]
    SaveInProgress { id: String },
    #[error("transport failure: {message}")]
    TransportFailure { message: String },
    #[error("{operation} is not allowed while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(err) => err.kind(),
            Self::Apply(err) => err.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::SaveInProgress { .. } => ErrorKind::SaveInProgress,
            Self::TransportFailure { .. } => ErrorKind::TransportFailure,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }

    /// Revision the store reported when a save was rejected as a conflict.
    pub fn remote_revision(&self) -> Option<u64> {
        match self {
            Self::Conflict {
                remote_revision, ..
            } => Some(*remote_revision),
            _ => None,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl From<GatewayError> for Error {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { id } => Self::NotFound { id },
            GatewayError::Conflict {
                id,
                expected_revision,
                remote_revision,
            } => Self::Conflict {
                id,
                expected_revision,
                remote_revision,
            },
            GatewayError::Decode(err) => Self::Decode(err),
            GatewayError::Transport { message } => Self::TransportFailure { message },
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

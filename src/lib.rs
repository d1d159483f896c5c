// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Notemap: document state core for concept maps and block notes.
//!
//! Snapshots ([`codec`]), the two document models ([`model`], edited through [`ops`]), one-way
//! note-to-map conversion ([`convert`]) and a per-document [`session`] state machine over a
//! pluggable [`store::PersistenceGateway`].

pub mod codec;
pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod model;
pub mod ops;
pub mod render;
pub mod session;
pub mod store;

pub use error::{Error, ErrorKind, Result};

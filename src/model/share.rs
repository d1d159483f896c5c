// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use uuid::Uuid;

use super::ids::ShareId;

const SHARE_TOKEN_BYTES: usize = 8;

/// What a shared view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedArtifact {
    /// Reference to a rasterized image produced outside the core.
    Image { uri: String, format: String },
    /// Self-contained markup (SVG for maps, HTML for notes).
    Markup { media_type: String, content: String },
}

impl RenderedArtifact {
    pub fn svg(content: impl Into<String>) -> Self {
        Self::Markup {
            media_type: "image/svg+xml".to_owned(),
            content: content.into(),
        }
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::Markup {
            media_type: "text/html".to_owned(),
            content: content.into(),
        }
    }

    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Markup { content, .. } => Some(content),
            Self::Image { .. } => None,
        }
    }
}

/// Read-only projection of a document, issued once and never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedView {
    share_id: ShareId,
    title: String,
    artifact: RenderedArtifact,
}

impl SharedView {
    pub fn new(share_id: ShareId, title: impl Into<String>, artifact: RenderedArtifact) -> Self {
        Self {
            share_id,
            title: title.into(),
            artifact,
        }
    }

    pub fn share_id(&self) -> &ShareId {
        &self.share_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artifact(&self) -> &RenderedArtifact {
        &self.artifact
    }
}

/// Mints a URL-safe share token (8 random bytes, base64url, no padding).
pub fn new_share_id() -> ShareId {
    let random = Uuid::new_v4();
    let token = URL_SAFE_NO_PAD.encode(&random.as_bytes()[..SHARE_TOKEN_BYTES]);
    // base64url never yields '/', and the token is never empty.
    ShareId::new(token).unwrap_or_else(|_| ShareId::fresh())
}

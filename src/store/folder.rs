// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folder-backed gateway.
//!
//! Layout under the root:
//! - `documents/<id>.json`: the current snapshot of each live document
//! - `shares/<share id>.json`: issued shared views
//! - `deleted/<id>.json`: tombstones of soft-deleted documents
//!
//! Ids are encoded into Windows-safe file name segments. All writes go through a temp file plus
//! rename; `WriteDurability::Durable` additionally fsyncs the file and its directory.

use std::fmt::{self, Write as _};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::codec::{DecodeError, Snapshot};
use crate::model::{
    new_share_id, DocumentId, RenderedArtifact, ShareId, SharedView,
};
use crate::render::render_snapshot;

use super::{snapshot_document_id, DocumentSummary, GatewayError, PersistenceGateway};

const DOCUMENTS_DIR: &str = "documents";
const SHARES_DIR: &str = "shares";
const DELETED_DIR: &str = "deleted";
const JSON_EXT: &str = "json";
const TEMP_PREFIX: &str = ".notemap.tmp.";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Decode { path: PathBuf, source: DecodeError },
    SymlinkRefused { path: PathBuf },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Decode { path, source } => write!(f, "cannot decode {path:?}: {source}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::SymlinkRefused { .. } => None,
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Decode { source, .. } => GatewayError::Decode(source),
            other => GatewayError::transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SharedViewJson {
    share_id: String,
    document_id: String,
    title: String,
    artifact: ArtifactJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ArtifactJson {
    #[serde(rename_all = "camelCase")]
    Markup { media_type: String, content: String },
    Image { uri: String, format: String },
}

impl SharedViewJson {
    fn from_view(document_id: &DocumentId, view: &SharedView) -> Self {
        let artifact = match view.artifact() {
            RenderedArtifact::Markup {
                media_type,
                content,
            } => ArtifactJson::Markup {
                media_type: media_type.clone(),
                content: content.clone(),
            },
            RenderedArtifact::Image { uri, format } => ArtifactJson::Image {
                uri: uri.clone(),
                format: format.clone(),
            },
        };
        Self {
            share_id: view.share_id().to_string(),
            document_id: document_id.to_string(),
            title: view.title().to_owned(),
            artifact,
        }
    }

    fn into_view(self, path: &Path) -> Result<SharedView, StoreError> {
        let share_id = ShareId::new(self.share_id).map_err(|err| StoreError::Decode {
            path: path.to_path_buf(),
            source: DecodeError::malformed(format!("invalid share id: {err}")),
        })?;
        let artifact = match self.artifact {
            ArtifactJson::Markup {
                media_type,
                content,
            } => RenderedArtifact::Markup {
                media_type,
                content,
            },
            ArtifactJson::Image { uri, format } => RenderedArtifact::Image { uri, format },
        };
        Ok(SharedView::new(share_id, self.title, artifact))
    }
}

#[derive(Debug)]
struct FolderLayout {
    root: PathBuf,
    durability: WriteDurability,
}

/// Gateway storing one JSON snapshot per document below a root directory.
#[derive(Debug, Clone)]
pub struct FolderGateway {
    layout: Arc<FolderLayout>,
    // Serializes read-compare-write sequences within this process.
    write_lock: Arc<Mutex<()>>,
}

impl FolderGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: Arc::new(FolderLayout {
                root: root.into(),
                durability: WriteDurability::default(),
            }),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_durability(self, durability: WriteDurability) -> Self {
        Self {
            layout: Arc::new(FolderLayout {
                root: self.layout.root.clone(),
                durability,
            }),
            write_lock: self.write_lock,
        }
    }

    pub fn durability(&self) -> WriteDurability {
        self.layout.durability
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.layout.document_path(id)
    }

    /// Runs blocking file-system work off the async executor.
    async fn blocking<T, F>(&self, work: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&FolderLayout) -> Result<T, GatewayError> + Send + 'static,
    {
        let layout = Arc::clone(&self.layout);
        tokio::task::spawn_blocking(move || work(layout.as_ref()))
            .await
            .map_err(|err| GatewayError::transport(format!("store worker failed: {err}")))?
    }
}

impl FolderLayout {
    fn dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.dir(DOCUMENTS_DIR).join(file_name_for(id.as_str()))
    }

    fn tombstone_path(&self, id: &DocumentId) -> PathBuf {
        self.dir(DELETED_DIR).join(file_name_for(id.as_str()))
    }

    fn share_path(&self, share_id: &ShareId) -> PathBuf {
        self.dir(SHARES_DIR).join(file_name_for(share_id.as_str()))
    }

    /// `Ok(None)` when the file is missing, `Ok(Some(None))` when it is blank.
    fn read_snapshot(&self, path: &Path) -> Result<Option<Option<Snapshot>>, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Snapshot::from_bytes(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                path: path.to_path_buf(),
                source,
            })
    }

    fn load(&self, id: &DocumentId) -> Result<Option<Snapshot>, GatewayError> {
        self.read_snapshot(&self.document_path(id))?
            .ok_or_else(|| GatewayError::not_found(id))
    }

    fn write_snapshot(&self, id: &DocumentId, snapshot: &Snapshot) -> Result<(), StoreError> {
        write_atomic(&self.document_path(id), &snapshot.to_bytes(), self.durability)
    }

    fn shares_of(&self, id: &DocumentId) -> Result<Vec<(PathBuf, SharedViewJson)>, StoreError> {
        let mut found = Vec::new();
        for path in json_files(&self.dir(SHARES_DIR))? {
            let share = read_share_json(&path)?;
            if share.document_id == id.as_str() {
                found.push((path, share));
            }
        }
        Ok(found)
    }

    fn revoke_shares_of(&self, id: &DocumentId) -> Result<(), StoreError> {
        for (path, _) in self.shares_of(id)? {
            remove_file_if_exists(&path)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for FolderGateway {
    async fn load(&self, id: &DocumentId) -> Result<Option<Snapshot>, GatewayError> {
        let id = id.clone();
        self.blocking(move |layout| layout.load(&id)).await
    }

    async fn create(&self, mut initial: Snapshot) -> Result<DocumentId, GatewayError> {
        let id = snapshot_document_id(&initial)?;
        initial.revision = 0;

        let _guard = self.write_lock.lock().await;
        self.blocking(move |layout| {
            if let Some(existing) = layout.read_snapshot(&layout.document_path(&id))? {
                return Err(GatewayError::Conflict {
                    id: id.to_string(),
                    expected_revision: 0,
                    remote_revision: existing.map_or(0, |snapshot| snapshot.revision),
                });
            }
            layout.write_snapshot(&id, &initial)?;
            debug!(document_id = %id, path = ?layout.document_path(&id), "created document file");
            Ok(id)
        })
        .await
    }

    async fn update(
        &self,
        id: &DocumentId,
        mut snapshot: Snapshot,
        expected_revision: u64,
    ) -> Result<u64, GatewayError> {
        let id = id.clone();
        let _guard = self.write_lock.lock().await;
        self.blocking(move |layout| {
            let stored = layout.load(&id)?;
            if let Some(stored) = &stored {
                if stored.kind != snapshot.kind {
                    return Err(GatewayError::Decode(DecodeError::malformed(format!(
                        "cannot store a {} snapshot over a {} document",
                        snapshot.kind, stored.kind
                    ))));
                }
            }

            let remote_revision = stored.map_or(0, |stored| stored.revision);
            if remote_revision != expected_revision {
                return Err(GatewayError::Conflict {
                    id: id.to_string(),
                    expected_revision,
                    remote_revision,
                });
            }

            let new_revision = expected_revision + 1;
            snapshot.revision = new_revision;
            layout.write_snapshot(&id, &snapshot)?;
            Ok(new_revision)
        })
        .await
    }

    async fn get_shared(&self, share_id: &ShareId) -> Result<SharedView, GatewayError> {
        let share_id = share_id.clone();
        self.blocking(move |layout| {
            let path = layout.share_path(&share_id);
            if !path.exists() {
                return Err(GatewayError::not_found(&share_id));
            }
            Ok(read_share_json(&path)?.into_view(&path)?)
        })
        .await
    }

    async fn publish(&self, id: &DocumentId, regenerate: bool) -> Result<ShareId, GatewayError> {
        let id = id.clone();
        let _guard = self.write_lock.lock().await;
        self.blocking(move |layout| {
            let snapshot = layout.load(&id)?;

            let existing = layout.shares_of(&id)?;
            if let Some((path, share)) = existing.into_iter().next() {
                if !regenerate {
                    return Ok(share.into_view(&path)?.share_id().clone());
                }
                layout.revoke_shares_of(&id)?;
            }

            let Some(snapshot) = snapshot else {
                return Err(GatewayError::Decode(DecodeError::malformed(
                    "document has never been saved and cannot be shared",
                )));
            };
            let (title, artifact) = render_snapshot(&id, Some(&snapshot), snapshot.kind)?;
            let share_id = new_share_id();
            let view = SharedView::new(share_id.clone(), title, artifact);

            let path = layout.share_path(&share_id);
            let json = SharedViewJson::from_view(&id, &view);
            let text = serde_json::to_string_pretty(&json).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
            write_atomic(&path, format!("{text}\n").as_bytes(), layout.durability)?;
            Ok(share_id)
        })
        .await
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), GatewayError> {
        let id = id.clone();
        let _guard = self.write_lock.lock().await;
        self.blocking(move |layout| {
            let from = layout.document_path(&id);
            if !from.exists() {
                return Err(GatewayError::not_found(&id));
            }
            layout.revoke_shares_of(&id)?;

            let to = layout.tombstone_path(&id);
            create_dir(&layout.dir(DELETED_DIR))?;
            replace_file(&from, &to)?;
            debug!(document_id = %id, tombstone = ?to, "moved document to tombstones");
            Ok(())
        })
        .await
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError> {
        self.blocking(|layout| {
            let mut rows = Vec::new();
            for path in json_files(&layout.dir(DOCUMENTS_DIR))? {
                let Some(Some(snapshot)) = layout.read_snapshot(&path)? else {
                    debug!(path = ?path, "skipping never-saved document in listing");
                    continue;
                };
                let Some(id) = snapshot.document_id().or_else(|| id_from_file_name(&path)) else {
                    warn!(path = ?path, "skipping document file without a usable id");
                    continue;
                };
                rows.push(DocumentSummary {
                    id,
                    kind: snapshot.kind,
                    title: snapshot.title().unwrap_or_default().to_owned(),
                    revision: snapshot.revision,
                });
            }
            rows.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(rows)
        })
        .await
    }
}

fn read_share_json(path: &Path) -> Result<SharedViewJson, StoreError> {
    let bytes = fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// `*.json` files directly inside `dir`, sorted; a missing directory is empty.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(JSON_EXT) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn remove_file_if_exists(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn file_name_for(id: &str) -> String {
    format!("{}.{JSON_EXT}", file_stem_for(id))
}

fn id_from_file_name(path: &Path) -> Option<DocumentId> {
    let stem = path.file_stem()?.to_str()?;
    DocumentId::new(id_from_stem(stem)?).ok()
}

/// Ids that are not portable file names are stored as `~` followed by the hex of their bytes.
fn file_stem_for(id: &str) -> String {
    if is_portable_stem(id) {
        return id.to_owned();
    }
    let mut stem = String::with_capacity(1 + id.len() * 2);
    stem.push('~');
    for byte in id.bytes() {
        let _ = write!(stem, "{byte:02x}");
    }
    stem
}

fn id_from_stem(stem: &str) -> Option<String> {
    let Some(hex) = stem.strip_prefix('~') else {
        return Some(stem.to_owned());
    };
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }
    let bytes = hex
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

const RESERVED_STEMS: [&str; 4] = ["CON", "PRN", "AUX", "NUL"];

/// True when `id` can be used verbatim as a file stem on Windows, macOS and Linux.
fn is_portable_stem(id: &str) -> bool {
    if id.starts_with('~') || id.ends_with([' ', '.']) || matches!(id, "." | "..") {
        return false;
    }
    let device = id.split('.').next().unwrap_or(id).to_ascii_uppercase();
    let numbered_port = ["COM", "LPT"].iter().any(|prefix| {
        device
            .strip_prefix(prefix)
            .is_some_and(|digit| matches!(digit.as_bytes(), [b'1'..=b'9']))
    });
    if RESERVED_STEMS.contains(&device.as_str()) || numbered_port {
        return false;
    }
    !id.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch.is_ascii_control()
    })
}

fn create_dir(dir: &Path) -> Result<(), StoreError> {
    match fs::symlink_metadata(dir) {
        Ok(md) if md.file_type().is_symlink() => Err(StoreError::SymlinkRefused {
            path: dir.to_path_buf(),
        }),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(StoreError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Moves `from` over `to`. Windows refuses to rename onto an existing file, so the target is
/// removed first there.
fn replace_file(from: &Path, to: &Path) -> Result<(), StoreError> {
    let renamed = match fs::rename(from, to) {
        Err(err)
            if cfg!(windows)
                && matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
        {
            let _ = fs::remove_file(to);
            fs::rename(from, to)
        }
        other => other,
    };
    renamed.map_err(|source| StoreError::Io {
        path: to.to_path_buf(),
        source,
    })
}

fn write_atomic(
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    write_atomic_with(path, durability, |file| file.write_all(contents))
}

/// Fills a temp file next to `path` and renames it into place. The temp file is removed on
/// every failure.
fn write_atomic_with(
    path: &Path,
    durability: WriteDurability,
    fill: impl FnOnce(&mut fs::File) -> io::Result<()>,
) -> Result<(), StoreError> {
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent directory or file name"),
        });
    };
    create_dir(parent)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        "{TEMP_PREFIX}{}.{nanos}",
        file_name.to_string_lossy()
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let filled = fill(&mut file).and_then(|()| match durability {
        WriteDurability::Durable => file.sync_all(),
        WriteDurability::BestEffort => Ok(()),
    });
    drop(file);

    let placed = filled
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })
        .and_then(|()| replace_file(&tmp_path, path));
    if let Err(err) = placed {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir_synced = fs::File::open(parent).and_then(|dir| dir.sync_all());
            dir_synced.map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

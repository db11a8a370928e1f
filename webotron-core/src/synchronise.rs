//! Directory-to-bucket sync planning.
//!
//! A sync maps every regular file under a root directory to an object key equal to the file's
//! path relative to the root, joined with `/` whatever the host separator. This module resolves
//! the root and builds that mapping; [`crate::bucket::BucketManager::sync`] uploads it.
//!
//! # Traversal policy
//! - Directories are walked depth-first with an explicit stack, entries sorted by name.
//! - Symbolic links to files are uploaded under the link's own key; links to directories are
//!   skipped so cycles cannot occur.
//! - Dangling links, sockets, FIFOs, devices and non-UTF-8 names are skipped with a warning.
//! - An unreadable subdirectory is skipped with a warning; an unreadable root is an error.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// One local file and the key it is uploaded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub local_path: PathBuf,
    pub key: String,
}

/// An object written during a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: String,
}

/// Outcome of a completed sync, in upload order.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub root: PathBuf,
    pub bucket: String,
    pub uploaded: Vec<UploadedObject>,
}

enum EntryKind {
    Directory,
    File,
    Skip(&'static str),
}

/// Expand a leading `~` and canonicalise `path`, which must be an existing directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path);
    let root = fs::canonicalize(&expanded).map_err(|e| Error::InvalidRoot {
        path: expanded.clone(),
        reason: e.to_string(),
    })?;
    if !root.is_dir() {
        return Err(Error::InvalidRoot {
            path: root,
            reason: "not a directory".to_string(),
        });
    }
    debug!(root = %root.display(), "Resolved sync root");
    Ok(root)
}

/// Replace a leading `~` component with the user's home directory, when one is known.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first.to_str() == Some("~") => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Object key for `path` under `root`, or `None` if it is not below `root` or is not UTF-8.
pub fn key_for(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// List every uploadable file under `root` together with its key.
pub fn plan_sync(root: &Path) -> Result<Vec<SyncEntry>> {
    let mut entries = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let listing = match read_sorted(&dir) {
            Ok(listing) => listing,
            Err(source) if dir == root => {
                return Err(Error::Walk { path: dir, source });
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for path in listing {
            match classify(&path) {
                EntryKind::Directory => subdirs.push(path),
                EntryKind::File => match key_for(root, &path) {
                    Some(key) => {
                        debug!(path = %path.display(), key = %key, "Planned upload");
                        entries.push(SyncEntry {
                            local_path: path,
                            key,
                        });
                    }
                    None => warn!(path = %path.display(), "Skipping file without a UTF-8 key"),
                },
                EntryKind::Skip(reason) => {
                    warn!(path = %path.display(), reason, "Skipping entry");
                }
            }
        }
        // Reversed so the alphabetically first subdirectory is popped next.
        pending.extend(subdirs.into_iter().rev());
    }

    info!(root = %root.display(), files = entries.len(), "Sync plan complete");
    Ok(entries)
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

fn classify(path: &Path) -> EntryKind {
    let file_type = match fs::symlink_metadata(path) {
        Ok(meta) => meta.file_type(),
        Err(_) => return EntryKind::Skip("metadata unavailable"),
    };
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        match fs::metadata(path) {
            Ok(target) if target.is_file() => EntryKind::File,
            Ok(target) if target.is_dir() => EntryKind::Skip("symbolic link to a directory"),
            Ok(_) => EntryKind::Skip("symbolic link to a special file"),
            Err(_) => EntryKind::Skip("dangling symbolic link"),
        }
    } else {
        EntryKind::Skip("special file")
    }
}

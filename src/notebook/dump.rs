//! Compiled-text persistence for debugger consumption.
//!
//! Debug adapters can only read real files, so each cell's compiled text is
//! written out ("dumped") the first time the adapter needs it. The store keeps
//! both directions of the association: cell identity to dump path when a
//! message heads to the adapter, dump path back to cell identity when the
//! adapter reports locations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use path_clean::PathClean;
use tempfile::TempDir;
use url::Url;

use crate::error::BridgeResult;
use crate::notebook::cell::NotebookCell;

/// Filename prefix for dump files.
///
/// Distinctive enough that stray files in the dump directory are never
/// mistaken for cell dumps.
const DUMP_FILE_PREFIX: &str = "celldap-dump-";

enum DumpDir {
    /// Owned temporary directory, removed on drop.
    Temp(TempDir),
    /// Caller-provided directory, left in place.
    Fixed(PathBuf),
}

impl DumpDir {
    fn path(&self) -> &Path {
        match self {
            DumpDir::Temp(dir) => dir.path(),
            DumpDir::Fixed(path) => path,
        }
    }
}

/// Writes compiled cell text to disk and indexes the resulting paths.
pub struct DumpStore {
    dir: DumpDir,
    by_cell: DashMap<Url, PathBuf>,
    by_path: DashMap<PathBuf, Url>,
    next_seq: AtomicU64,
}

impl DumpStore {
    /// Create a store backed by a fresh temporary directory.
    pub fn new() -> BridgeResult<Self> {
        let dir = TempDir::with_prefix("celldap-")?;
        Ok(Self::with_dir(DumpDir::Temp(dir)))
    }

    /// Create a store writing into `dir`, which is created if missing and
    /// never removed by the store.
    pub fn in_dir(dir: impl Into<PathBuf>) -> BridgeResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self::with_dir(DumpDir::Fixed(dir)))
    }

    fn with_dir(dir: DumpDir) -> Self {
        Self {
            dir,
            by_cell: DashMap::new(),
            by_path: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Debugger-readable path of `cell`'s compiled text, writing the dump on
    /// first use. `None` when the write fails; the caller then forwards the
    /// original reference untouched.
    pub fn physical_path(&self, cell: &NotebookCell) -> Option<PathBuf> {
        if let Some(existing) = self.by_cell.get(cell.identity()) {
            return Some(existing.value().clone());
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let filename = format!(
            "{DUMP_FILE_PREFIX}{seq}-{}.{}",
            dump_slug(cell),
            cell.dump_extension()
        );
        let path = self.dir.path().join(filename).clean();

        match fs::write(&path, cell.compiled_text()) {
            Ok(()) => {
                // Concurrent dumps of the same cell both write identical
                // content; last insert wins and the duplicate file is inert.
                self.by_cell.insert(cell.identity().clone(), path.clone());
                self.by_path.insert(path.clone(), cell.identity().clone());
                log::debug!("dumped {} to {}", cell.identity(), path.display());
                Some(path)
            }
            Err(err) => {
                log::warn!("failed to dump {}: {err}", cell.identity());
                None
            }
        }
    }

    /// Identity of the cell a dump path belongs to, if the path is one of
    /// ours.
    pub fn cell_for_path(&self, path: &str) -> Option<Url> {
        let key = Path::new(path).clean();
        self.by_path.get(&key).map(|entry| entry.value().clone())
    }

    /// Drop the indexes for `identity` and delete its dump file, if any.
    pub fn forget(&self, identity: &Url) {
        if let Some((_, path)) = self.by_cell.remove(identity) {
            self.by_path.remove(&path);
            if let Err(err) = fs::remove_file(&path) {
                log::debug!("could not remove dump {}: {err}", path.display());
            }
        }
    }

    /// Drop all indexes and dump files.
    pub fn clear(&self) {
        let identities: Vec<Url> = self.by_cell.iter().map(|e| e.key().clone()).collect();
        for identity in identities {
            self.forget(&identity);
        }
    }
}

/// Filename fragment identifying the cell: its URI fragment when present,
/// otherwise its ordinal. Restricted to filesystem-safe characters.
fn dump_slug(cell: &NotebookCell) -> String {
    let raw = match cell.identity().fragment() {
        Some(fragment) if !fragment.is_empty() => fragment.to_string(),
        _ => match cell.ordinal() {
            Some(ordinal) => format!("cell{ordinal}"),
            None => "cell".to_string(),
        },
    };
    raw.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect()
}

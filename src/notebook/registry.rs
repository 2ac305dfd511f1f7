//! Cell registry: identity resolution and per-cell source maps.
//!
//! The registry is the concrete collaborator behind the rewriting core's
//! three lookup traits. Entries are owned explicitly: the host registers a
//! cell when it compiles, marks it closed when the user deletes it, and
//! removes it on session teardown. A closed cell keeps its entry so inbound
//! references to its dump resolve to "dead cell, suppress" instead of
//! falling through to a foreign-path pass-through with a misleading name.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use url::Url;

use crate::error::BridgeResult;
use crate::notebook::cell::NotebookCell;
use crate::notebook::dump::DumpStore;
use crate::rewrite::{CellResolver, CompiledTextStore, SourceMapProvider};
use crate::sourcemap::SourceMap;

pub struct CellRegistry {
    cells: DashMap<Url, Arc<NotebookCell>>,
    maps: DashMap<Url, Arc<SourceMap>>,
    dumps: DumpStore,
}

impl CellRegistry {
    /// Registry dumping compiled text into a fresh temporary directory.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self::with_dumps(DumpStore::new()?))
    }

    /// Registry dumping compiled text into `dir`.
    pub fn with_dump_dir(dir: impl Into<PathBuf>) -> BridgeResult<Self> {
        Ok(Self::with_dumps(DumpStore::in_dir(dir)?))
    }

    fn with_dumps(dumps: DumpStore) -> Self {
        Self {
            cells: DashMap::new(),
            maps: DashMap::new(),
            dumps,
        }
    }

    /// Register a compiled cell. Re-registering an identity replaces the
    /// previous entry and drops its stale dump and source map.
    pub fn insert(&self, cell: NotebookCell) -> Arc<NotebookCell> {
        let cell = Arc::new(cell);
        let identity = cell.identity().clone();
        if self.cells.insert(identity.clone(), cell.clone()).is_some() {
            self.maps.remove(&identity);
            self.dumps.forget(&identity);
        }
        cell
    }

    /// Attach (or replace) the source map for a registered cell.
    pub fn attach_source_map(&self, identity: &Url, map: SourceMap) {
        self.maps.insert(identity.clone(), Arc::new(map));
    }

    pub fn get(&self, identity: &Url) -> Option<Arc<NotebookCell>> {
        self.cells.get(identity).map(|entry| entry.value().clone())
    }

    /// Mark a cell dead, keeping its entry for inbound suppression.
    pub fn close(&self, identity: &Url) {
        if let Some(cell) = self.cells.get(identity) {
            cell.close();
        }
    }

    /// Purge a cell entirely: identity, source map, and dump.
    pub fn remove(&self, identity: &Url) {
        self.cells.remove(identity);
        self.maps.remove(identity);
        self.dumps.forget(identity);
    }

    /// Purge everything. Called from session teardown.
    pub fn clear(&self) {
        self.cells.clear();
        self.maps.clear();
        self.dumps.clear();
    }

    pub fn dump_dir(&self) -> &std::path::Path {
        self.dumps.dir()
    }
}

impl CellResolver for CellRegistry {
    fn by_identity(&self, identity: &Url) -> Option<Arc<NotebookCell>> {
        self.get(identity)
    }

    fn by_dump_path(&self, path: &str) -> Option<Arc<NotebookCell>> {
        let identity = self.dumps.cell_for_path(path)?;
        self.get(&identity)
    }
}

impl CompiledTextStore for CellRegistry {
    fn physical_path(&self, cell: &NotebookCell) -> Option<PathBuf> {
        self.dumps.physical_path(cell)
    }
}

impl SourceMapProvider for CellRegistry {
    fn source_map(&self, cell: &NotebookCell) -> Option<Arc<SourceMap>> {
        self.maps.get(cell.identity()).map(|entry| entry.value().clone())
    }
}

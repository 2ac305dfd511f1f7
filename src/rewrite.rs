//! Message rewriting core.
//!
//! Every DAP message crossing the bridge passes through [`MessageRewriter`]:
//! the visitor decides which fields of the message carry source references or
//! locations, the source translator swaps cell identities for dump paths (and
//! back), and the location remapper converts line/column pairs through the
//! cell's source map. All lookups are fail-open: anything unrecognized or
//! unresolvable is forwarded exactly as it arrived, because a stale location
//! is recoverable while a corrupted message can kill the session.

pub mod location;
pub mod source;
pub mod visitor;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::notebook::cell::{CELL_URI_SCHEME, NotebookCell};
use crate::sourcemap::{MapKind, SourceMap};

/// Which way a message is crossing the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Editor to debug adapter: cell coordinates become dump coordinates.
    ToAdapter,
    /// Debug adapter to editor: dump coordinates become cell coordinates.
    ToEditor,
}

impl Direction {
    /// The directional half of a source map this flow consults.
    pub(crate) fn map_kind(self) -> MapKind {
        match self {
            Direction::ToAdapter => MapKind::OriginalToGenerated,
            Direction::ToEditor => MapKind::GeneratedToOriginal,
        }
    }
}

/// Resolves cell identities, in both the forms they appear on the wire.
pub trait CellResolver: Send + Sync {
    fn by_identity(&self, identity: &Url) -> Option<Arc<NotebookCell>>;
    fn by_dump_path(&self, path: &str) -> Option<Arc<NotebookCell>>;
}

/// Ensures a cell's compiled text exists at a debugger-readable path.
pub trait CompiledTextStore: Send + Sync {
    fn physical_path(&self, cell: &NotebookCell) -> Option<PathBuf>;
}

/// Supplies the current mapping table for a cell, if one exists.
pub trait SourceMapProvider: Send + Sync {
    fn source_map(&self, cell: &NotebookCell) -> Option<Arc<SourceMap>>;
}

/// Rewrites protocol messages in place for a given [`Direction`].
pub struct MessageRewriter {
    cells: Arc<dyn CellResolver>,
    store: Arc<dyn CompiledTextStore>,
    maps: Arc<dyn SourceMapProvider>,
}

impl MessageRewriter {
    pub fn new(
        cells: Arc<dyn CellResolver>,
        store: Arc<dyn CompiledTextStore>,
        maps: Arc<dyn SourceMapProvider>,
    ) -> Self {
        Self { cells, store, maps }
    }

    /// Rewrite `message` in place. Messages whose shape is not in the visitor
    /// allow-list pass through untouched.
    pub fn rewrite(&self, message: &mut Value, direction: Direction) {
        visitor::rewrite(self, message, direction);
    }

    /// Resolve the cell a `source.path` refers to, interpreting the path in
    /// the coordinate space the direction implies: outbound paths are cell
    /// URIs, inbound paths are dump files.
    fn resolve_cell(&self, source_path: &str, direction: Direction) -> Option<Arc<NotebookCell>> {
        match direction {
            Direction::ToAdapter => {
                let identity = Url::parse(source_path).ok()?;
                if identity.scheme() != CELL_URI_SCHEME {
                    return None;
                }
                self.cells.by_identity(&identity)
            }
            Direction::ToEditor => self.cells.by_dump_path(source_path),
        }
    }
}

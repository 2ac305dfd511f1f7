//! Source reference translation between cell identity and dump path.

use serde_json::{Map, Value};
use url::Url;

use super::{Direction, MessageRewriter};
use crate::notebook::cell::CELL_URI_SCHEME;

impl MessageRewriter {
    /// Rewrite a `source` object's `path` in place; inbound, the `name` is
    /// replaced with the cell's display label as well.
    ///
    /// Every failure mode (missing path, foreign scheme, unknown cell, dead
    /// cell, failed dump) leaves the object exactly as it arrived.
    pub(crate) fn translate_source(&self, source: &mut Map<String, Value>, direction: Direction) {
        let Some(path) = source.get("path").and_then(Value::as_str) else {
            return;
        };

        match direction {
            Direction::ToAdapter => {
                if let Some(dump) = self.cell_to_dump_path(path) {
                    source.insert("path".to_string(), Value::String(dump));
                }
            }
            Direction::ToEditor => {
                if let Some((identity, name)) = self.dump_path_to_cell(path) {
                    source.insert("path".to_string(), Value::String(identity));
                    source.insert("name".to_string(), Value::String(name));
                }
            }
        }
    }

    /// Cell URI to dump path. Only the `notebook-cell` scheme is ours; any
    /// other scheme or a parse failure means the path belongs to someone
    /// else.
    fn cell_to_dump_path(&self, path: &str) -> Option<String> {
        let identity = Url::parse(path).ok()?;
        if identity.scheme() != CELL_URI_SCHEME {
            return None;
        }
        let cell = self.cells.by_identity(&identity)?;
        let dump = self.store.physical_path(&cell)?;
        Some(dump.to_string_lossy().into_owned())
    }

    /// Dump path back to `(cell identity, display name)`. Dead cells are
    /// suppressed: the editor must not be pointed at a cell that no longer
    /// exists.
    fn dump_path_to_cell(&self, path: &str) -> Option<(String, String)> {
        let cell = self.cells.by_dump_path(path)?;
        if !cell.is_live() {
            return None;
        }
        Some((cell.identity().to_string(), cell.display_name()))
    }
}

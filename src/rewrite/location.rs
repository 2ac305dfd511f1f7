//! In-place remapping of `line`/`column` fields through a cell's source map.

use serde_json::{Map, Value};

use super::{Direction, MessageRewriter};
use crate::sourcemap::{MapKind, SourceMap};

impl MessageRewriter {
    /// Remap the `line`/`column` of each location object in `locations`.
    ///
    /// `source_path` names the owning cell in the coordinate space the
    /// direction implies. No resolvable cell, or no source map attached to
    /// it, makes the whole group a no-op; individual locations without a
    /// usable line, or whose line has no mapping entry, are skipped.
    pub(crate) fn remap_locations<'a, I>(
        &self,
        locations: I,
        source_path: &str,
        direction: Direction,
    ) where
        I: IntoIterator<Item = &'a mut Map<String, Value>>,
    {
        let Some(cell) = self.resolve_cell(source_path, direction) else {
            return;
        };
        let Some(map) = self.maps.source_map(&cell) else {
            return;
        };

        let kind = direction.map_kind();
        for location in locations {
            remap_one(&map, kind, location);
        }
    }
}

fn remap_one(map: &SourceMap, kind: MapKind, location: &mut Map<String, Value>) {
    let Some(line) = read_coord(location.get("line")) else {
        return;
    };
    let column = read_coord(location.get("column"));

    let Some(target) = map.lookup(kind, line, column) else {
        return;
    };
    location.insert("line".to_string(), Value::from(target.line));
    location.insert("column".to_string(), Value::from(target.column));
}

/// DAP coordinates are non-negative integers; anything else is treated as
/// absent.
fn read_coord(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .and_then(|raw| u32::try_from(raw).ok())
}

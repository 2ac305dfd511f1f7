//! Bidirectional line/column mapping between a cell's original text and its
//! compiled dump.
//!
//! A [`SourceMap`] is built once per compilation by whoever drives the
//! compiler (see [`SourceMapBuilder`]) and is only read afterwards. Lookups
//! memoize their result in a per-map cache; the cache is an optimization and
//! clearing it never changes what a lookup returns, only what it costs.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single line/column coordinate pair.
///
/// Lines and columns use the DAP convention: non-negative, lines 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Which directional half of a [`SourceMap`] a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// Dump coordinates to cell coordinates.
    GeneratedToOriginal,
    /// Cell coordinates to dump coordinates.
    OriginalToGenerated,
}

/// Line-indexed table; each line holds a column-indexed sub-map of targets.
type LineTable = BTreeMap<u32, BTreeMap<u32, LineCol>>;

/// Cache keys carry the map kind so an asymmetric table can never serve a
/// result recorded for the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: MapKind,
    line: u32,
    column: Option<u32>,
}

/// Bidirectional line/column correspondence for one cell.
#[derive(Debug, Default)]
pub struct SourceMap {
    generated_to_original: LineTable,
    original_to_generated: LineTable,
    cache: Mutex<HashMap<CacheKey, LineCol>>,
}

impl SourceMap {
    pub fn builder() -> SourceMapBuilder {
        SourceMapBuilder::default()
    }

    /// Resolve `(line, column)` to its counterpart in the other coordinate
    /// space.
    ///
    /// When no exact column entry exists for the line, falls back to the
    /// entry at column 0, then to the entry at the lowest recorded column.
    /// Debuggers routinely ask about positions between recorded mapping
    /// points (mid-statement), so the fallback approximates "start of this
    /// line" instead of refusing the lookup. `None` means no entry is
    /// recorded for the line at all; callers leave the location untouched.
    pub fn lookup(&self, kind: MapKind, line: u32, column: Option<u32>) -> Option<LineCol> {
        let key = CacheKey { kind, line, column };
        if let Some(hit) = self.cache_lock().get(&key) {
            return Some(*hit);
        }

        let table = match kind {
            MapKind::GeneratedToOriginal => &self.generated_to_original,
            MapKind::OriginalToGenerated => &self.original_to_generated,
        };
        let columns = table.get(&line)?;
        let target = column
            .and_then(|col| columns.get(&col))
            .or_else(|| columns.get(&0))
            .or_else(|| columns.values().next())
            .copied()?;

        self.cache_lock().insert(key, target);
        Some(target)
    }

    /// Whether a result for `(line, column)` is already memoized.
    pub fn is_cached(&self, kind: MapKind, line: u32, column: Option<u32>) -> bool {
        self.cache_lock().contains_key(&CacheKey { kind, line, column })
    }

    /// Drop all memoized results.
    pub fn clear_cache(&self) {
        self.cache_lock().clear();
    }

    fn cache_lock(&self) -> MutexGuard<'_, HashMap<CacheKey, LineCol>> {
        // A poisoned cache only ever holds idempotent lookup results, so
        // recover the guard instead of propagating the panic.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Accumulates original/generated correspondences and produces a [`SourceMap`].
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    generated_to_original: LineTable,
    original_to_generated: LineTable,
}

impl SourceMapBuilder {
    /// Record that `original` in the cell corresponds to `generated` in the
    /// compiled dump.
    pub fn entry(mut self, original: LineCol, generated: LineCol) -> Self {
        self.original_to_generated
            .entry(original.line)
            .or_default()
            .insert(original.column, generated);
        self.generated_to_original
            .entry(generated.line)
            .or_default()
            .insert(generated.column, original);
        self
    }

    pub fn build(self) -> SourceMap {
        SourceMap {
            generated_to_original: self.generated_to_original,
            original_to_generated: self.original_to_generated,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

pub mod config;
pub mod dap;
pub mod error;
pub mod notebook;
pub mod rewrite;
pub mod session;
pub mod sourcemap;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use notebook::{CellRegistry, NotebookCell, cell_uri, is_cell_uri};
pub use rewrite::{CellResolver, CompiledTextStore, Direction, MessageRewriter, SourceMapProvider};
pub use session::DebugBridge;
pub use sourcemap::{LineCol, MapKind, SourceMap, SourceMapBuilder};

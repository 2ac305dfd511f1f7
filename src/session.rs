//! Session glue tying a cell registry to the message rewriter.

use std::sync::Arc;

use serde_json::Value;

use crate::error::BridgeResult;
use crate::notebook::CellRegistry;
use crate::rewrite::{Direction, MessageRewriter};

/// One debug session's view of the bridge: a registry of the session's cells
/// and the rewriter that runs every message through it.
///
/// Processing is synchronous and message-at-a-time; callers must feed
/// messages in arrival order per direction, which the proxy loops do by
/// construction.
pub struct DebugBridge {
    registry: Arc<CellRegistry>,
    rewriter: MessageRewriter,
}

impl DebugBridge {
    pub fn new() -> BridgeResult<Self> {
        Ok(Self::with_registry(CellRegistry::new()?))
    }

    pub fn with_registry(registry: CellRegistry) -> Self {
        let registry = Arc::new(registry);
        let rewriter = MessageRewriter::new(registry.clone(), registry.clone(), registry.clone());
        Self { registry, rewriter }
    }

    /// The session's cell registry, for hosts to populate and tear down.
    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    /// Rewrite a message heading to the debug adapter. Returns the message
    /// for chaining.
    pub fn rewrite_outbound<'a>(&self, message: &'a mut Value) -> &'a mut Value {
        self.rewriter.rewrite(message, Direction::ToAdapter);
        message
    }

    /// Rewrite a message heading back to the editor. Returns the message for
    /// chaining.
    pub fn rewrite_inbound<'a>(&self, message: &'a mut Value) -> &'a mut Value {
        self.rewriter.rewrite(message, Direction::ToEditor);
        message
    }

    /// Tear down the session's cell state, deleting dumps.
    pub fn shutdown(&self) {
        self.registry.clear();
    }
}

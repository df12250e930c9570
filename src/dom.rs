//! Host-document collaborators.
//!
//! The engine never touches a real document. Element lookup, overlay
//! nodes, tooltip views, and the session flag store all go through these
//! contracts; hosts adapt them to whatever surface they draw on. The
//! in-memory fakes used by this crate's own tests live in
//! [`crate::testing`].

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::TooltipConfig;

/// Opaque handle the host assigns to document nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Document query and overlay surface.
pub trait Dom: Send + Sync {
    /// First element matching `selector`, if any.
    fn resolve(&self, selector: &str) -> Option<NodeId>;

    /// Mount an overlay node covering `target` and return it. The overlay
    /// is the anchor tooltips attach to; making the target's geometry
    /// meaningful (positioning, stacking) is the host's concern.
    fn mount_overlay(&self, target: NodeId) -> NodeId;

    /// Remove a node previously returned by [`Dom::mount_overlay`].
    fn remove_node(&self, node: NodeId);
}

/// One tooltip view bound to an overlay anchor.
pub trait Tooltip: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Builds tooltip views against overlay anchors.
pub trait TooltipRenderer: Send + Sync {
    /// Build a tooltip bound to `anchor` with the given display options
    /// and message text. The view starts hidden.
    fn create(&self, anchor: NodeId, config: &TooltipConfig, message: &str) -> Box<dyn Tooltip>;
}

/// Session-scoped string flags. "Session" means whatever lifetime the
/// host gives it; a browser host would back this with session storage.
pub trait SessionStore: Send + Sync {
    /// Read a flag. `None` means the flag was never written.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a flag, replacing any previous value.
    fn set(&self, key: &str, value: &str);
}

/// Process-lifetime [`SessionStore`] for hosts without one of their own.
/// A "session" then lasts as long as the process does.
#[derive(Default)]
pub struct MemorySessionStore {
    flags: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.flags
            .lock()
            .expect("session store mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.flags
            .lock()
            .expect("session store mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

//! In-memory fakes for driving a tour without a real document.
//!
//! [`FakeDom`] serves selector lookups from a fixed map and keeps books on
//! overlay mounts and removals; [`RecordingTooltips`] records every show
//! and hide by message. Both back this crate's own test suites and are
//! public so hosts can exercise tours headlessly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::TooltipConfig;
use crate::dom::{Dom, NodeId, Tooltip, TooltipRenderer};

/// [`Dom`] fake backed by a selector map.
#[derive(Default)]
pub struct FakeDom {
    elements: Mutex<HashMap<String, NodeId>>,
    next_node: AtomicU64,
    mounted: Mutex<Vec<NodeId>>,
    removed: Mutex<Vec<NodeId>>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolvable element and return its node.
    pub fn insert(&self, selector: &str) -> NodeId {
        let node = self.alloc();
        self.elements
            .lock()
            .expect("fake dom mutex poisoned")
            .insert(selector.to_string(), node);
        node
    }

    /// Every overlay mounted so far, in mount order.
    pub fn mounted(&self) -> Vec<NodeId> {
        self.mounted.lock().expect("fake dom mutex poisoned").clone()
    }

    /// Every node removed so far, in removal order.
    pub fn removed(&self) -> Vec<NodeId> {
        self.removed.lock().expect("fake dom mutex poisoned").clone()
    }

    /// Overlays mounted and not yet removed.
    pub fn live_overlays(&self) -> Vec<NodeId> {
        let removed = self.removed();
        self.mounted()
            .into_iter()
            .filter(|node| !removed.contains(node))
            .collect()
    }

    fn alloc(&self) -> NodeId {
        NodeId(self.next_node.fetch_add(1, Ordering::SeqCst))
    }
}

impl Dom for FakeDom {
    fn resolve(&self, selector: &str) -> Option<NodeId> {
        self.elements
            .lock()
            .expect("fake dom mutex poisoned")
            .get(selector)
            .copied()
    }

    fn mount_overlay(&self, _target: NodeId) -> NodeId {
        let node = self.alloc();
        self.mounted
            .lock()
            .expect("fake dom mutex poisoned")
            .push(node);
        node
    }

    fn remove_node(&self, node: NodeId) {
        self.removed
            .lock()
            .expect("fake dom mutex poisoned")
            .push(node);
    }
}

/// One recorded tooltip call, tagged with the tooltip's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipEvent {
    Shown(String),
    Hidden(String),
}

/// [`TooltipRenderer`] fake that records every show and hide.
#[derive(Default)]
pub struct RecordingTooltips {
    log: Arc<Mutex<Vec<TooltipEvent>>>,
}

impl RecordingTooltips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every show/hide recorded so far, in call order.
    pub fn events(&self) -> Vec<TooltipEvent> {
        self.log.lock().expect("tooltip log mutex poisoned").clone()
    }

    /// How many times the tooltip carrying `message` was shown.
    pub fn shown_count(&self, message: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, TooltipEvent::Shown(m) if m == message))
            .count()
    }

    /// How many times the tooltip carrying `message` was hidden.
    pub fn hidden_count(&self, message: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, TooltipEvent::Hidden(m) if m == message))
            .count()
    }
}

impl TooltipRenderer for RecordingTooltips {
    fn create(&self, _anchor: NodeId, _config: &TooltipConfig, message: &str) -> Box<dyn Tooltip> {
        Box::new(RecordingTooltip {
            message: message.to_string(),
            log: self.log.clone(),
        })
    }
}

struct RecordingTooltip {
    message: String,
    log: Arc<Mutex<Vec<TooltipEvent>>>,
}

impl Tooltip for RecordingTooltip {
    fn show(&self) {
        self.log
            .lock()
            .expect("tooltip log mutex poisoned")
            .push(TooltipEvent::Shown(self.message.clone()));
    }

    fn hide(&self) {
        self.log
            .lock()
            .expect("tooltip log mutex poisoned")
            .push(TooltipEvent::Hidden(self.message.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_dom_resolves_only_inserted_selectors() {
        let dom = FakeDom::new();
        let node = dom.insert(".welcome");

        assert_eq!(dom.resolve(".welcome"), Some(node));
        assert_eq!(dom.resolve(".missing"), None);
    }

    #[test]
    fn fake_dom_tracks_overlay_lifecycle() {
        let dom = FakeDom::new();
        let target = dom.insert(".welcome");

        let overlay = dom.mount_overlay(target);
        assert_eq!(dom.live_overlays(), vec![overlay]);

        dom.remove_node(overlay);
        assert!(dom.live_overlays().is_empty());
        assert_eq!(dom.removed(), vec![overlay]);
    }

    #[test]
    fn recording_tooltips_count_by_message() {
        let tooltips = RecordingTooltips::new();
        let view = tooltips.create(NodeId(1), &TooltipConfig::default(), "Hello");

        view.show();
        view.hide();
        view.show();

        assert_eq!(tooltips.shown_count("Hello"), 2);
        assert_eq!(tooltips.hidden_count("Hello"), 1);
        assert_eq!(tooltips.shown_count("Other"), 0);
    }
}

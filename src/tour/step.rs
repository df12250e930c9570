//! Step state machine — event-chain listening and the show/hide lifecycle.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{EventBinding, StepOptions, TooltipConfig, TourSettings};
use crate::dom::{Dom, NodeId, Tooltip, TooltipRenderer};
use crate::signal::{SignalBus, SignalScope};

/// Unique step identifier. Tags the step's finished-signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(Uuid);

impl StepId {
    pub(crate) fn new() -> StepId {
        StepId(Uuid::new_v4())
    }

    /// Name of the document-scoped signal emitted when this step hides.
    pub fn finished_signal(&self) -> String {
        format!("finished:step-{}", self.0)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility state of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Not visible. The initial state, and again after auto-hide.
    Hidden,
    /// Tooltip visible, auto-hide timer armed.
    Shown,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepState::Hidden => write!(f, "hidden"),
            StepState::Shown => write!(f, "shown"),
        }
    }
}

/// A recorded visibility change.
#[derive(Debug, Clone, Serialize)]
pub struct StepTransition {
    pub from: StepState,
    pub to: StepState,
    pub at: DateTime<Utc>,
}

/// One callout bound to one target element.
///
/// Steps are built by [`Tour`](crate::tour::tour::Tour) at construction
/// time. A step listens for its event chain, shows its tooltip when the
/// chain completes, and hides again when the tour timeout elapses,
/// announcing the hide with its finished-signal. A step whose selector
/// matches nothing is inert: it keeps its place in the sequence but has
/// no listener capability, so it never shows and never announces.
pub struct Step {
    id: StepId,
    previous_id: Option<StepId>,
    selector: String,
    message: String,
    tooltip_config: TooltipConfig,
    settings: Arc<TourSettings>,
    dom: Arc<dyn Dom>,
    tooltips: Arc<dyn TooltipRenderer>,
    bus: Arc<dyn SignalBus>,
    target: Option<NodeId>,
    overlay: Mutex<Option<NodeId>>,
    tooltip: Mutex<Option<Box<dyn Tooltip>>>,
    chain: Mutex<VecDeque<EventBinding>>,
    state: Mutex<StepState>,
    transitions: Mutex<Vec<StepTransition>>,
    next: OnceLock<Weak<Step>>,
    me: Weak<Step>,
}

impl Step {
    pub(crate) fn new(
        options: StepOptions,
        previous_id: Option<StepId>,
        settings: Arc<TourSettings>,
        dom: Arc<dyn Dom>,
        tooltips: Arc<dyn TooltipRenderer>,
        bus: Arc<dyn SignalBus>,
    ) -> Arc<Step> {
        let id = StepId::new();
        let target = dom.resolve(&options.bound_to);
        if target.is_none() {
            warn!(
                step = %id,
                selector = %options.bound_to,
                "no element matches the step selector; step will never show"
            );
        }
        let overlay = target.map(|node| dom.mount_overlay(node));
        let tooltip_config = match &options.tooltip {
            Some(overrides) => settings.tooltip.merged(overrides),
            None => settings.tooltip.clone(),
        };

        let step = Arc::new_cyclic(|me| Step {
            id,
            previous_id,
            selector: options.bound_to,
            message: options.message,
            tooltip_config,
            settings,
            dom,
            tooltips,
            bus,
            target,
            overlay: Mutex::new(overlay),
            tooltip: Mutex::new(None),
            chain: Mutex::new(options.events.into()),
            state: Mutex::new(StepState::Hidden),
            transitions: Mutex::new(Vec::new()),
            next: OnceLock::new(),
            me: me.clone(),
        });

        if step.target.is_some() {
            step.render();
        }
        step
    }

    /// Bind the tooltip view to the overlay anchor, then gate the event
    /// chain on the predecessor's finished-signal.
    fn render(&self) {
        let anchor = *self.overlay.lock().expect("step overlay mutex poisoned");
        if let Some(anchor) = anchor {
            let view = self
                .tooltips
                .create(anchor, &self.tooltip_config, &self.message);
            *self.tooltip.lock().expect("step tooltip mutex poisoned") = Some(view);
        }
        self.add_before_event();
    }

    fn add_before_event(&self) {
        let Some(previous) = self.previous_id else {
            return;
        };
        self.chain
            .lock()
            .expect("step chain mutex poisoned")
            .push_front(EventBinding::new(
                SignalScope::Document,
                previous.finished_signal(),
            ));
    }

    /// Wire the successor link. Set once at tour construction; later
    /// calls are ignored.
    pub(crate) fn set_next(&self, next: &Arc<Step>) {
        let _ = self.next.set(Arc::downgrade(next));
    }

    /// Begin (or resume) listening for this step's event chain.
    ///
    /// Consumes descriptors one at a time, left to right: each call takes
    /// the head descriptor permanently and registers a one-shot handler
    /// that re-enters `listen` when the matching signal arrives, so the
    /// same event must occur once per descriptor naming it. An exhausted
    /// chain fires the step. Inert steps ignore the call.
    pub(crate) fn listen(&self) {
        if self.target.is_none() {
            debug!(step = %self.id, selector = %self.selector, "inert step asked to listen; ignoring");
            return;
        }

        let head = self.chain.lock().expect("step chain mutex poisoned").pop_front();
        match head {
            None => self.fire(),
            Some(binding) => {
                debug!(
                    step = %self.id,
                    scope = %binding.scope,
                    event = %binding.event,
                    "step waiting for event"
                );
                let me = self.me.clone();
                self.bus.once(
                    binding.scope,
                    &binding.event,
                    Box::new(move |_signal| {
                        if let Some(step) = me.upgrade() {
                            step.listen();
                        }
                    }),
                );
            }
        }
    }

    /// The chain is complete: hand the baton to the successor, then show.
    /// The successor starts listening before this step shows, so its
    /// prerequisite signal cannot slip past it.
    fn fire(&self) {
        debug!(step = %self.id, "event chain complete");
        if let Some(next) = self.next.get().and_then(Weak::upgrade) {
            next.listen();
        }
        self.show();
    }

    /// Show the tooltip and arm the auto-hide timer. No-op unless hidden.
    pub(crate) fn show(&self) {
        if !self.transition(StepState::Hidden, StepState::Shown) {
            return;
        }
        info!(step = %self.id, selector = %self.selector, "step shown");
        if let Some(tooltip) = self
            .tooltip
            .lock()
            .expect("step tooltip mutex poisoned")
            .as_deref()
        {
            tooltip.show();
        }
        self.arm_hide_timer();
    }

    /// Hide the tooltip, tear down the overlay, and emit the
    /// finished-signal. No-op unless shown.
    pub(crate) fn hide(&self) {
        if !self.transition(StepState::Shown, StepState::Hidden) {
            return;
        }
        info!(step = %self.id, "step hidden");
        if let Some(tooltip) = self
            .tooltip
            .lock()
            .expect("step tooltip mutex poisoned")
            .as_deref()
        {
            tooltip.hide();
        }
        let overlay = self.overlay.lock().expect("step overlay mutex poisoned").take();
        if let Some(node) = overlay {
            self.dom.remove_node(node);
        }
        self.bus.emit(
            SignalScope::Document,
            &self.id.finished_signal(),
            json!({ "step": self.id }),
        );
    }

    /// Schedule a single hide after the tour timeout, measured from the
    /// moment the show completed.
    fn arm_hide_timer(&self) {
        let me = self.me.clone();
        let timer = tokio::time::sleep(self.settings.timeout());
        tokio::spawn(async move {
            timer.await;
            if let Some(step) = me.upgrade() {
                step.hide();
            }
        });
    }

    /// Guarded state change; records the transition when it applies.
    fn transition(&self, from: StepState, to: StepState) -> bool {
        {
            let mut state = self.state.lock().expect("step state mutex poisoned");
            if *state != from {
                return false;
            }
            *state = to;
        }
        self.transitions
            .lock()
            .expect("step transitions mutex poisoned")
            .push(StepTransition {
                from,
                to,
                at: Utc::now(),
            });
        true
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn previous_id(&self) -> Option<StepId> {
        self.previous_id
    }

    pub fn next_id(&self) -> Option<StepId> {
        self.next.get().and_then(Weak::upgrade).map(|step| step.id())
    }

    pub fn state(&self) -> StepState {
        *self.state.lock().expect("step state mutex poisoned")
    }

    /// Whether the selector resolved to a target at construction.
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Tour tooltip options with this step's overrides applied.
    pub fn tooltip_config(&self) -> &TooltipConfig {
        &self.tooltip_config
    }

    /// Name of the signal this step emits when it hides.
    pub fn finished_signal(&self) -> String {
        self.id.finished_signal()
    }

    /// Visibility transitions recorded so far, oldest first.
    pub fn transitions(&self) -> Vec<StepTransition> {
        self.transitions
            .lock()
            .expect("step transitions mutex poisoned")
            .clone()
    }
}

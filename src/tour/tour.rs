//! Tour orchestrator — builds the step sequence and gates whether it runs.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{TourConfig, TourOptions, TourSettings};
use crate::dom::{Dom, SessionStore, TooltipRenderer};
use crate::signal::SignalBus;
use crate::tour::step::Step;

/// Session-store key marking the tour as already run this session.
pub const SESSION_KEY: &str = "tour-session-id";

/// Unique tour identity. Written under [`SESSION_KEY`] when the tour
/// actually starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TourId(Uuid);

impl TourId {
    fn new() -> TourId {
        TourId(Uuid::new_v4())
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collaborators a tour talks to. All shared handles; a host typically
/// builds one bundle and reuses it across tours.
#[derive(Clone)]
pub struct TourDeps {
    pub dom: Arc<dyn Dom>,
    pub tooltips: Arc<dyn TooltipRenderer>,
    pub session: Arc<dyn SessionStore>,
    pub bus: Arc<dyn SignalBus>,
}

/// An ordered sequence of tooltip callouts over a host document.
///
/// Construction resolves options, builds every step, and wires the
/// predecessor/successor links exactly once; [`Tour::start`] only decides
/// whether the first step may begin listening. Everything after that is
/// driven by signals on the bus and by the auto-hide timer.
pub struct Tour {
    id: TourId,
    config: TourConfig,
    steps: Vec<Arc<Step>>,
    session: Arc<dyn SessionStore>,
    bus: Arc<dyn SignalBus>,
}

impl Tour {
    /// Build a tour: merge `options` over [`TourConfig::default`], build
    /// one step per item in order, and link neighbours. Steps whose
    /// selector matches nothing are built inert; construction itself
    /// never fails.
    pub fn new(options: TourOptions, deps: TourDeps) -> Tour {
        let config = TourConfig::default().merge(&options);
        let settings = Arc::new(TourSettings::from(&config));

        let mut steps: Vec<Arc<Step>> = Vec::with_capacity(config.items.len());
        for item in &config.items {
            let previous_id = steps.last().map(|step| step.id());
            let step = Step::new(
                item.clone(),
                previous_id,
                Arc::clone(&settings),
                Arc::clone(&deps.dom),
                Arc::clone(&deps.tooltips),
                Arc::clone(&deps.bus),
            );
            if let Some(previous) = steps.last() {
                previous.set_next(&step);
            }
            steps.push(step);
        }

        let tour = Tour {
            id: TourId::new(),
            config,
            steps,
            session: deps.session,
            bus: deps.bus,
        };
        debug!(tour = %tour.id, steps = tour.steps.len(), "tour built");
        tour
    }

    /// Start the tour by asking the first step to listen for its chain.
    ///
    /// Declines silently when there are no steps, when the session gate
    /// says the tour already ran, or when the first step's target could
    /// not be resolved. On an actual start the session is marked before
    /// any listening begins. Requires a running Tokio runtime, which the
    /// auto-hide timers spawn onto.
    pub fn start(&self) {
        let Some(first) = self.steps.first() else {
            debug!(tour = %self.id, "tour has no steps; not starting");
            return;
        };
        if self.in_session() {
            debug!(tour = %self.id, "tour already ran this session; not starting");
            return;
        }
        if !first.is_resolved() {
            debug!(
                tour = %self.id,
                selector = %first.selector(),
                "first step has no target; not starting"
            );
            return;
        }

        self.mark_session();
        info!(tour = %self.id, steps = self.steps.len(), "tour started");
        first.listen();
    }

    /// Contract point for cancellation; currently does nothing. A running
    /// chain cannot be interrupted yet: registered handlers stay armed
    /// and a pending hide timer still fires.
    ///
    /// TODO: thread a cancellation token through listen and the hide
    /// timer so stop can actually tear a running tour down.
    pub fn stop(&self) {}

    fn in_session(&self) -> bool {
        if !self.config.disable_on_reload {
            return false;
        }
        self.session.get(SESSION_KEY).is_some()
    }

    fn mark_session(&self) {
        if !self.config.disable_on_reload {
            return;
        }
        self.session.set(SESSION_KEY, &self.id.to_string());
    }

    pub fn id(&self) -> TourId {
        self.id
    }

    /// Resolved configuration the tour was built with.
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Steps in tour order.
    pub fn steps(&self) -> &[Arc<Step>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The signal bus this tour listens and announces on.
    pub fn bus(&self) -> &Arc<dyn SignalBus> {
        &self.bus
    }
}

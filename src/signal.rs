//! Signal bus — the one-shot pub/sub the tour listens and emits on.
//!
//! The original design synchronized steps through events broadcast on a
//! shared document; here the bus is an explicit value owned by whoever
//! constructs the tour, so handlers cannot leak across unrelated tours.
//!
//! `emit` dispatches synchronously: every handler whose (scope, name)
//! matches is removed from the registry first, then invoked in
//! registration order with the registry unlocked. Handlers may therefore
//! re-register or emit further signals from inside dispatch; the step
//! chain protocol depends on both. A handler registered during dispatch
//! of a signal only sees the next occurrence of that signal.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a signal is observed.
///
/// Document, window, root element, and body are the well-known scopes;
/// any other target is addressed by selector. Selector scopes match by
/// string equality only — resolving them against a real document is the
/// host's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalScope {
    Document,
    Window,
    /// The root element of the host document.
    Root,
    Body,
    /// An arbitrary selector-addressed target.
    Selector(String),
}

impl SignalScope {
    /// Map a compact scope token to a scope. Unknown tokens are selectors.
    pub fn from_token(token: &str) -> SignalScope {
        match token {
            "document" => Self::Document,
            "window" => Self::Window,
            "html" | "root" => Self::Root,
            "body" => Self::Body,
            other => Self::Selector(other.to_string()),
        }
    }
}

impl fmt::Display for SignalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Window => write!(f, "window"),
            Self::Root => write!(f, "root"),
            Self::Body => write!(f, "body"),
            Self::Selector(selector) => write!(f, "{selector}"),
        }
    }
}

/// A signal delivered to matching handlers.
#[derive(Debug, Clone)]
pub struct Signal {
    pub scope: SignalScope,
    pub name: String,
    pub payload: Value,
}

/// Handler invoked at most once, on the next matching signal.
pub type OnceHandler = Box<dyn FnOnce(&Signal) + Send>;

/// Pub/sub seam between the tour engine and whatever produces events.
///
/// Carries both host-originated events (clicks, custom triggers) and the
/// synthetic step-finished signal. Implementations must dispatch `emit`
/// synchronously and must tolerate handlers calling back into the bus.
pub trait SignalBus: Send + Sync {
    /// Register a handler for the next signal matching `scope` and `name`.
    fn once(&self, scope: SignalScope, name: &str, handler: OnceHandler);

    /// Emit a signal, draining every matching one-shot handler.
    fn emit(&self, scope: SignalScope, name: &str, payload: Value);
}

struct PendingOnce {
    scope: SignalScope,
    name: String,
    handler: OnceHandler,
}

/// In-process [`SignalBus`]; the default for embedders and tests.
#[derive(Default)]
pub struct InProcessBus {
    pending: Mutex<Vec<PendingOnce>>,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handlers still waiting for a signal.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("signal bus mutex poisoned").len()
    }
}

impl SignalBus for InProcessBus {
    fn once(&self, scope: SignalScope, name: &str, handler: OnceHandler) {
        self.pending
            .lock()
            .expect("signal bus mutex poisoned")
            .push(PendingOnce {
                scope,
                name: name.to_string(),
                handler,
            });
    }

    fn emit(&self, scope: SignalScope, name: &str, payload: Value) {
        let matched: Vec<PendingOnce> = {
            let mut pending = self.pending.lock().expect("signal bus mutex poisoned");
            let mut matched = Vec::new();
            let mut kept = Vec::with_capacity(pending.len());
            for entry in pending.drain(..) {
                if entry.scope == scope && entry.name == name {
                    matched.push(entry);
                } else {
                    kept.push(entry);
                }
            }
            *pending = kept;
            matched
        };

        if matched.is_empty() {
            return;
        }

        let signal = Signal {
            scope,
            name: name.to_string(),
            payload,
        };
        for entry in matched {
            (entry.handler)(&signal);
        }
    }
}

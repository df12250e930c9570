//! Tour orchestration.
//!
//! - `step` — one callout: chain listening, show/hide lifecycle
//! - `tour` — the ordered sequence: construction, linking, session gating

pub mod step;
pub mod tour;

pub use step::{Step, StepId, StepState, StepTransition};
pub use tour::{Tour, TourDeps, TourId, SESSION_KEY};

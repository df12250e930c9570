//! onboard-tour — guided-tour orchestration over a host document.

pub mod config;
pub mod dom;
pub mod error;
pub mod signal;
pub mod testing;
pub mod tour;

use crate::config::TourOptions;
use crate::tour::{Tour, TourDeps};

/// Build a [`Tour`] from an options bag and the host's collaborators.
/// The tour does nothing until [`Tour::start`] is called.
pub fn create_tour(options: TourOptions, deps: TourDeps) -> Tour {
    Tour::new(options, deps)
}

//! Peer registration
//!
//! Accepts the fixed number of external peer processes, in arrival order,
//! before the first round starts. Peer indices are their arrival order and
//! never change for the rest of the run.

pub mod registry;

/// Number of external processes taking part in a run
pub const PEER_COUNT: usize = 4;

pub use registry::*;

//! Round coordination
//!
//! Drives the convergence loop once the peer set is registered:
//! - Collect one report from every peer, in index order
//! - Compute and broadcast the new central temperature
//! - Stop once every peer's reading has settled, then notify all peers

mod round;
mod state;

pub use round::*;
pub use state::*;

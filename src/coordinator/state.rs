//! Central temperature state and convergence test

use std::fmt;

/// A peer's reading is settled when it moved less than this since the previous round
pub const EPSILON: f32 = 0.001;

/// Weight of the coordinator's own value relative to a single peer's
pub const CENTRAL_WEIGHT: f32 = 2.0;

// ─────────────────────────────────────────────────────────────────
// Phase
// ─────────────────────────────────────────────────────────────────

/// Lifecycle of a coordinator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for all peers to connect
    AwaitingPeers,
    /// Executing rounds
    Round,
    /// Every peer settled in the last round
    Converged,
    /// Sending the terminal message
    Terminating,
    /// Connections released after a normal run
    Done,
    /// A fatal I/O error ended the run
    Failed,
}

impl Phase {
    /// Whether `next` is a legal transition from this phase
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (AwaitingPeers, Round)
                | (AwaitingPeers, Failed)
                | (Round, Round)
                | (Round, Converged)
                | (Round, Failed)
                | (Converged, Terminating)
                | (Terminating, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AwaitingPeers => "awaiting_peers",
            Phase::Round => "round",
            Phase::Converged => "converged",
            Phase::Terminating => "terminating",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────
// Central State
// ─────────────────────────────────────────────────────────────────

/// Weighted average of the central value and one reading per peer.
///
/// The central value counts [`CENTRAL_WEIGHT`] times, each peer once.
pub fn next_central(central: f32, current: &[f32]) -> f32 {
    let sum: f32 = current.iter().sum();
    (CENTRAL_WEIGHT * central + sum) / (current.len() as f32 + CENTRAL_WEIGHT)
}

/// True iff every peer moved less than [`EPSILON`] since the previous round
pub fn is_settled(current: &[f32], previous: &[f32]) -> bool {
    current
        .iter()
        .zip(previous)
        .all(|(c, p)| (c - p).abs() < EPSILON)
}

/// The coordinator's running value and the previous round's readings
#[derive(Debug, Clone, PartialEq)]
pub struct CentralState<const N: usize> {
    central_temp: f32,
    previous: [f32; N],
}

impl<const N: usize> CentralState<N> {
    pub fn new(initial: f32) -> Self {
        Self {
            central_temp: initial,
            previous: [0.0; N],
        }
    }

    pub fn central_temp(&self) -> f32 {
        self.central_temp
    }

    pub fn previous(&self) -> &[f32; N] {
        &self.previous
    }

    /// Fold one round of readings into the central value and return it
    pub fn update(&mut self, current: &[f32; N]) -> f32 {
        self.central_temp = next_central(self.central_temp, current);
        self.central_temp
    }

    /// Compare against the previous round, then remember `current` for the next one
    pub fn settle(&mut self, current: [f32; N]) -> bool {
        let stable = is_settled(&current, &self.previous);
        self.previous = current;
        stable
    }
}

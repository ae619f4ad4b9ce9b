//! The round loop
//!
//! All peer I/O is sequential and in index order: read peer 0 .. N-1,
//! then write peer 0 .. N-1. A round only computes from a complete set of
//! readings, and any I/O failure ends the run.

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::peer::PeerSet;
use crate::protocol::Message;

use super::{CentralState, Phase};

/// Outcome of a converged run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary<const N: usize> {
    /// Central temperature sent with the terminal message
    pub final_temp: f32,

    /// Number of rounds executed
    pub rounds: u64,

    /// Each peer's reading in the last round
    pub peer_values: [f32; N],
}

impl<const N: usize> fmt::Display for RunSummary<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "System has been stabilized after {} rounds", self.rounds)?;
        for (i, value) in self.peer_values.iter().enumerate() {
            writeln!(f, "  Peer {}: {:.5}", i, value)?;
        }
        writeln!(f, "Final central temperature: {:.5}", self.final_temp)
    }
}

/// Owns the peer set and the central state for the lifetime of a run
pub struct RoundCoordinator<const N: usize, S = TcpStream> {
    peers: PeerSet<N, S>,
    state: CentralState<N>,
    phase: Phase,
    round: u64,
    round_delay: Duration,
}

impl<const N: usize, S> RoundCoordinator<N, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(initial_temp: f32, peers: PeerSet<N, S>) -> Self {
        Self {
            peers,
            state: CentralState::new(initial_temp),
            phase: Phase::AwaitingPeers,
            round: 0,
            round_delay: Duration::ZERO,
        }
    }

    /// Pause between rounds
    pub fn with_round_delay(mut self, delay: Duration) -> Self {
        self.round_delay = delay;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run rounds until every peer settles, then send the terminal message.
    ///
    /// Consumes the coordinator: peer connections are closed when this returns,
    /// whether it converged or failed.
    pub async fn run(mut self) -> Result<RunSummary<N>> {
        info!(
            initial_temp = self.state.central_temp(),
            peers = self.peers.len(),
            "Starting rounds"
        );

        loop {
            self.enter(Phase::Round);
            match self.run_round().await {
                Ok(true) => break,
                Ok(false) => {
                    if !self.round_delay.is_zero() {
                        tokio::time::sleep(self.round_delay).await;
                    }
                }
                Err(e) => {
                    self.enter(Phase::Failed);
                    error!(
                        round = self.round,
                        peer = ?e.peer_index(),
                        error = %e.format_for_log(),
                        "Round failed, closing all peer connections"
                    );
                    return Err(e);
                }
            }
        }

        self.enter(Phase::Converged);
        let final_temp = self.state.central_temp();
        info!(rounds = self.round, final_temp, "System has been stabilized");

        self.enter(Phase::Terminating);
        self.terminate(final_temp).await;

        self.enter(Phase::Done);
        Ok(RunSummary {
            final_temp,
            rounds: self.round,
            peer_values: self.peers.last_values(),
        })
    }

    /// One collect / update / broadcast / converge-check cycle.
    /// Returns whether every peer settled.
    async fn run_round(&mut self) -> Result<bool> {
        self.round += 1;

        let current = self.collect().await?;
        let central = self.state.update(&current);
        self.broadcast(Message::update(central)).await?;
        debug!(round = self.round, previous = ?self.state.previous(), "Checking convergence");
        let stable = self.state.settle(current);

        info!(
            round = self.round,
            values = ?current,
            central,
            stable,
            "Round complete"
        );
        Ok(stable)
    }

    /// Read exactly one report from each peer, in index order
    async fn collect(&mut self) -> Result<[f32; N]> {
        let round = self.round;
        let mut current = [0.0f32; N];

        for peer in self.peers.iter_mut() {
            let value = peer.receive().await.map_err(|source| Error::PeerReceive {
                index: peer.index(),
                addr: peer.addr(),
                round,
                source,
            })?;
            debug!(round, peer = peer.index(), value, "Peer temperature");
            current[peer.index()] = value;
        }

        Ok(current)
    }

    /// Send `msg` to each peer, in index order
    async fn broadcast(&mut self, msg: Message) -> Result<()> {
        let round = self.round;

        for peer in self.peers.iter_mut() {
            peer.send(&msg).await.map_err(|source| Error::PeerSend {
                index: peer.index(),
                addr: peer.addr(),
                round,
                source,
            })?;
        }

        debug!(round, value = msg.value, "Update broadcast");
        Ok(())
    }

    /// Notify every peer once that the run is over. Unacknowledged.
    async fn terminate(&mut self, final_temp: f32) {
        let msg = Message::terminate(final_temp);

        for peer in self.peers.iter_mut() {
            if let Err(e) = peer.send(&msg).await {
                warn!(
                    peer = peer.index(),
                    addr = %peer.addr(),
                    error = %e,
                    "Failed to deliver terminal message"
                );
            }
        }

        debug!(final_temp, "Terminal message sent to all peers");
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
        if next.is_terminal() {
            debug!(phase = %next, rounds = self.round, "Coordinator stopped");
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

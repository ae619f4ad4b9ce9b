//! Peer registry: accepts exactly N peers and hands them out as a fixed set
//!
//! Setup is all-or-nothing: a bind failure or a failed accept aborts the
//! registration and drops every connection accepted so far.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, PeerAddr, Result};
use crate::protocol::{self, Message};

// ─────────────────────────────────────────────────────────────────
// Peer
// ─────────────────────────────────────────────────────────────────

/// One connected external process
#[derive(Debug)]
pub struct Peer<S = TcpStream> {
    /// Arrival order, 0-based
    index: usize,

    /// Remote address, if the transport has one
    addr: Option<SocketAddr>,

    /// Bidirectional stream to the peer
    channel: S,

    /// Most recently received value (0 until the first report)
    last_value: f32,
}

impl<S> Peer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(index: usize, channel: S, addr: Option<SocketAddr>) -> Self {
        Self {
            index,
            addr,
            channel,
            last_value: 0.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn addr(&self) -> PeerAddr {
        PeerAddr(self.addr)
    }

    pub fn last_value(&self) -> f32 {
        self.last_value
    }

    /// Block until one full report arrives and return its value.
    ///
    /// The report's origin field is not interpreted.
    pub async fn receive(&mut self) -> io::Result<f32> {
        let msg = protocol::read_message(&mut self.channel).await?;
        trace!(peer = self.index, origin = %msg.origin, value = msg.value, "Report received");
        self.last_value = msg.value;
        Ok(msg.value)
    }

    pub async fn send(&mut self, msg: &Message) -> io::Result<()> {
        protocol::write_message(&mut self.channel, msg).await?;
        trace!(peer = self.index, value = msg.value, terminal = msg.is_terminal(), "Message sent");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Peer Set
// ─────────────────────────────────────────────────────────────────

/// The complete, fixed-size set of peers, indexed by arrival order
#[derive(Debug)]
pub struct PeerSet<const N: usize, S = TcpStream> {
    peers: [Peer<S>; N],
}

impl<const N: usize, S> PeerSet<N, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Build a set from already-connected streams; index i is `streams[i]`
    #[cfg(test)]
    pub fn from_streams(streams: [S; N]) -> Self {
        let mut index = 0;
        let peers = streams.map(|stream| {
            let peer = Peer::new(index, stream, None);
            index += 1;
            peer
        });
        Self { peers }
    }

    fn from_peers(peers: Vec<Peer<S>>) -> Result<Self> {
        let peers: [Peer<S>; N] = peers.try_into().map_err(|rest: Vec<Peer<S>>| {
            Error::Internal(format!("expected {} peers, registered {}", N, rest.len()))
        })?;
        Ok(Self { peers })
    }

    pub fn len(&self) -> usize {
        N
    }

    /// Peers in index order
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Peer<S>> {
        self.peers.iter()
    }

    /// Peers in index order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Peer<S>> {
        self.peers.iter_mut()
    }

    /// Each peer's most recently received value
    pub fn last_values(&self) -> [f32; N] {
        std::array::from_fn(|i| self.peers[i].last_value())
    }
}

// ─────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────

/// Listening endpoint that turns into a [`PeerSet`] once N peers arrived
pub struct PeerListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl PeerListener {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;

        let bound = Self {
            listener,
            local_addr,
        };
        info!(addr = %bound.local_addr(), "Listening for peer connections");
        Ok(bound)
    }

    /// The bound address (differs from the requested one when port 0 was used)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections in arrival order until exactly N are registered.
    ///
    /// The listener is closed afterwards; later connection attempts are refused.
    pub async fn accept_all<const N: usize>(self) -> Result<PeerSet<N>> {
        let mut peers = Vec::with_capacity(N);

        while peers.len() < N {
            let (stream, addr) = self.listener.accept().await.map_err(|source| Error::Accept {
                accepted: peers.len(),
                expected: N,
                source,
            })?;

            if let Err(e) = stream.set_nodelay(true) {
                warn!(peer_addr = %addr, error = %e, "Failed to disable Nagle on peer socket");
            }

            let index = peers.len();
            info!(index, peer_addr = %addr, "Peer connected");
            peers.push(Peer::new(index, stream, Some(addr)));
        }

        debug!(addr = %self.local_addr, "Closing peer listener");
        drop(self.listener);

        info!(peers = N, "All peers registered");
        PeerSet::from_peers(peers)
    }
}

/// Bind `addr` and accept exactly N peers
pub async fn register<const N: usize>(addr: SocketAddr) -> Result<PeerSet<N>> {
    PeerListener::bind(addr).await?.accept_all::<N>().await
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

//! Common test utilities
//!
//! A sandboxed command builder and scripted TCP peers that speak the
//! 8-byte value/origin wire format.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use assert_cmd::Command;
use tempfile::TempDir;

pub const ORIGIN_TERMINATE: i32 = -1;

/// Origin the mock peers put on their reports; the coordinator ignores it
const PEER_ORIGIN: i32 = 7;

/// Command for the coordinator binary, isolated from any config file on
/// the host: cwd and HOME both point into `sandbox`.
pub fn coordinator_cmd(sandbox: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("thermal-coordinator").unwrap();
    cmd.current_dir(sandbox.path())
        .env("HOME", sandbox.path())
        .env("XDG_CONFIG_HOME", sandbox.path().join(".config"))
        .env_remove("THERMAL_CONFIG")
        .env_remove("THERMAL_LISTEN_ADDR")
        .env_remove("THERMAL_INITIAL_TEMP")
        .env_remove("THERMAL_ROUND_DELAY_MS")
        .env_remove("RUST_LOG")
        .timeout(Duration::from_secs(30));
    cmd
}

/// Like [`coordinator_cmd`], with rounds running back to back
pub fn run_cmd(sandbox: &TempDir) -> Command {
    let mut cmd = coordinator_cmd(sandbox);
    cmd.env("THERMAL_ROUND_DELAY_MS", "0");
    cmd
}

/// A loopback address nothing is listening on (at the time of the call)
pub fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn encode(value: f32, origin: i32) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf[..4].copy_from_slice(&value.to_ne_bytes());
    buf[4..].copy_from_slice(&origin.to_ne_bytes());
    buf
}

pub fn decode(buf: [u8; 8]) -> (f32, i32) {
    let value = f32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let origin = i32::from_ne_bytes([buf[4], buf[5], buf[6], buf[7]]);
    (value, origin)
}

/// How a scripted peer chooses its next report
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Always report the same value
    Fixed(f32),
    /// Start at the value, then move halfway toward each update
    Follow(f32),
    /// Report a constant and hang up after this many updates
    DropAfter { value: f32, updates: usize },
}

impl Behavior {
    fn start(self) -> f32 {
        match self {
            Behavior::Fixed(v) | Behavior::Follow(v) => v,
            Behavior::DropAfter { value, .. } => value,
        }
    }
}

/// What a peer saw during the run
#[derive(Debug, Default, Clone)]
pub struct PeerLog {
    /// Central values of every non-terminal message, in order
    pub updates: Vec<f32>,
    /// Number of terminal messages received
    pub terminals: usize,
    /// Value carried by the terminal message
    pub terminal_value: Option<f32>,
    /// Bytes that arrived after the terminal message
    pub trailing_bytes: usize,
}

/// Connect one peer per behavior, strictly in order, retrying until the
/// coordinator is listening. Each peer then runs on its own thread.
pub fn spawn_peers(addr: SocketAddr, behaviors: Vec<Behavior>) -> JoinHandle<Vec<PeerLog>> {
    thread::spawn(move || {
        let mut handles = Vec::new();
        for behavior in behaviors {
            let stream = connect_with_retry(addr);
            handles.push(thread::spawn(move || drive(stream, behavior)));
        }
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

fn connect_with_retry(addr: SocketAddr) -> TcpStream {
    for _ in 0..200 {
        if let Ok(stream) = TcpStream::connect(addr) {
            return stream;
        }
        thread::sleep(Duration::from_millis(25));
    }
    panic!("coordinator never started listening on {}", addr);
}

fn drive(mut stream: TcpStream, behavior: Behavior) -> PeerLog {
    stream.set_read_timeout(Some(Duration::from_secs(20))).unwrap();
    let mut log = PeerLog::default();
    let mut temp = behavior.start();

    loop {
        if let Behavior::DropAfter { updates, .. } = behavior {
            if log.updates.len() == updates {
                return log;
            }
        }

        // After the final round the coordinator may already be gone
        let _ = stream.write_all(&encode(temp, PEER_ORIGIN));

        let mut buf = [0u8; 8];
        if stream.read_exact(&mut buf).is_err() {
            return log;
        }

        let (value, origin) = decode(buf);
        if origin == ORIGIN_TERMINATE {
            log.terminals += 1;
            log.terminal_value = Some(value);
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest);
            log.trailing_bytes = rest.len();
            return log;
        }

        log.updates.push(value);
        if let Behavior::Follow(_) = behavior {
            temp = (temp + value) / 2.0;
        }
    }
}

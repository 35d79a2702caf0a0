//! # kcp-arq — clock-driven KCP control block
//!
//! A synchronous implementation of the KCP ARQ protocol with a per-session
//! token in every segment header. The engine performs no I/O and reads no
//! clock: the caller feeds it datagrams, drives it with timestamps, and
//! receives MTU-bounded wire chunks through an output closure.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  kcp-arq                     │
//! │                              │
//! │  engine     ← control block  │
//! │  rtt        ← RTO estimator  │
//! │  congestion ← cwnd/ssthresh  │
//! │  probe      ← WASK/WINS      │
//! │  segment    ← wire encoding  │
//! │  protocol   ← constants      │
//! │  config     ← tuning         │
//! │  error      ← KcpError       │
//! └──────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use kcp_arq::KcpEngine;
//! use std::sync::{Arc, Mutex};
//!
//! let wire = Arc::new(Mutex::new(Vec::<Vec<u8>>::new()));
//! let sink = wire.clone();
//! let mut client = KcpEngine::new(7, 0xC0FFEE, false, move |chunk: &[u8]| {
//!     sink.lock().unwrap().push(chunk.to_vec());
//! });
//! let mut server = KcpEngine::new(7, 0xC0FFEE, false, |_: &[u8]| {});
//!
//! client.send(Bytes::from_static(b"hello")).unwrap();
//! let mut now = 0;
//! let mut buf = [0u8; 64];
//! let n = loop {
//!     client.update(now).unwrap();
//!     for chunk in wire.lock().unwrap().drain(..) {
//!         server.input(&chunk).unwrap();
//!     }
//!     if let Ok(n) = server.recv(&mut buf) {
//!         break n;
//!     }
//!     now += client.interval();
//! };
//! assert_eq!(&buf[..n], b"hello");
//! ```

pub mod config;
pub mod congestion;
pub mod engine;
pub mod error;
pub mod probe;
pub mod protocol;
pub mod rtt;
pub mod segment;

pub use config::{KcpConfig, NodeDelayConfig};
pub use engine::{KcpEngine, OutputFn};
pub use error::{KcpError, KcpResult};
pub use protocol::*;
pub use segment::Segment;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

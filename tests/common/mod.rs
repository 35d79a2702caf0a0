//! Shared test helpers for KCP integration tests
#![allow(dead_code)]

use bytes::Bytes;
use kcp_arq::{KcpConfig, KcpEngine};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Chunks emitted by one engine's output closure, oldest first.
pub type Wire = Arc<Mutex<VecDeque<Bytes>>>;

/// An engine together with the wire its output lands on.
pub struct Peer {
    pub kcp: KcpEngine,
    pub wire: Wire,
}

impl Peer {
    pub fn new(conv: u32, token: u32, stream: bool) -> Self {
        let wire = Wire::default();
        let sink = wire.clone();
        let kcp = KcpEngine::new(conv, token, stream, move |chunk: &[u8]| {
            sink.lock().unwrap().push_back(Bytes::copy_from_slice(chunk));
        });
        Self { kcp, wire }
    }

    pub fn with_config(conv: u32, token: u32, config: &KcpConfig) -> Self {
        let wire = Wire::default();
        let sink = wire.clone();
        let kcp = KcpEngine::with_config(conv, token, config, move |chunk: &[u8]| {
            sink.lock().unwrap().push_back(Bytes::copy_from_slice(chunk));
        })
        .expect("valid config");
        Self { kcp, wire }
    }

    /// Take every chunk emitted so far.
    pub fn drain_output(&self) -> Vec<Bytes> {
        self.wire.lock().unwrap().drain(..).collect()
    }
}

/// Send all output packets from one engine into another engine's input.
pub fn transfer(src: &Peer, dst: &mut Peer) -> usize {
    let packets = src.drain_output();
    for packet in &packets {
        dst.kcp.input(packet).expect("well-formed chunk");
    }
    packets.len()
}

/// One clock tick: `a` flushes to `b`, then `b` flushes back to `a`.
pub fn step(a: &mut Peer, b: &mut Peer, now: u32) {
    a.kcp.update(now).unwrap();
    transfer(a, b);
    b.kcp.update(now).unwrap();
    transfer(b, a);
}

/// Collect all available messages from the engine.
pub fn drain_recv(kcp: &mut KcpEngine) -> Vec<Vec<u8>> {
    let mut buf = vec![0u8; 1 << 20];
    let mut msgs = Vec::new();
    while let Ok(n) = kcp.recv(&mut buf) {
        msgs.push(buf[..n].to_vec());
    }
    msgs
}

/// Command byte of every segment packed in a chunk.
pub fn commands(chunk: &[u8]) -> Vec<u8> {
    let mut cmds = Vec::new();
    let mut offset = 0;
    while offset + 28 <= chunk.len() {
        cmds.push(chunk[offset + 8]);
        let len = u32::from_le_bytes(chunk[offset + 24..offset + 28].try_into().unwrap());
        offset += 28 + len as usize;
    }
    cmds
}

/// Route engine logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

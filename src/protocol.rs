//! KCP protocol types, constants, and utilities

use crate::error::KcpError;
use std::time::{SystemTime, UNIX_EPOCH};

/// KCP protocol constants
pub mod constants {
    pub const KCP_RTO_NDL: u32 = 30; // no delay min rto
    pub const KCP_RTO_MIN: u32 = 100; // normal min rto
    pub const KCP_RTO_DEF: u32 = 200; // default rto
    pub const KCP_RTO_MAX: u32 = 60000; // max rto
    pub const KCP_ASK_SEND: u32 = 1; // need to send WASK
    pub const KCP_ASK_TELL: u32 = 2; // need to send WINS
    pub const KCP_WND_SND: u32 = 32; // default send window
    pub const KCP_WND_RCV: u32 = 256; // default (and minimum) receive window
    pub const KCP_MTU_DEF: u32 = 1400; // default mtu
    pub const KCP_MTU_MIN: u32 = 50; // smallest accepted mtu
    pub const KCP_MTU_MAX: u32 = 65535; // largest accepted mtu
    pub const KCP_INTERVAL: u32 = 100; // default update interval
    pub const KCP_INTERVAL_MIN: u32 = 10;
    pub const KCP_INTERVAL_MAX: u32 = 5000;
    pub const KCP_OVERHEAD: u32 = 28; // kcp header overhead
    pub const KCP_DEADLINK: u32 = 10; // max transmissions of one segment
    pub const KCP_THRESH_INIT: u32 = 2; // initial slow start threshold
    pub const KCP_THRESH_MIN: u32 = 2; // min slow start threshold
    pub const KCP_PROBE_INIT: u32 = 7000; // 7 secs to probe window size
    pub const KCP_PROBE_LIMIT: u32 = 120000; // up to 120 secs to probe window
    pub const KCP_CLOCK_JUMP: i32 = 10000; // flush baseline resync threshold
}

/// Conversation ID type
pub type ConvId = u32;

/// Session token type
pub type Token = u32;

/// Sequence number type
pub type SeqNum = u32;

/// Timestamp type (milliseconds, caller-defined epoch)
pub type Timestamp = u32;

/// Segment command carried in byte 8 of every header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Data segment
    Push = 81,
    /// Acknowledgment of one sequence number
    Ack = 82,
    /// Window probe (ask)
    WindowAsk = 83,
    /// Window size (tell)
    WindowTell = 84,
}

impl Command {
    /// Get command type as string for debugging
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Push => "PUSH",
            Command::Ack => "ACK",
            Command::WindowAsk => "WASK",
            Command::WindowTell => "WINS",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = KcpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            81 => Ok(Command::Push),
            82 => Ok(Command::Ack),
            83 => Ok(Command::WindowAsk),
            84 => Ok(Command::WindowTell),
            other => Err(KcpError::UnknownCommand(other)),
        }
    }
}

/// Statistics for KCP connection
#[derive(Debug, Default, Clone, Copy)]
pub struct KcpStats {
    /// Payload bytes accepted by `send`
    pub bytes_sent: u64,
    /// Payload bytes delivered by `recv`
    pub bytes_received: u64,
    /// Chunks handed to the output sink
    pub packets_sent: u64,
    /// Input calls that parsed at least one segment
    pub packets_received: u64,
    /// Timeout retransmissions
    pub retransmissions: u64,
    /// Fast retransmissions
    pub fast_retransmissions: u64,
    /// Smoothed RTT in milliseconds
    pub rtt: u32,
    /// RTT variance
    pub rtt_var: u32,
    /// Current RTO
    pub rto: u32,
    /// Send window size
    pub snd_wnd: u32,
    /// Receive window size
    pub rcv_wnd: u32,
    /// Last window advertised by the peer
    pub rmt_wnd: u32,
    /// Congestion window size
    pub cwnd: u32,
    /// Segments in flight
    pub snd_buf_size: u32,
    /// Out-of-order segments held for reassembly
    pub rcv_buf_size: u32,
}

/// Get current timestamp in milliseconds, truncated to 32 bits.
///
/// The engine never reads the clock itself; this is a convenience for
/// callers driving `update` and `check`.
pub fn current_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as Timestamp
}

/// Signed distance from `earlier` to `later`, tolerant of 32-bit wraparound.
///
/// Every sequence-number and timestamp ordering in the crate goes through
/// this function.
#[inline]
pub fn time_diff(later: u32, earlier: u32) -> i32 {
    later.wrapping_sub(earlier) as i32
}

/// Check if a sequence number is before another (handling wrapping)
#[inline]
pub fn seq_before(seq1: SeqNum, seq2: SeqNum) -> bool {
    time_diff(seq1, seq2) < 0
}

/// Check if a sequence number is after another (handling wrapping)
#[inline]
pub fn seq_after(seq1: SeqNum, seq2: SeqNum) -> bool {
    time_diff(seq1, seq2) > 0
}

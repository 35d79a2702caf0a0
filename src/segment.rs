//! The KCP segment: header fields, payload, and in-flight bookkeeping.

use crate::error::{KcpError, KcpResult};
use crate::protocol::{constants, Command, ConvId, SeqNum, Timestamp, Token};
use bytes::{BufMut, Bytes};

/// One protocol packet.
///
/// `resendts`, `rto`, `fastack` and `xmit` only matter while the segment
/// sits in the send buffer; they never go on the wire.
#[derive(Debug, Clone)]
pub struct Segment {
    pub conv: ConvId,
    pub token: Token,
    pub cmd: Command,
    pub frg: u8,
    pub wnd: u16,
    pub ts: Timestamp,
    pub sn: SeqNum,
    pub una: SeqNum,
    pub data: Bytes,

    // Internal fields for protocol logic
    pub resendts: Timestamp,
    pub rto: u32,
    pub fastack: u32,
    pub xmit: u32,
}

impl Segment {
    /// Size of the fixed header in bytes
    pub const HEADER_SIZE: usize = constants::KCP_OVERHEAD as usize;

    /// Create a new segment carrying `data`
    pub fn new(cmd: Command, data: Bytes) -> Self {
        Self {
            conv: 0,
            token: 0,
            cmd,
            frg: 0,
            wnd: 0,
            ts: 0,
            sn: 0,
            una: 0,
            data,
            resendts: 0,
            rto: 0,
            fastack: 0,
            xmit: 0,
        }
    }

    /// Create PUSH segment with the given fragment index
    pub fn push(data: Bytes, frg: u8) -> Self {
        let mut seg = Self::new(Command::Push, data);
        seg.frg = frg;
        seg
    }

    /// Create a payload-less control segment addressed to a session
    pub fn control(conv: ConvId, token: Token, cmd: Command, wnd: u16, una: SeqNum) -> Self {
        let mut seg = Self::new(cmd, Bytes::new());
        seg.conv = conv;
        seg.token = token;
        seg.wnd = wnd;
        seg.una = una;
        seg
    }

    /// Get total segment size on the wire
    #[inline]
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.data.len()
    }

    /// Write header and payload into `buf` starting at `offset`.
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buf: &mut [u8], offset: usize) -> KcpResult<usize> {
        let size = self.encoded_len();
        let available = buf.len().saturating_sub(offset);
        if available < size {
            return Err(KcpError::BufferTooSmall {
                needed: size,
                available,
            });
        }

        let mut dst = &mut buf[offset..offset + size];
        dst.put_u32_le(self.conv);
        dst.put_u32_le(self.token);
        dst.put_u8(self.cmd.into());
        dst.put_u8(self.frg);
        dst.put_u16_le(self.wnd);
        dst.put_u32_le(self.ts);
        dst.put_u32_le(self.sn);
        dst.put_u32_le(self.una);
        dst.put_u32_le(self.data.len() as u32);
        dst.put_slice(&self.data);
        Ok(size)
    }
}

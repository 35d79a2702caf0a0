//! Congestion window arithmetic (slow start, congestion avoidance, and the
//! two shrink rules applied after a flush).

use crate::protocol::constants;

/// Window control state, in segments except `incr` which is in bytes.
#[derive(Debug, Clone)]
pub struct CongestionWindow {
    cwnd: u32,
    ssthresh: u32,
    incr: u32,
}

impl Default for CongestionWindow {
    fn default() -> Self {
        Self {
            cwnd: 0,
            ssthresh: constants::KCP_THRESH_INIT,
            incr: 0,
        }
    }
}

impl CongestionWindow {
    #[inline]
    pub fn cwnd(&self) -> u32 {
        self.cwnd
    }

    #[inline]
    pub fn ssthresh(&self) -> u32 {
        self.ssthresh
    }

    #[inline]
    pub fn incr(&self) -> u32 {
        self.incr
    }

    /// Grow after an input batch that advanced `snd_una`.
    ///
    /// Does nothing once the window already reaches the peer's advertised
    /// window.
    pub fn on_ack(&mut self, mss: u32, rmt_wnd: u32) {
        if self.cwnd >= rmt_wnd {
            return;
        }

        if self.cwnd < self.ssthresh {
            self.cwnd += 1;
            self.incr = self.incr.saturating_add(mss);
        } else {
            if self.incr < mss {
                self.incr = mss;
            }
            let mss64 = u64::from(mss);
            let step = mss64 * mss64 / u64::from(self.incr.max(1)) + mss64 / 16;
            self.incr = (u64::from(self.incr) + step).min(u64::from(u32::MAX)) as u32;
            if (u64::from(self.cwnd) + 1) * mss64 <= u64::from(self.incr) {
                self.cwnd += 1;
            }
        }

        if self.cwnd > rmt_wnd {
            self.cwnd = rmt_wnd;
            self.incr = rmt_wnd.saturating_mul(mss);
        }
    }

    /// A retransmit deadline passed: multiplicative decrease to one segment.
    ///
    /// `cwnd_in_use` is the effective send window of the flush that saw the
    /// timeout.
    pub fn on_timeout(&mut self, cwnd_in_use: u32, mss: u32) {
        self.ssthresh = (cwnd_in_use / 2).max(constants::KCP_THRESH_MIN);
        self.cwnd = 1;
        self.incr = mss;
    }

    /// At least one segment went out through fast retransmit.
    pub fn on_fast_retransmit(&mut self, inflight: u32, resend: u32, mss: u32) {
        self.ssthresh = (inflight / 2).max(constants::KCP_THRESH_MIN);
        self.cwnd = self.ssthresh.saturating_add(resend);
        self.incr = self.cwnd.saturating_mul(mss);
    }

    /// Keep at least one segment of window open.
    pub fn ensure_open(&mut self, mss: u32) {
        if self.cwnd < 1 {
            self.cwnd = 1;
            self.incr = mss;
        }
    }
}

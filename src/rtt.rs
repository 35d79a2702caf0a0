//! Round-trip time estimation and retransmission timeout.

use crate::protocol::constants;

/// Smoothed RTT, RTT variance and the derived RTO.
#[derive(Debug, Clone)]
pub struct RttEstimator {
    srtt: u32,
    rttval: u32,
    rto: u32,
    min_rto: u32,
}

impl Default for RttEstimator {
    fn default() -> Self {
        Self {
            srtt: 0,
            rttval: 0,
            rto: constants::KCP_RTO_DEF,
            min_rto: constants::KCP_RTO_MIN,
        }
    }
}

impl RttEstimator {
    /// Feed one round-trip sample (milliseconds).
    ///
    /// `interval` is the flush interval, which bounds the variance term of
    /// the RTO from below.
    pub fn update(&mut self, rtt: u32, interval: u32) {
        if self.srtt == 0 {
            self.srtt = rtt;
            self.rttval = rtt / 2;
        } else {
            let delta = rtt.abs_diff(self.srtt);
            self.rttval = ((3 * u64::from(self.rttval) + u64::from(delta)) / 4) as u32;
            self.srtt = ((7 * u64::from(self.srtt) + u64::from(rtt)) / 8) as u32;
            if self.srtt < 1 {
                self.srtt = 1;
            }
        }

        let rto = u64::from(self.srtt) + u64::from(interval).max(4 * u64::from(self.rttval));
        let rto = rto.min(u64::from(constants::KCP_RTO_MAX)) as u32;
        self.rto = rto.max(self.min_rto);
    }

    /// Current retransmission timeout
    #[inline]
    pub fn rto(&self) -> u32 {
        self.rto
    }

    /// Smoothed RTT
    #[inline]
    pub fn srtt(&self) -> u32 {
        self.srtt
    }

    /// RTT variance
    #[inline]
    pub fn rttval(&self) -> u32 {
        self.rttval
    }

    pub fn min_rto(&self) -> u32 {
        self.min_rto
    }

    pub fn set_min_rto(&mut self, min_rto: u32) {
        self.min_rto = min_rto;
    }
}

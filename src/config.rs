//! Configuration types for the KCP control block

use crate::error::{KcpError, KcpResult};
use crate::protocol::constants;

/// Node delay configuration for different performance modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDelayConfig {
    /// Enable no-delay mode
    pub nodelay: bool,
    /// Internal update interval in milliseconds
    pub interval: u32,
    /// Fast resend threshold (0 disables fast retransmit)
    pub resend: u32,
    /// Disable congestion control
    pub no_congestion_control: bool,
}

impl Default for NodeDelayConfig {
    fn default() -> Self {
        Self::normal()
    }
}

impl NodeDelayConfig {
    /// Normal mode - balanced performance and reliability
    pub fn normal() -> Self {
        Self {
            nodelay: false,
            interval: constants::KCP_INTERVAL,
            resend: 0,
            no_congestion_control: false,
        }
    }

    /// Fast mode - optimized for low latency
    pub fn fast() -> Self {
        Self {
            nodelay: true,
            interval: 20,
            resend: 2,
            no_congestion_control: false,
        }
    }

    /// Turbo mode - minimum latency, congestion control off
    pub fn turbo() -> Self {
        Self {
            nodelay: true,
            interval: constants::KCP_INTERVAL_MIN,
            resend: 2,
            no_congestion_control: true,
        }
    }

    /// Custom configuration
    pub fn custom(nodelay: bool, interval: u32, resend: u32, no_congestion_control: bool) -> Self {
        Self {
            nodelay,
            interval,
            resend,
            no_congestion_control,
        }
    }
}

/// Tunables for one control block.
///
/// Conversation id, token and the output sink are not part of the config;
/// they are fixed per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KcpConfig {
    /// Maximum transmission unit
    pub mtu: u32,
    /// Send window size
    pub snd_wnd: u32,
    /// Receive window size
    pub rcv_wnd: u32,
    /// Node delay configuration
    pub nodelay: NodeDelayConfig,
    /// Override for the minimum RTO (otherwise chosen by nodelay mode)
    pub min_rto: Option<u32>,
    /// Transmissions of one segment before the link is declared dead
    pub dead_link: u32,
    /// Enable stream mode (no message boundaries)
    pub stream_mode: bool,
}

impl Default for KcpConfig {
    fn default() -> Self {
        Self {
            mtu: constants::KCP_MTU_DEF,
            snd_wnd: constants::KCP_WND_SND,
            rcv_wnd: constants::KCP_WND_RCV,
            nodelay: NodeDelayConfig::normal(),
            min_rto: None,
            dead_link: constants::KCP_DEADLINK,
            stream_mode: false,
        }
    }
}

impl KcpConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set MTU (Maximum Transmission Unit)
    pub fn mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set send window size
    pub fn send_window(mut self, wnd: u32) -> Self {
        self.snd_wnd = wnd;
        self
    }

    /// Set receive window size
    pub fn recv_window(mut self, wnd: u32) -> Self {
        self.rcv_wnd = wnd;
        self
    }

    /// Set both send and receive window sizes
    pub fn window_size(mut self, snd_wnd: u32, rcv_wnd: u32) -> Self {
        self.snd_wnd = snd_wnd;
        self.rcv_wnd = rcv_wnd;
        self
    }

    /// Use normal mode (default)
    pub fn normal_mode(mut self) -> Self {
        self.nodelay = NodeDelayConfig::normal();
        self
    }

    /// Use fast mode for low latency
    pub fn fast_mode(mut self) -> Self {
        self.nodelay = NodeDelayConfig::fast();
        self
    }

    /// Use turbo mode for maximum performance
    pub fn turbo_mode(mut self) -> Self {
        self.nodelay = NodeDelayConfig::turbo();
        self
    }

    /// Set custom node delay configuration
    pub fn nodelay_config(mut self, config: NodeDelayConfig) -> Self {
        self.nodelay = config;
        self
    }

    /// Override the minimum RTO
    pub fn min_rto(mut self, rto: u32) -> Self {
        self.min_rto = Some(rto);
        self
    }

    /// Set the dead-link retransmission threshold
    pub fn dead_link(mut self, xmit: u32) -> Self {
        self.dead_link = xmit;
        self
    }

    /// Enable stream mode (no message boundaries)
    pub fn stream_mode(mut self, enabled: bool) -> Self {
        self.stream_mode = enabled;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> KcpResult<()> {
        if self.mtu < constants::KCP_MTU_MIN || self.mtu > constants::KCP_MTU_MAX {
            return Err(KcpError::config("MTU must be between 50 and 65535"));
        }

        if !(constants::KCP_INTERVAL_MIN..=constants::KCP_INTERVAL_MAX)
            .contains(&self.nodelay.interval)
        {
            return Err(KcpError::config(
                "Update interval must be between 10 and 5000 ms",
            ));
        }

        if self.snd_wnd == 0 || self.rcv_wnd == 0 {
            return Err(KcpError::config("Window sizes must be greater than 0"));
        }

        if self.snd_wnd > u32::from(u16::MAX) || self.rcv_wnd > u32::from(u16::MAX) {
            return Err(KcpError::config("Window sizes must fit in 16 bits"));
        }

        if self.dead_link == 0 {
            return Err(KcpError::config("Dead link threshold must be greater than 0"));
        }

        Ok(())
    }
}

/// Preset configurations for common use cases
impl KcpConfig {
    /// Configuration optimized for games
    pub fn gaming() -> Self {
        Self::default()
            .turbo_mode()
            .window_size(128, 256)
            .mtu(1200)
    }

    /// Configuration optimized for file transfers
    pub fn file_transfer() -> Self {
        Self::default()
            .normal_mode()
            .window_size(256, 1024)
            .stream_mode(true)
    }

    /// Configuration optimized for real-time communication
    pub fn realtime() -> Self {
        Self::default()
            .fast_mode()
            .window_size(64, 256)
            .mtu(1200)
    }
}

//! Window probe state: asking a peer for its window and telling ours.

use crate::protocol::{constants, time_diff, Command, Timestamp};

/// Probe flags plus the backoff used while the remote window is closed.
#[derive(Debug, Default, Clone)]
pub struct WindowProbe {
    flags: u32,
    wait: u32,
    ts: Timestamp,
}

impl WindowProbe {
    /// Advance the probe timer for one flush cycle.
    pub fn schedule(&mut self, rmt_wnd: u32, current: Timestamp) {
        if rmt_wnd == 0 {
            if self.wait == 0 {
                self.wait = constants::KCP_PROBE_INIT;
                self.ts = current.wrapping_add(self.wait);
            } else if time_diff(current, self.ts) >= 0 {
                self.wait = self
                    .wait
                    .saturating_add(self.wait)
                    .min(constants::KCP_PROBE_LIMIT);
                self.ts = current.wrapping_add(self.wait);
                self.flags |= constants::KCP_ASK_SEND;
            }
        } else {
            // integer half-step kept as-is for timing compatibility with peers
            self.wait += self.wait / 2;
            if self.wait > constants::KCP_PROBE_LIMIT {
                self.wait = constants::KCP_PROBE_LIMIT;
            }
            self.ts = current.wrapping_add(self.wait);
            self.flags |= constants::KCP_ASK_SEND;
        }
    }

    /// Ask for a WINS on the next flush
    #[inline]
    pub fn request_tell(&mut self) {
        self.flags |= constants::KCP_ASK_TELL;
    }

    #[inline]
    pub fn wants_ask(&self) -> bool {
        self.flags & constants::KCP_ASK_SEND != 0
    }

    #[inline]
    pub fn wants_tell(&self) -> bool {
        self.flags & constants::KCP_ASK_TELL != 0
    }

    /// Commands owed this flush, in emission order; clears the flags.
    pub fn take_commands(&mut self) -> impl Iterator<Item = Command> {
        let ask = self.wants_ask().then_some(Command::WindowAsk);
        let tell = self.wants_tell().then_some(Command::WindowTell);
        self.flags = 0;
        ask.into_iter().chain(tell)
    }

    /// Current backoff in milliseconds
    #[inline]
    pub fn wait(&self) -> u32 {
        self.wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_window_arms_then_asks_when_due() {
        let mut probe = WindowProbe::default();
        probe.schedule(0, 1000);
        assert_eq!(probe.wait(), constants::KCP_PROBE_INIT);
        assert!(!probe.wants_ask());

        probe.schedule(0, 1000 + constants::KCP_PROBE_INIT - 1);
        assert!(!probe.wants_ask());

        probe.schedule(0, 1000 + constants::KCP_PROBE_INIT);
        assert!(probe.wants_ask());
        assert_eq!(probe.wait(), 2 * constants::KCP_PROBE_INIT);
    }

    #[test]
    fn zero_window_backoff_capped() {
        let mut probe = WindowProbe::default();
        let mut now = 0u32;
        probe.schedule(0, now);
        for _ in 0..20 {
            now = now.wrapping_add(probe.wait());
            probe.schedule(0, now);
        }
        assert_eq!(probe.wait(), constants::KCP_PROBE_LIMIT);
    }

    #[test]
    fn open_window_grows_by_half_steps() {
        let mut probe = WindowProbe::default();
        probe.schedule(5, 0);
        assert_eq!(probe.wait(), 0);
        assert!(probe.wants_ask());

        probe.schedule(0, 0);
        assert_eq!(probe.wait(), constants::KCP_PROBE_INIT);
        probe.schedule(5, 10);
        assert_eq!(probe.wait(), 10500);
        for _ in 0..30 {
            probe.schedule(5, 10);
        }
        assert_eq!(probe.wait(), constants::KCP_PROBE_LIMIT);
    }

    #[test]
    fn commands_in_order_and_cleared() {
        let mut probe = WindowProbe::default();
        probe.schedule(1, 0);
        probe.request_tell();
        let cmds: Vec<_> = probe.take_commands().collect();
        assert_eq!(cmds, vec![Command::WindowAsk, Command::WindowTell]);
        assert!(!probe.wants_ask());
        assert!(!probe.wants_tell());
        assert_eq!(probe.take_commands().count(), 0);
    }
}

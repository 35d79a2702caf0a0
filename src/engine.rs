//! The KCP control block.
//!
//! One [`KcpEngine`] per logical connection. It never touches a socket or a
//! clock: callers feed datagrams through [`KcpEngine::input`], drive time
//! through [`KcpEngine::update`], and receive wire chunks through the output
//! closure handed to the constructor.

use crate::config::KcpConfig;
use crate::congestion::CongestionWindow;
use crate::error::{KcpError, KcpResult};
use crate::probe::WindowProbe;
use crate::protocol::*;
use crate::rtt::RttEstimator;
use crate::segment::Segment;

use bytes::{Buf, Bytes, BytesMut};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Output function type for sending packets
pub type OutputFn = Box<dyn FnMut(&[u8]) + Send>;

const HEADER_SIZE: usize = Segment::HEADER_SIZE;

/// Connection health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Alive,
    Dead,
}

/// Packs encoded segments into the scratch buffer and hands the sink one
/// chunk of at most `mtu` bytes at a time.
struct ChunkWriter<'a> {
    buf: &'a mut [u8],
    output: &'a mut OutputFn,
    mtu: usize,
    offset: usize,
    chunks: u64,
}

impl<'a> ChunkWriter<'a> {
    fn new(buf: &'a mut [u8], output: &'a mut OutputFn, mtu: usize) -> Self {
        Self {
            buf,
            output,
            mtu,
            offset: 0,
            chunks: 0,
        }
    }

    fn write(&mut self, segment: &Segment) -> KcpResult<()> {
        if self.offset + segment.encoded_len() > self.mtu {
            self.emit();
        }
        self.offset += segment.encode(self.buf, self.offset)?;
        Ok(())
    }

    fn emit(&mut self) {
        if self.offset > 0 {
            (self.output)(&self.buf[..self.offset]);
            self.chunks += 1;
            self.offset = 0;
        }
    }

    /// Emit the remainder; returns the number of chunks produced.
    fn finish(mut self) -> u64 {
        self.emit();
        self.chunks
    }
}

/// KCP control block implementing the core protocol logic
pub struct KcpEngine {
    // Core
    conv: ConvId,
    token: Token,
    stream: bool,
    mtu: u32,
    mss: u32,
    state: LinkState,

    // Sequence numbers
    snd_una: SeqNum,
    snd_nxt: SeqNum,
    rcv_nxt: SeqNum,

    // Timing and window
    rtt: RttEstimator,
    cc: CongestionWindow,
    probe: WindowProbe,
    snd_wnd: u32,
    rcv_wnd: u32,
    rmt_wnd: u32,

    // Scheduling
    current: Timestamp,
    interval: u32,
    ts_flush: Timestamp,
    updated: bool,

    // Tunables
    nodelay: bool,
    fast_resend: u32,
    nocwnd: bool,
    dead_link: u32,

    // Buffers
    snd_queue: VecDeque<Segment>,
    snd_buf: VecDeque<Segment>,
    rcv_buf: VecDeque<Segment>,
    rcv_queue: VecDeque<Segment>,
    ack_list: Vec<(SeqNum, Timestamp)>,
    buf: BytesMut,

    output: OutputFn,
    stats: KcpStats,
}

impl KcpEngine {
    /// Create a control block for a pre-established conversation.
    ///
    /// `output` is called once per outbound chunk, only from within
    /// [`flush`](Self::flush).
    pub fn new<F>(conv: ConvId, token: Token, stream: bool, output: F) -> Self
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let mtu = constants::KCP_MTU_DEF;
        debug!(conv = %conv, token = %token, stream, "KCP control block created");

        Self {
            conv,
            token,
            stream,
            mtu,
            mss: mtu - constants::KCP_OVERHEAD,
            state: LinkState::Alive,

            snd_una: 0,
            snd_nxt: 0,
            rcv_nxt: 0,

            rtt: RttEstimator::default(),
            cc: CongestionWindow::default(),
            probe: WindowProbe::default(),
            snd_wnd: constants::KCP_WND_SND,
            rcv_wnd: constants::KCP_WND_RCV,
            rmt_wnd: constants::KCP_WND_RCV,

            current: 0,
            interval: constants::KCP_INTERVAL,
            ts_flush: constants::KCP_INTERVAL,
            updated: false,

            nodelay: false,
            fast_resend: 0,
            nocwnd: false,
            dead_link: constants::KCP_DEADLINK,

            snd_queue: VecDeque::new(),
            snd_buf: VecDeque::new(),
            rcv_buf: VecDeque::new(),
            rcv_queue: VecDeque::new(),
            ack_list: Vec::new(),
            buf: Self::scratch_buffer(mtu),

            output: Box::new(output),
            stats: KcpStats::default(),
        }
    }

    /// Create a control block and apply a validated [`KcpConfig`].
    pub fn with_config<F>(conv: ConvId, token: Token, config: &KcpConfig, output: F) -> KcpResult<Self>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        config.validate()?;

        let mut engine = Self::new(conv, token, config.stream_mode, output);
        engine.set_mtu(config.mtu);
        engine.set_wndsize(config.snd_wnd, config.rcv_wnd);
        engine.set_interval(config.nodelay.interval);
        engine.set_nodelay(
            config.nodelay.nodelay,
            config.nodelay.resend,
            config.nodelay.no_congestion_control,
        );
        if let Some(rto) = config.min_rto {
            engine.set_rx_minrto(rto);
        }
        engine.set_dead_link(config.dead_link);
        Ok(engine)
    }

    fn scratch_buffer(mtu: u32) -> BytesMut {
        BytesMut::zeroed((mtu as usize + constants::KCP_OVERHEAD as usize) * 3)
    }

    // ── Send path ───────────────────────────────────────────────────────

    /// Queue data for sending. Returns the number of bytes accepted.
    ///
    /// In message mode each call becomes one logical message split into
    /// fragments. In stream mode small writes are first merged into the
    /// tail segment of the send queue.
    pub fn send(&mut self, data: Bytes) -> KcpResult<usize> {
        if self.is_dead_link() {
            return Err(KcpError::ConnectionLost);
        }

        let mss = self.mss as usize;
        let mut data = data;

        let merge = match self.snd_queue.back() {
            Some(tail) if self.stream && tail.data.len() < mss => {
                data.len().min(mss - tail.data.len())
            }
            _ => 0,
        };
        let rest = data.len() - merge;

        // an empty stream write has no boundary to preserve, so nothing is queued
        let count = if self.stream && rest == 0 {
            0
        } else if rest <= mss {
            1
        } else {
            rest.div_ceil(mss)
        };
        if count >= constants::KCP_WND_RCV as usize {
            return Err(KcpError::TooManyFragments {
                count,
                limit: constants::KCP_WND_RCV as usize,
            });
        }

        let mut sent = 0;
        if merge > 0 {
            if let Some(tail) = self.snd_queue.back_mut() {
                let mut merged = BytesMut::with_capacity(tail.data.len() + merge);
                merged.extend_from_slice(&tail.data);
                merged.extend_from_slice(&data[..merge]);
                tail.data = merged.freeze();
                tail.frg = 0;
                data.advance(merge);
                sent += merge;
            }
        }

        for i in 0..count {
            let size = mss.min(data.len());
            let fragment = data.split_to(size);
            let frg = if self.stream { 0 } else { (count - i - 1) as u8 };
            self.snd_queue.push_back(Segment::push(fragment, frg));
            sent += size;
        }

        self.stats.bytes_sent += sent as u64;

        trace!(
            conv = %self.conv,
            bytes = sent,
            fragments = count,
            "Data queued for sending"
        );

        Ok(sent)
    }

    // ── Receive path ────────────────────────────────────────────────────

    /// Size of the next complete message, or `None` while the receive queue
    /// is empty or the head message still misses fragments.
    pub fn peek_size(&self) -> Option<usize> {
        let seg = self.rcv_queue.front()?;
        if seg.frg == 0 {
            return Some(seg.data.len());
        }

        if self.rcv_queue.len() < usize::from(seg.frg) + 1 {
            return None;
        }

        let mut length = 0;
        for segment in &self.rcv_queue {
            length += segment.data.len();
            if segment.frg == 0 {
                break;
            }
        }
        Some(length)
    }

    /// Copy the next complete message into `buf`. Returns its length.
    pub fn recv(&mut self, buf: &mut [u8]) -> KcpResult<usize> {
        if self.rcv_queue.is_empty() {
            return Err(KcpError::RecvQueueEmpty);
        }

        let peek_size = self.peek_size().ok_or(KcpError::IncompleteMessage)?;
        if peek_size > buf.len() {
            return Err(KcpError::BufferTooSmall {
                needed: peek_size,
                available: buf.len(),
            });
        }

        // Check if we were window-limited before
        let recover = self.rcv_queue.len() >= self.rcv_wnd as usize;

        let mut offset = 0;
        while let Some(segment) = self.rcv_queue.pop_front() {
            let len = segment.data.len();
            buf[offset..offset + len].copy_from_slice(&segment.data);
            offset += len;
            if segment.frg == 0 {
                break;
            }
        }

        self.move_buf();

        // Tell the peer the window reopened
        if recover && self.rcv_queue.len() < self.rcv_wnd as usize {
            self.probe.request_tell();
        }

        self.stats.bytes_received += offset as u64;

        trace!(conv = %self.conv, bytes = offset, "Data received");

        Ok(offset)
    }

    /// Move contiguous segments from the receive buffer to the receive queue.
    fn move_buf(&mut self) {
        while let Some(segment) = self.rcv_buf.front() {
            if segment.sn != self.rcv_nxt || self.rcv_queue.len() >= self.rcv_wnd as usize {
                break;
            }
            if let Some(segment) = self.rcv_buf.pop_front() {
                self.rcv_queue.push_back(segment);
                self.rcv_nxt = self.rcv_nxt.wrapping_add(1);
            }
        }
    }

    fn parse_data(&mut self, newseg: Segment) {
        let sn = newseg.sn;

        if time_diff(sn, self.rcv_nxt.wrapping_add(self.rcv_wnd)) >= 0
            || time_diff(sn, self.rcv_nxt) < 0
        {
            return;
        }

        // Insert in order, scanning from the tail
        let mut insert_pos = self.rcv_buf.len();
        let mut repeat = false;

        for segment in self.rcv_buf.iter().rev() {
            if segment.sn == sn {
                repeat = true;
                break;
            }
            if seq_after(sn, segment.sn) {
                break;
            }
            insert_pos -= 1;
        }

        if !repeat {
            self.rcv_buf.insert(insert_pos, newseg);
        }

        self.move_buf();
    }

    // ── Acknowledgment tracking ─────────────────────────────────────────

    fn ack_push(&mut self, sn: SeqNum, ts: Timestamp) {
        self.ack_list.push((sn, ts));
    }

    /// Drop every in-flight segment below the cumulative ack.
    fn parse_una(&mut self, una: SeqNum) {
        while let Some(segment) = self.snd_buf.front() {
            if seq_before(segment.sn, una) {
                self.snd_buf.pop_front();
            } else {
                break;
            }
        }
    }

    fn parse_ack(&mut self, sn: SeqNum) {
        if seq_before(sn, self.snd_una) || !seq_before(sn, self.snd_nxt) {
            return;
        }

        let found = self
            .snd_buf
            .iter()
            .take_while(|seg| !seq_after(seg.sn, sn))
            .position(|seg| seg.sn == sn);
        if let Some(index) = found {
            self.snd_buf.remove(index);
        }
    }

    /// Count one skip for every in-flight segment older than `sn`.
    fn parse_fast_ack(&mut self, sn: SeqNum) {
        if seq_before(sn, self.snd_una) || !seq_before(sn, self.snd_nxt) {
            return;
        }

        for segment in &mut self.snd_buf {
            if seq_after(segment.sn, sn) {
                break;
            }
            if segment.sn != sn {
                segment.fastack += 1;
            }
        }
    }

    fn shrink_buf(&mut self) {
        self.snd_una = match self.snd_buf.front() {
            Some(segment) => segment.sn,
            None => self.snd_nxt,
        };
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Process one datagram of back-to-back segments.
    ///
    /// Returns the number of bytes consumed. A bad segment aborts the call;
    /// segments before it have already been applied.
    pub fn input(&mut self, data: &[u8]) -> KcpResult<usize> {
        let old_una = self.snd_una;
        let mut rest = data;
        let mut consumed = 0;
        let mut max_ack: Option<SeqNum> = None;

        while rest.len() >= HEADER_SIZE {
            let mut header = &rest[..HEADER_SIZE];
            let conv = header.get_u32_le();
            let token = header.get_u32_le();
            let cmd = header.get_u8();
            let frg = header.get_u8();
            let wnd = header.get_u16_le();
            let ts = header.get_u32_le();
            let sn = header.get_u32_le();
            let una = header.get_u32_le();
            let len = header.get_u32_le() as usize;

            if conv != self.conv || token != self.token {
                warn!(
                    conv = %self.conv,
                    packet_conv = %conv,
                    packet_token = %token,
                    "Conversation mismatch"
                );
                return Err(KcpError::ConversationMismatch { conv, token });
            }

            let available = rest.len() - HEADER_SIZE;
            if available < len {
                warn!(conv = %self.conv, declared = len, available, "Truncated segment");
                return Err(KcpError::Truncated {
                    declared: len,
                    available,
                });
            }

            let cmd = match Command::try_from(cmd) {
                Ok(cmd) => cmd,
                Err(err) => {
                    warn!(conv = %self.conv, cmd, "Unknown command");
                    return Err(err);
                }
            };

            self.rmt_wnd = u32::from(wnd);
            self.parse_una(una);
            self.shrink_buf();

            match cmd {
                Command::Ack => {
                    let rtt = time_diff(self.current, ts);
                    if rtt >= 0 {
                        self.rtt.update(rtt as u32, self.interval);
                    }
                    self.parse_ack(sn);
                    self.shrink_buf();

                    max_ack = match max_ack {
                        Some(max) if !seq_after(sn, max) => Some(max),
                        _ => Some(sn),
                    };
                }

                Command::Push => {
                    if seq_before(sn, self.rcv_nxt.wrapping_add(self.rcv_wnd)) {
                        self.ack_push(sn, ts);

                        if !seq_before(sn, self.rcv_nxt) {
                            let mut segment = Segment::push(
                                Bytes::copy_from_slice(&rest[HEADER_SIZE..HEADER_SIZE + len]),
                                frg,
                            );
                            segment.conv = conv;
                            segment.token = token;
                            segment.wnd = wnd;
                            segment.ts = ts;
                            segment.sn = sn;
                            segment.una = una;
                            self.parse_data(segment);
                        }
                    }
                }

                Command::WindowAsk => {
                    self.probe.request_tell();
                }

                Command::WindowTell => {}
            }

            consumed += HEADER_SIZE + len;
            rest = &rest[HEADER_SIZE + len..];
        }

        if consumed == 0 {
            return Ok(0);
        }

        if let Some(sn) = max_ack {
            self.parse_fast_ack(sn);
        }

        if seq_after(self.snd_una, old_una) {
            let before = self.cc.cwnd();
            self.cc.on_ack(self.mss, self.rmt_wnd);
            if self.cc.cwnd() != before {
                debug!(conv = %self.conv, cwnd = self.cc.cwnd(), "Congestion window grew");
            }
        }

        self.stats.packets_received += 1;

        trace!(conv = %self.conv, size = consumed, "Packet processed");

        Ok(consumed)
    }

    // ── Flush & scheduling ──────────────────────────────────────────────

    fn wnd_unused(&self) -> u32 {
        (self.rcv_wnd).saturating_sub(self.rcv_queue.len() as u32)
    }

    /// Emit pending acks, window probes, new data and due retransmissions.
    ///
    /// Does nothing until [`update`](Self::update) has been called once.
    pub fn flush(&mut self) -> KcpResult<()> {
        if !self.updated {
            return Ok(());
        }

        let current = self.current;
        let wnd = self.wnd_unused().min(u32::from(u16::MAX)) as u16;
        let mut writer = ChunkWriter::new(&mut self.buf[..], &mut self.output, self.mtu as usize);

        // Pending acks
        let mut ack = Segment::control(self.conv, self.token, Command::Ack, wnd, self.rcv_nxt);
        for &(sn, ts) in &self.ack_list {
            ack.sn = sn;
            ack.ts = ts;
            writer.write(&ack)?;
        }
        self.ack_list.clear();

        // Window probes
        self.probe.schedule(self.rmt_wnd, current);
        for cmd in self.probe.take_commands() {
            trace!(conv = %self.conv, cmd = cmd.as_str(), "Window probe");
            let probe = Segment::control(self.conv, self.token, cmd, wnd, self.rcv_nxt);
            writer.write(&probe)?;
        }

        // Move data from send queue to send buffer
        let mut cwnd = self.snd_wnd.min(self.rmt_wnd);
        if !self.nocwnd {
            cwnd = cwnd.min(self.cc.cwnd());
        }

        while seq_before(self.snd_nxt, self.snd_una.wrapping_add(cwnd)) {
            let Some(mut segment) = self.snd_queue.pop_front() else {
                break;
            };
            segment.conv = self.conv;
            segment.token = self.token;
            segment.cmd = Command::Push;
            segment.wnd = wnd;
            segment.ts = current;
            segment.sn = self.snd_nxt;
            segment.una = self.rcv_nxt;
            segment.resendts = current;
            segment.rto = self.rtt.rto();
            segment.fastack = 0;
            segment.xmit = 0;

            self.snd_buf.push_back(segment);
            self.snd_nxt = self.snd_nxt.wrapping_add(1);
        }

        // Transmit new segments and anything due for retransmission
        let resend = if self.fast_resend > 0 {
            self.fast_resend
        } else {
            u32::MAX
        };
        let rtomin = if self.nodelay { 0 } else { self.rtt.rto() >> 3 };
        let rx_rto = self.rtt.rto();

        let mut lost = false;
        let mut change = 0u32;
        let mut timeouts = 0u64;

        for segment in self.snd_buf.iter_mut() {
            let mut needsend = false;

            if segment.xmit == 0 {
                needsend = true;
                segment.xmit = 1;
                segment.rto = rx_rto;
                segment.resendts = current.wrapping_add(segment.rto).wrapping_add(rtomin);
            } else if time_diff(current, segment.resendts) >= 0 {
                needsend = true;
                segment.xmit += 1;
                segment.rto += if self.nodelay { rx_rto / 2 } else { rx_rto };
                segment.resendts = current.wrapping_add(segment.rto);
                lost = true;
                timeouts += 1;
                debug!(
                    conv = %self.conv,
                    sn = segment.sn,
                    xmit = segment.xmit,
                    rto = segment.rto,
                    "Retransmit on timeout"
                );
            } else if segment.fastack >= resend {
                needsend = true;
                segment.xmit += 1;
                segment.fastack = 0;
                segment.resendts = current.wrapping_add(segment.rto);
                change += 1;
                debug!(conv = %self.conv, sn = segment.sn, "Fast retransmit");
            }

            if needsend {
                segment.ts = current;
                segment.wnd = wnd;
                segment.una = self.rcv_nxt;
                writer.write(segment)?;

                if segment.xmit >= self.dead_link && self.state == LinkState::Alive {
                    self.state = LinkState::Dead;
                    warn!(
                        conv = %self.conv,
                        sn = segment.sn,
                        xmit = segment.xmit,
                        "Dead link: retransmission limit reached"
                    );
                }
            }
        }

        let chunks = writer.finish();

        self.stats.packets_sent += chunks;
        self.stats.retransmissions += timeouts;
        self.stats.fast_retransmissions += u64::from(change);

        if chunks > 0 {
            trace!(conv = %self.conv, chunks, "Flushed");
        }

        // Update congestion control state
        if change > 0 {
            let inflight = self.snd_nxt.wrapping_sub(self.snd_una);
            self.cc.on_fast_retransmit(inflight, resend, self.mss);
        }

        if lost {
            self.cc.on_timeout(cwnd, self.mss);
        }

        self.cc.ensure_open(self.mss);

        if change > 0 || lost {
            debug!(
                conv = %self.conv,
                cwnd = self.cc.cwnd(),
                ssthresh = self.cc.ssthresh(),
                "Congestion window reduced"
            );
        }

        Ok(())
    }

    /// Drive the clock. Flushes once per interval.
    pub fn update(&mut self, current: Timestamp) -> KcpResult<()> {
        self.current = current;

        if !self.updated {
            self.updated = true;
            self.ts_flush = current;
        }

        let mut slap = time_diff(current, self.ts_flush);
        if !(-constants::KCP_CLOCK_JUMP..constants::KCP_CLOCK_JUMP).contains(&slap) {
            self.ts_flush = current;
            slap = 0;
        }

        if slap >= 0 {
            self.ts_flush = self.ts_flush.wrapping_add(self.interval);
            if time_diff(current, self.ts_flush) >= 0 {
                self.ts_flush = current.wrapping_add(self.interval);
            }
            self.flush()?;
        }

        Ok(())
    }

    /// Milliseconds until [`update`](Self::update) has work to do; 0 means
    /// call it now.
    pub fn check(&self, current: Timestamp) -> u32 {
        if !self.updated {
            return 0;
        }

        let mut ts_flush = self.ts_flush;
        let slap = time_diff(current, ts_flush);
        if !(-constants::KCP_CLOCK_JUMP..constants::KCP_CLOCK_JUMP).contains(&slap) {
            ts_flush = current;
        }

        if time_diff(current, ts_flush) >= 0 {
            return 0;
        }

        let tm_flush = time_diff(ts_flush, current) as u32;
        let mut tm_packet = u32::MAX;
        for segment in &self.snd_buf {
            let diff = time_diff(segment.resendts, current);
            if diff <= 0 {
                return 0;
            }
            tm_packet = tm_packet.min(diff as u32);
        }

        tm_packet.min(tm_flush).min(self.interval)
    }

    // ── Tunables ────────────────────────────────────────────────────────

    /// Set the MTU, clamped to [50, 65535] bytes, and resize the scratch
    /// buffer.
    pub fn set_mtu(&mut self, mtu: u32) {
        let mtu = mtu.clamp(constants::KCP_MTU_MIN, constants::KCP_MTU_MAX);
        self.mtu = mtu;
        self.mss = mtu - constants::KCP_OVERHEAD;
        self.buf = Self::scratch_buffer(mtu);
    }

    /// Set the flush interval, clamped to [10, 5000] ms.
    pub fn set_interval(&mut self, interval: u32) {
        self.interval = interval.clamp(constants::KCP_INTERVAL_MIN, constants::KCP_INTERVAL_MAX);
    }

    /// Configure nodelay mode, the fast resend threshold (0 disables fast
    /// retransmit) and whether congestion control is bypassed.
    pub fn set_nodelay(&mut self, nodelay: bool, resend: u32, nc: bool) {
        self.nodelay = nodelay;
        self.rtt.set_min_rto(if nodelay {
            constants::KCP_RTO_NDL
        } else {
            constants::KCP_RTO_MIN
        });
        self.fast_resend = resend;
        self.nocwnd = nc;
    }

    /// Set send and receive windows in segments; the receive window never
    /// drops below 256.
    pub fn set_wndsize(&mut self, snd_wnd: u32, rcv_wnd: u32) {
        self.snd_wnd = snd_wnd & 0xffff;
        self.rcv_wnd = (rcv_wnd & 0xffff).max(constants::KCP_WND_RCV);
    }

    pub fn set_rx_minrto(&mut self, rto: u32) {
        self.rtt.set_min_rto(rto);
    }

    pub fn set_fast_resend(&mut self, resend: u32) {
        self.fast_resend = resend;
    }

    /// Transmissions of a single segment after which the link is dead.
    pub fn set_dead_link(&mut self, xmit: u32) {
        self.dead_link = xmit;
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Segments not yet acknowledged (in flight plus queued)
    pub fn wait_snd(&self) -> usize {
        self.snd_buf.len() + self.snd_queue.len()
    }

    pub fn snd_wnd(&self) -> u32 {
        self.snd_wnd
    }

    pub fn rcv_wnd(&self) -> u32 {
        self.rcv_wnd
    }

    /// Window last advertised by the peer
    pub fn remote_window(&self) -> u32 {
        self.rmt_wnd
    }

    pub fn cwnd(&self) -> u32 {
        self.cc.cwnd()
    }

    pub fn rto(&self) -> u32 {
        self.rtt.rto()
    }

    pub fn header_len(&self) -> usize {
        HEADER_SIZE
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    pub fn mss(&self) -> u32 {
        self.mss
    }

    pub fn mtu(&self) -> u32 {
        self.mtu
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn conv(&self) -> ConvId {
        self.conv
    }

    pub fn token(&self) -> Token {
        self.token
    }

    /// True once any segment reached the dead-link transmission count.
    /// The state is terminal.
    pub fn is_dead_link(&self) -> bool {
        self.state == LinkState::Dead
    }

    /// Get current statistics
    pub fn stats(&self) -> KcpStats {
        KcpStats {
            rtt: self.rtt.srtt(),
            rtt_var: self.rtt.rttval(),
            rto: self.rtt.rto(),
            snd_wnd: self.snd_wnd,
            rcv_wnd: self.rcv_wnd,
            rmt_wnd: self.rmt_wnd,
            cwnd: self.cc.cwnd(),
            snd_buf_size: self.snd_buf.len() as u32,
            rcv_buf_size: self.rcv_buf.len() as u32,
            ..self.stats
        }
    }
}

impl std::fmt::Debug for KcpEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KcpEngine")
            .field("conv", &self.conv)
            .field("token", &self.token)
            .field("snd_una", &self.snd_una)
            .field("snd_nxt", &self.snd_nxt)
            .field("rcv_nxt", &self.rcv_nxt)
            .field("cwnd", &self.cc.cwnd())
            .field("rmt_wnd", &self.rmt_wnd)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// channel.rs — reliable-ordered delivery on top of an unreliable datagram
// socket: per-peer sequence numbers, retransmission of reliable sends,
// duplicate suppression, and a packet-loss monitor.
//
// Mirrors the shape of `net_chan.rs` (`NetChan`,
// `netchan_transmit`/`netchan_process`, resend-on-timeout), generalized
// from quake2's single fixed-size reliable buffer with qport
// disambiguation to a per-sequence map keyed by plain `SocketAddr` (rooms
// here key clients by `player_id`, so no qport-style 1-byte disambiguator
// is needed).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::wire::PacketType;

/// How often the resend sweep runs and the minimum time an unacked entry
/// must sit before it is retransmitted.
pub const MIN_RESEND_INTERVAL: Duration = Duration::from_millis(500);

/// An unacked reliable packet is dropped after this many resend attempts.
pub const MAX_RESEND: u32 = 5;

/// `last_processed_seq` entries older than this are evicted by the sweep.
pub const STALE_ENTRY_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct UnackedPacket {
    bytes: Vec<u8>,
    resend_count: u32,
    last_sent: Instant,
}

/// Per-peer reliable-delivery bookkeeping. One instance is shared (behind a
/// mutex) between the socket thread, which calls [`ReliableChannel::on_ack`]
/// and [`ReliableChannel::on_receive`], and the retransmission thread, which
/// calls [`ReliableChannel::sweep_resends`].
pub struct ReliableChannel {
    inner: Mutex<ChannelState>,
}

struct ChannelState {
    next_sequence: u32,
    unacked: HashMap<u32, UnackedPacket>,
    last_processed_seq: HashMap<(SocketAddr, PacketType), (u32, Instant)>,
    loss_monitor: LossMonitor,
}

impl Default for ReliableChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReliableChannel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ChannelState {
                next_sequence: 1,
                unacked: HashMap::new(),
                last_processed_seq: HashMap::new(),
                loss_monitor: LossMonitor::new(),
            }),
        }
    }

    /// Allocate the next outgoing sequence number and, if `reliable`,
    /// register `bytes` for retransmission until acked or dropped.
    pub fn send(&self, bytes: Vec<u8>, reliable: bool) -> u32 {
        let mut state = self.inner.lock();
        let seq = state.next_sequence;
        state.next_sequence += 1;
        if reliable {
            state.unacked.insert(
                seq,
                UnackedPacket { bytes, resend_count: 0, last_sent: Instant::now() },
            );
        }
        seq
    }

    /// Remove the unacked entry for `seq` on receipt of an explicit ACK.
    pub fn on_ack(&self, seq: u32) {
        self.inner.lock().unacked.remove(&seq);
    }

    /// Record that a reliable packet of `kind` with `seq` arrived from
    /// `peer`. Returns `true` if this is the first time this sequence (or a
    /// newer one) has been seen for that (peer, kind) pair — `false` means
    /// it's a duplicate/stale arrival that should be acked but otherwise
    /// dropped. Also feeds the packet-loss monitor.
    pub fn on_receive(&self, peer: SocketAddr, kind: PacketType, seq: u32) -> bool {
        let mut state = self.inner.lock();
        state.loss_monitor.observe(seq);

        let key = (peer, kind);
        let now = Instant::now();
        match state.last_processed_seq.get(&key) {
            Some(&(last, _)) if seq <= last => false,
            _ => {
                state.last_processed_seq.insert(key, (seq, now));
                true
            }
        }
    }

    /// Iterate the unacked map: entries whose `last_sent` is older than
    /// [`MIN_RESEND_INTERVAL`] are returned for retransmission (and their
    /// `resend_count` bumped); entries that have reached [`MAX_RESEND`] are
    /// purged instead and reported separately so the caller can log them.
    pub fn sweep_resends(&self) -> ResendSweep {
        let mut state = self.inner.lock();
        let now = Instant::now();
        let mut to_resend = Vec::new();
        let mut dropped = Vec::new();

        state.unacked.retain(|&seq, pkt| {
            if now.duration_since(pkt.last_sent) < MIN_RESEND_INTERVAL {
                return true;
            }
            if pkt.resend_count >= MAX_RESEND {
                dropped.push(seq);
                return false;
            }
            pkt.resend_count += 1;
            pkt.last_sent = now;
            to_resend.push((seq, pkt.bytes.clone()));
            true
        });

        ResendSweep { to_resend, dropped }
    }

    /// Evict `last_processed_seq` entries older than [`STALE_ENTRY_TTL`].
    pub fn sweep_stale_entries(&self) {
        let mut state = self.inner.lock();
        let now = Instant::now();
        state
            .last_processed_seq
            .retain(|_, &mut (_, seen_at)| now.duration_since(seen_at) < STALE_ENTRY_TTL);
    }

    pub fn loss_ratio(&self) -> f64 {
        self.inner.lock().loss_monitor.loss_ratio()
    }

    pub fn unacked_len(&self) -> usize {
        self.inner.lock().unacked.len()
    }
}

pub struct ResendSweep {
    /// (sequence, bytes) pairs due for another transmission attempt.
    pub to_resend: Vec<(u32, Vec<u8>)>,
    /// Sequences that hit `MAX_RESEND` and were purged without being acked.
    pub dropped: Vec<u32>,
}

/// Running loss-ratio estimate over accepted sequence numbers.
///
/// Algorithm taken verbatim from the original implementation's packet-loss
/// monitor: `expected = last + 1`; a sequence greater than expected adds
/// the gap to `lost` and one to `received`; a sequence equal to expected
/// adds one to `received`; a sequence less than expected (a duplicate or
/// stale arrival) updates neither counter.
struct LossMonitor {
    last: Option<u32>,
    lost: u64,
    received: u64,
}

impl LossMonitor {
    fn new() -> Self {
        Self { last: None, lost: 0, received: 0 }
    }

    fn observe(&mut self, seq: u32) {
        let Some(last) = self.last else {
            self.last = Some(seq);
            self.received += 1;
            return;
        };
        let expected = last + 1;
        if seq > expected {
            self.lost += (seq - expected) as u64;
            self.received += 1;
            self.last = Some(seq);
        } else if seq == expected {
            self.received += 1;
            self.last = Some(seq);
        }
        // seq < expected: duplicate or stale, ignored.
    }

    fn loss_ratio(&self) -> f64 {
        let total = self.lost + self.received;
        if total == 0 {
            0.0
        } else {
            self.lost as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:5000".parse().unwrap()
    }

    #[test]
    fn sequence_numbers_increase_monotonically() {
        let chan = ReliableChannel::new();
        let a = chan.send(vec![1], true);
        let b = chan.send(vec![2], true);
        assert_eq!(b, a + 1);
    }

    #[test]
    fn unreliable_send_is_not_tracked() {
        let chan = ReliableChannel::new();
        chan.send(vec![1], false);
        assert_eq!(chan.unacked_len(), 0);
    }

    #[test]
    fn ack_removes_unacked_entry() {
        let chan = ReliableChannel::new();
        let seq = chan.send(vec![1, 2, 3], true);
        assert_eq!(chan.unacked_len(), 1);
        chan.on_ack(seq);
        assert_eq!(chan.unacked_len(), 0);
    }

    #[test]
    fn duplicate_sequence_is_rejected() {
        let chan = ReliableChannel::new();
        assert!(chan.on_receive(peer(), PacketType::ChatMessage, 1));
        assert!(!chan.on_receive(peer(), PacketType::ChatMessage, 1));
        assert!(chan.on_receive(peer(), PacketType::ChatMessage, 2));
    }

    #[test]
    fn different_kinds_track_independently() {
        let chan = ReliableChannel::new();
        assert!(chan.on_receive(peer(), PacketType::ChatMessage, 5));
        assert!(chan.on_receive(peer(), PacketType::PlayerShoot, 5));
    }

    #[test]
    fn resend_sweep_skips_recent_entries() {
        let chan = ReliableChannel::new();
        chan.send(vec![1], true);
        let sweep = chan.sweep_resends();
        assert!(sweep.to_resend.is_empty());
        assert!(sweep.dropped.is_empty());
    }

    #[test]
    fn loss_monitor_counts_gaps() {
        let chan = ReliableChannel::new();
        chan.on_receive(peer(), PacketType::PlayerMove, 1);
        chan.on_receive(peer(), PacketType::PlayerMove, 2);
        // gap: 3 missing
        chan.on_receive(peer(), PacketType::PlayerMove, 4);
        assert!(chan.loss_ratio() > 0.0);
    }

    #[test]
    fn loss_monitor_is_zero_with_no_gaps() {
        let chan = ReliableChannel::new();
        chan.on_receive(peer(), PacketType::PlayerMove, 1);
        chan.on_receive(peer(), PacketType::PlayerMove, 2);
        chan.on_receive(peer(), PacketType::PlayerMove, 3);
        assert_eq!(chan.loss_ratio(), 0.0);
    }

    #[test]
    fn loss_monitor_ignores_stale_duplicates() {
        let chan = ReliableChannel::new();
        chan.on_receive(peer(), PacketType::PlayerMove, 5);
        let ratio_before = chan.loss_ratio();
        chan.on_receive(peer(), PacketType::PlayerMove, 3); // stale
        assert_eq!(chan.loss_ratio(), ratio_before);
    }
}

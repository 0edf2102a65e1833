// net.rs — the client's transport layer: a UDP socket pinned to the
// server via `connect`, the same `[seq: u32 LE][payload]` envelope and
// optional LZ4 framing the reactor speaks, and the reliable-channel
// bookkeeping (dedup, acking, resend) mirrored for a single peer.
//
// Grounded on `wingman_server::reactor`'s envelope/compression/
// `ReliableChannel` plumbing, split across two threads: a network thread
// that only reads datagrams off the socket and hands them to a
// [`PacketQueue`] (so a slow consumer never stalls the socket), and a
// retransmission thread that mirrors the server's maintenance sweep for
// this one peer. Decoding, acking, and dedup happen on the caller's
// thread inside [`NetClient::try_recv`] — the render/ECS thread polls
// the receive queue.

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::warn;

use wingman_common::channel::ReliableChannel;
use wingman_common::compression;
use wingman_common::config::ClientConfig;
use wingman_common::queue::{PacketQueue, PacketQueueSender, QueuedPacket, DEFAULT_QUEUE_CAPACITY};
use wingman_common::wire::Packet;

const ENVELOPE_SEQ_LEN: usize = 4;
const RECV_BUFFER_SIZE: usize = 4096;
const COMPRESSION_RATIO: f32 = 0.9;
const SOCKET_READ_TIMEOUT: Duration = Duration::from_millis(250);
const RETRANSMIT_INTERVAL: Duration = Duration::from_millis(250);

fn encode_envelope(seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENVELOPE_SEQ_LEN + payload.len());
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn decode_envelope(data: &[u8]) -> Option<(u32, &[u8])> {
    if data.len() < ENVELOPE_SEQ_LEN {
        return None;
    }
    let seq = u32::from_le_bytes(data[..ENVELOPE_SEQ_LEN].try_into().unwrap());
    Some((seq, &data[ENVELOPE_SEQ_LEN..]))
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Connected UDP endpoint plus the reliable-delivery bookkeeping for a
/// single peer (the server). One instance per session.
pub struct NetClient {
    socket: Arc<UdpSocket>,
    channel: Arc<ReliableChannel>,
    queue: PacketQueue,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    retransmit: Option<JoinHandle<()>>,
}

impl NetClient {
    /// Bind an ephemeral local port, pin `config.server_ip:config.port` as
    /// the connected peer, and start the network and retransmission
    /// threads. Does not perform the `PlayerInfo` handshake — that's
    /// [`crate::session::GameClient::connect`]'s job.
    pub fn connect(config: &ClientConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_read_timeout(Some(SOCKET_READ_TIMEOUT))?;
        socket.connect((config.server_ip, config.port))?;
        let socket = Arc::new(socket);
        let channel = Arc::new(ReliableChannel::new());
        let queue = PacketQueue::new(DEFAULT_QUEUE_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));

        let reader = spawn_reader(Arc::clone(&socket), queue.sender(), Arc::clone(&shutdown));
        let retransmit = spawn_retransmit(Arc::clone(&socket), Arc::clone(&channel), Arc::clone(&shutdown));

        Ok(Self { socket, channel, queue, shutdown, reader: Some(reader), retransmit: Some(retransmit) })
    }

    /// Encode, (maybe) compress, allocate a sequence number (registering
    /// it for retransmission if reliable), envelope, and send to the
    /// connected peer.
    pub fn send(&self, packet: &Packet) -> io::Result<()> {
        let reliable = packet.packet_type().is_reliable();
        let body = packet.encode();
        let payload = compression::compress_packet(&body, COMPRESSION_RATIO).unwrap_or(body);
        let seq = self.channel.send(payload.clone(), reliable);
        let datagram = encode_envelope(seq, &payload);
        self.socket.send(&datagram)?;
        Ok(())
    }

    /// Drain the next queued datagram and decode it. `Ack` packets are
    /// consumed here (clearing the matching unacked entry) rather than
    /// returned. A reliable packet seen for the first time is acked
    /// immediately and returned; a duplicate is acked again and dropped.
    /// Returns `None` once the queue is empty.
    pub fn try_recv(&self) -> Option<Packet> {
        loop {
            let queued = self.queue.try_recv()?;
            let Some((seq, payload)) = decode_envelope(&queued.data) else {
                warn!("datagram shorter than the envelope, dropping");
                continue;
            };

            let raw = if compression::is_compressed(payload) {
                match compression::decompress_packet(payload) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(error = %e, "bad compression frame, dropping");
                        continue;
                    }
                }
            } else {
                payload.to_vec()
            };

            let packet = match Packet::decode(&raw) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "bad packet, dropping");
                    continue;
                }
            };

            if let Packet::Ack { sequence_number } = packet {
                self.channel.on_ack(sequence_number);
                continue;
            }

            let kind = packet.packet_type();
            if kind.is_reliable() {
                let first_time = self.channel.on_receive(queued.from, kind, seq);
                if let Err(e) = self.send(&Packet::Ack { sequence_number: seq }) {
                    warn!(error = %e, "failed to ack inbound packet");
                }
                if !first_time {
                    continue;
                }
            }

            return Some(packet);
        }
    }

    pub fn loss_ratio(&self) -> f64 {
        self.channel.loss_ratio()
    }

    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    /// Signal both background threads to stop and join them. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.retransmit.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_reader(socket: Arc<UdpSocket>, sender: PacketQueueSender, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("wingman-client-net".into())
        .spawn(move || {
            let mut buf = [0u8; RECV_BUFFER_SIZE];
            while !shutdown.load(Ordering::Relaxed) {
                match socket.recv(&mut buf) {
                    Ok(len) => {
                        let Ok(peer) = socket.peer_addr() else { continue };
                        sender.try_send(QueuedPacket::new(peer, buf[..len].to_vec(), now_ms()));
                    }
                    Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => continue,
                    Err(e) => warn!(error = %e, "recv failed"),
                }
            }
        })
        .expect("failed to spawn client network thread")
}

fn spawn_retransmit(socket: Arc<UdpSocket>, channel: Arc<ReliableChannel>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("wingman-client-retransmit".into())
        .spawn(move || {
            while !shutdown.load(Ordering::Relaxed) {
                thread::sleep(RETRANSMIT_INTERVAL);
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                let sweep = channel.sweep_resends();
                for (seq, bytes) in sweep.to_resend {
                    let datagram = encode_envelope(seq, &bytes);
                    if let Err(e) = socket.send(&datagram) {
                        warn!(error = %e, "resend failed");
                    }
                }
                for seq in sweep.dropped {
                    warn!(seq, "reliable packet dropped after max resend attempts");
                }
                channel.sweep_stale_entries();
            }
        })
        .expect("failed to spawn client retransmission thread")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_sequence_and_payload() {
        let datagram = encode_envelope(7, b"hello");
        let (seq, payload) = decode_envelope(&datagram).unwrap();
        assert_eq!(seq, 7);
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn envelope_decode_rejects_short_datagrams() {
        assert!(decode_envelope(&[1, 2]).is_none());
    }

    #[test]
    fn connect_binds_an_ephemeral_local_port() {
        let config = ClientConfig { port: 0, ..ClientConfig::default() };
        // port 0 as the *server* port is nonsensical but harmless: connect()
        // only needs a resolvable address, never a live peer, to succeed.
        let mut client = NetClient::connect(&config).unwrap();
        assert!(client.local_addr().unwrap().port() > 0);
        client.shutdown();
    }
}

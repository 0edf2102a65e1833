// queue.rs — bounded inbound/outbound packet queue decoupling socket I/O
// from whatever consumes it (the game thread on the server, the render/ECS
// thread on the client).
//
// Mirrors `net_queue.rs` `PacketQueue`/`PacketQueueSender`
// split: a bounded `crossbeam` channel, a cloneable sender for the I/O
// thread, and a non-blocking-overflow policy so a slow consumer can never
// stall the socket thread. Generalized from quake2's `NetAdr`/`NetSrc` pair
// to a plain `SocketAddr`, and the overflow policy now logs via `tracing`
// instead of silently dropping.

use std::net::SocketAddr;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

/// Default queue capacity, generous enough to absorb a burst without
/// building meaningful latency.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// A packet pulled off the socket, tagged with its sender and arrival time.
#[derive(Clone, Debug)]
pub struct QueuedPacket {
    pub from: SocketAddr,
    pub data: Vec<u8>,
    pub received_at_ms: u64,
}

impl QueuedPacket {
    pub fn new(from: SocketAddr, data: Vec<u8>, received_at_ms: u64) -> Self {
        Self { from, data, received_at_ms }
    }
}

/// Bounded FIFO between the socket-reading thread and whatever decodes and
/// dispatches packets. Overflow drops the newest packet and logs; it never
/// blocks the producer.
pub struct PacketQueue {
    sender: Sender<QueuedPacket>,
    receiver: Receiver<QueuedPacket>,
}

impl PacketQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    pub fn sender(&self) -> PacketQueueSender {
        PacketQueueSender { sender: self.sender.clone() }
    }

    pub fn try_recv(&self) -> Option<QueuedPacket> {
        self.receiver.try_recv().ok()
    }

    pub fn recv(&self) -> Option<QueuedPacket> {
        self.receiver.recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

/// Cloneable producer handle, held by the socket-reading thread.
#[derive(Clone)]
pub struct PacketQueueSender {
    sender: Sender<QueuedPacket>,
}

impl PacketQueueSender {
    /// Enqueue `packet`, dropping it (and logging) if the queue is full.
    /// Returns `true` if enqueued.
    pub fn try_send(&self, packet: QueuedPacket) -> bool {
        match self.sender.try_send(packet) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(from = %dropped.from, "packet queue full, dropping inbound packet");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:4242".parse().unwrap()
    }

    fn packet(tag: u8) -> QueuedPacket {
        QueuedPacket::new(addr(), vec![tag], 0)
    }

    #[test]
    fn basic_send_and_receive() {
        let queue = PacketQueue::new(4);
        let sender = queue.sender();
        assert!(queue.is_empty());

        assert!(sender.try_send(packet(1)));
        assert_eq!(queue.len(), 1);

        let received = queue.try_recv().unwrap();
        assert_eq!(received.data, vec![1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops_newest() {
        let queue = PacketQueue::new(2);
        let sender = queue.sender();

        assert!(sender.try_send(packet(1)));
        assert!(sender.try_send(packet(2)));
        assert!(!sender.try_send(packet(3)));

        assert_eq!(queue.try_recv().unwrap().data, vec![1]);
        assert_eq!(queue.try_recv().unwrap().data, vec![2]);
        assert!(queue.try_recv().is_none());
    }

    #[test]
    fn multiple_senders_share_the_queue() {
        let queue = PacketQueue::new(4);
        let a = queue.sender();
        let b = queue.sender();

        assert!(a.try_send(packet(1)));
        assert!(b.try_send(packet(2)));
        assert_eq!(queue.len(), 2);
    }
}

// client_record.rs — one entry per connected client, and the registry
// that demultiplexes incoming packets by remote address and sweeps
// timeouts. The per-peer sequencing/ack bookkeeping is delegated entirely
// to [`wingman_common::channel::ReliableChannel`] rather than duplicated
// here.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use wingman_common::channel::ReliableChannel;
use wingman_ecs::Entity;

/// A connected client, from first `PlayerInfo` until disconnect/timeout.
/// Present in menu state (no room) immediately after handshake, per S1.
pub struct ClientRecord {
    pub player_id: u32,
    pub peer: SocketAddr,
    pub name: String,
    pub connected: bool,
    pub room_id: Option<u32>,
    pub entity: Option<Entity>,
    pub last_heartbeat: Instant,
    pub channel: ReliableChannel,
}

impl ClientRecord {
    fn new(player_id: u32, peer: SocketAddr, name: String) -> Self {
        Self {
            player_id,
            peer,
            name,
            connected: true,
            room_id: None,
            entity: None,
            last_heartbeat: Instant::now(),
            channel: ReliableChannel::new(),
        }
    }
}

/// Demuxes inbound packets by remote address to a [`ClientRecord`],
/// creating one on first contact (`PlayerInfo`) if below capacity, and
/// owns the heartbeat-timeout sweep.
#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<u32, ClientRecord>,
    by_addr: HashMap<SocketAddr, u32>,
    next_player_id: u32,
    capacity: u32,
}

impl ClientRegistry {
    pub fn new(capacity: u32) -> Self {
        Self { clients: HashMap::new(), by_addr: HashMap::new(), next_player_id: 0, capacity }
    }

    /// Look up the client already associated with `peer`, if any.
    pub fn by_addr(&self, peer: SocketAddr) -> Option<&ClientRecord> {
        self.by_addr.get(&peer).and_then(|id| self.clients.get(id))
    }

    /// Handshake a brand-new peer on its first `PlayerInfo{name}`. Returns
    /// `None` if the server is already at `max_clients`.
    pub fn register(&mut self, peer: SocketAddr, name: String) -> Option<u32> {
        if let Some(&existing) = self.by_addr.get(&peer) {
            return Some(existing);
        }
        if self.clients.len() as u32 >= self.capacity {
            return None;
        }
        let player_id = self.next_player_id;
        self.next_player_id += 1;
        self.clients.insert(player_id, ClientRecord::new(player_id, peer, name));
        self.by_addr.insert(peer, player_id);
        Some(player_id)
    }

    pub fn get(&self, player_id: u32) -> Option<&ClientRecord> {
        self.clients.get(&player_id)
    }

    pub fn get_mut(&mut self, player_id: u32) -> Option<&mut ClientRecord> {
        self.clients.get_mut(&player_id)
    }

    /// Every connected client, for maintenance sweeps (resend, stale-entry
    /// eviction) that touch each client's channel in turn.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientRecord> {
        self.clients.values_mut()
    }

    pub fn touch_heartbeat(&mut self, player_id: u32) {
        if let Some(client) = self.clients.get_mut(&player_id) {
            client.last_heartbeat = Instant::now();
        }
    }

    /// Remove every client silent for longer than `timeout`; the caller is
    /// responsible for destroying their entity and broadcasting
    /// `PlayerDisconnected`.
    pub fn sweep_timeouts(&mut self, timeout: std::time::Duration) -> Vec<ClientRecord> {
        let now = Instant::now();
        let stale: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, c)| now.duration_since(c.last_heartbeat) > timeout)
            .map(|(&id, _)| id)
            .collect();

        stale
            .into_iter()
            .filter_map(|id| {
                let client = self.clients.remove(&id)?;
                self.by_addr.remove(&client.peer);
                Some(client)
            })
            .collect()
    }

    pub fn remove(&mut self, player_id: u32) -> Option<ClientRecord> {
        let client = self.clients.remove(&player_id)?;
        self.by_addr.remove(&client.peer);
        Some(client)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn peer(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn register_assigns_sequential_player_ids() {
        let mut reg = ClientRegistry::new(64);
        let a = reg.register(peer(5000), "Alice".into()).unwrap();
        let b = reg.register(peer(5001), "Bob".into()).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1);
    }

    #[test]
    fn registering_same_addr_twice_returns_same_id() {
        let mut reg = ClientRegistry::new(64);
        let a = reg.register(peer(5000), "Alice".into()).unwrap();
        let again = reg.register(peer(5000), "Alice".into()).unwrap();
        assert_eq!(a, again);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn registration_fails_at_capacity() {
        let mut reg = ClientRegistry::new(1);
        assert!(reg.register(peer(5000), "Alice".into()).is_some());
        assert!(reg.register(peer(5001), "Bob".into()).is_none());
    }

    #[test]
    fn sweep_timeouts_removes_only_stale_clients() {
        let mut reg = ClientRegistry::new(64);
        let a = reg.register(peer(5000), "Alice".into()).unwrap();
        reg.get_mut(a).unwrap().last_heartbeat = Instant::now() - Duration::from_secs(100);
        let b = reg.register(peer(5001), "Bob".into()).unwrap();

        let disconnected = reg.sweep_timeouts(Duration::from_secs(45));
        assert_eq!(disconnected.len(), 1);
        assert_eq!(disconnected[0].player_id, a);
        assert!(reg.get(b).is_some());
        assert!(reg.get(a).is_none());
    }
}

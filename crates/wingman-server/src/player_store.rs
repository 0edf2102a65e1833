// player_store.rs — the persistence interface the core consumes and an
// in-memory test double: the SQLite-backed persistence layer for player
// accounts/bans/scoreboard is out of scope here, so the core consumes a
// `PlayerStore` interface instead.
//
// A real implementation (SQLite-backed) is an external collaborator; this
// crate ships only the trait and [`InMemoryPlayerStore`] for tests.

use std::collections::HashMap;
use std::net::IpAddr;

use wingman_common::wire::ScoreEntry;

#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    pub ip: IpAddr,
    pub online: bool,
    pub score: u32,
}

/// The four operations the core depends on.
pub trait PlayerStore: Send {
    fn find_player_by_name(&self, name: &str) -> Option<PlayerRecord>;
    fn add_player(&mut self, name: &str, ip: IpAddr);
    fn set_online(&mut self, name: &str, online: bool);
    fn is_banned(&self, ip: IpAddr) -> bool;
    fn top_scores(&self, limit: usize) -> Vec<ScoreEntry>;
}

/// In-memory test double. Bans are tracked separately from players, as in
/// a real three-table (players/bans/scores) layout.
#[derive(Default)]
pub struct InMemoryPlayerStore {
    players: HashMap<String, PlayerRecord>,
    banned_ips: Vec<IpAddr>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ban(&mut self, ip: IpAddr) {
        if !self.banned_ips.contains(&ip) {
            self.banned_ips.push(ip);
        }
    }

    /// Test/bootstrap helper: record a score for an existing player.
    pub fn record_score(&mut self, name: &str, score: u32) {
        if let Some(player) = self.players.get_mut(name) {
            player.score = score;
        }
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn find_player_by_name(&self, name: &str) -> Option<PlayerRecord> {
        self.players.get(name).cloned()
    }

    fn add_player(&mut self, name: &str, ip: IpAddr) {
        self.players
            .entry(name.to_string())
            .or_insert_with(|| PlayerRecord { name: name.to_string(), ip, online: false, score: 0 });
    }

    fn set_online(&mut self, name: &str, online: bool) {
        if let Some(player) = self.players.get_mut(name) {
            player.online = online;
        }
    }

    fn is_banned(&self, ip: IpAddr) -> bool {
        self.banned_ips.contains(&ip)
    }

    fn top_scores(&self, limit: usize) -> Vec<ScoreEntry> {
        let mut scores: Vec<ScoreEntry> = self
            .players
            .values()
            .map(|p| ScoreEntry { player_name: p.name.clone(), score: p.score })
            .collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores.truncate(limit);
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    #[test]
    fn add_then_find_round_trips() {
        let mut store = InMemoryPlayerStore::new();
        store.add_player("Alice", ip());
        let found = store.find_player_by_name("Alice").unwrap();
        assert_eq!(found.ip, ip());
        assert!(!found.online);
    }

    #[test]
    fn set_online_updates_existing_player() {
        let mut store = InMemoryPlayerStore::new();
        store.add_player("Alice", ip());
        store.set_online("Alice", true);
        assert!(store.find_player_by_name("Alice").unwrap().online);
    }

    #[test]
    fn banned_ip_is_reported() {
        let mut store = InMemoryPlayerStore::new();
        assert!(!store.is_banned(ip()));
        store.ban(ip());
        assert!(store.is_banned(ip()));
    }

    #[test]
    fn top_scores_are_sorted_descending_and_limited() {
        let mut store = InMemoryPlayerStore::new();
        store.add_player("Alice", ip());
        store.add_player("Bob", ip());
        store.add_player("Carl", ip());
        store.record_score("Alice", 10);
        store.record_score("Bob", 50);
        store.record_score("Carl", 30);

        let top = store.top_scores(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player_name, "Bob");
        assert_eq!(top[1].player_name, "Carl");
    }
}

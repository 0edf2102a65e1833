// challenge.rs — private-room password challenge/response: challenges are
// keyed by
// `player_id` (a player may hold at most one outstanding challenge; a new
// one overwrites the old), single-use (validation erases the entry
// unconditionally), with a 30 s TTL. Grounded on
// `original_source/server/src/game/Challenge.hpp`'s keying choice and
// `crypto::Crypto::generateChallenge`/`sha256`'s hex-nonce format.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Challenges older than this are rejected even if presented.
pub const CHALLENGE_TTL: Duration = Duration::from_secs(30);

struct Challenge {
    nonce_hex: String,
    room_id: u32,
    issued_at: Instant,
}

/// Outstanding challenges, one per player. Not internally locked: owned
/// by `RoomManager`, which is itself serialized behind the caller's
/// single mutex (see [`crate::matchmaking::RoomManager`]).
#[derive(Default)]
pub struct ChallengeStore {
    pending: HashMap<u32, Challenge>,
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh 16-byte nonce (hex-encoded) for `player_id` joining
    /// `room_id`, overwriting any challenge already pending for that player.
    pub fn issue(&mut self, player_id: u32, room_id: u32) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let nonce_hex = hex_encode(&bytes);
        self.pending.insert(
            player_id,
            Challenge { nonce_hex: nonce_hex.clone(), room_id, issued_at: Instant::now() },
        );
        nonce_hex
    }

    /// Validate `hashed` (the client's `SHA256(nonce ‖ password)` hex
    /// digest) against the pending challenge for `player_id`/`room_id`,
    /// recomputing the digest from the stored nonce and `password`.
    /// Single-use: the entry is removed whether or not this succeeds.
    pub fn validate_and_consume(&mut self, player_id: u32, room_id: u32, password: &str, hashed: &str) -> bool {
        let Some(challenge) = self.pending.remove(&player_id) else { return false };
        if challenge.room_id != room_id {
            return false;
        }
        if challenge.issued_at.elapsed() > CHALLENGE_TTL {
            return false;
        }
        let expected = sha256_hex(&format!("{}{}", challenge.nonce_hex, password));
        expected == hashed
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex_encode(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_validates() {
        let mut store = ChallengeStore::new();
        let nonce = store.issue(1, 9);
        let hashed = sha256_hex(&format!("{nonce}hunter2"));
        assert!(store.validate_and_consume(1, 9, "hunter2", &hashed));
    }

    #[test]
    fn wrong_password_fails() {
        let mut store = ChallengeStore::new();
        let nonce = store.issue(1, 9);
        let hashed = sha256_hex(&format!("{nonce}wrongpass"));
        assert!(!store.validate_and_consume(1, 9, "hunter2", &hashed));
    }

    #[test]
    fn challenge_is_single_use() {
        let mut store = ChallengeStore::new();
        let nonce = store.issue(1, 9);
        let hashed = sha256_hex(&format!("{nonce}hunter2"));
        assert!(store.validate_and_consume(1, 9, "hunter2", &hashed));
        assert!(!store.validate_and_consume(1, 9, "hunter2", &hashed));
    }

    #[test]
    fn issuing_a_new_challenge_overwrites_the_old_one() {
        let mut store = ChallengeStore::new();
        let first = store.issue(1, 9);
        let second = store.issue(1, 9);
        assert_ne!(first, second);

        let hashed_old = sha256_hex(&format!("{first}hunter2"));
        assert!(!store.validate_and_consume(1, 9, "hunter2", &hashed_old));
    }

    #[test]
    fn mismatched_room_id_fails() {
        let mut store = ChallengeStore::new();
        let nonce = store.issue(1, 9);
        let hashed = sha256_hex(&format!("{nonce}hunter2"));
        assert!(!store.validate_and_consume(1, 42, "hunter2", &hashed));
    }
}

// challenge.rs — client side of the private-room password challenge: hash
// the server's nonce together with the room password. Mirrors
// `wingman_server::challenge`'s `sha256_hex` scheme
// exactly (`SHA256(nonce_hex ‖ password)`, lowercase hex) — the two sides
// must agree bit-for-bit or every private-room join fails.

use sha2::{Digest, Sha256};

/// Compute the `JoinRoom.password` field for a private room: the hex
/// digest of `nonce` (as handed back by `ChallengeResponse`) concatenated
/// with the room's plaintext password.
pub fn respond_to_challenge(nonce: &str, password: &str) -> String {
    let digest = Sha256::digest(format!("{nonce}{password}").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_servers_expected_digest() {
        // Same input/output pair exercised in wingman_server::challenge's tests.
        let nonce = "abc123";
        let password = "hunter2";
        let expected = {
            let digest = Sha256::digest(format!("{nonce}{password}").as_bytes());
            digest.iter().map(|b| format!("{b:02x}")).collect::<String>()
        };
        assert_eq!(respond_to_challenge(nonce, password), expected);
    }

    #[test]
    fn different_passwords_produce_different_digests() {
        let nonce = "abc123";
        assert_ne!(respond_to_challenge(nonce, "hunter2"), respond_to_challenge(nonce, "other"));
    }
}

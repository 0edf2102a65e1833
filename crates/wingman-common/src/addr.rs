// addr.rs — peer address helpers.
//
// The teacher's `net.rs` reinvents a `NetAdr` struct to match the original
// C layout; per the spec's design notes ("packed network structs" is a
// redesign flag), this crate has no in-memory struct to keep portable in
// the first place and just works with `std::net::SocketAddr` directly.
// What's kept from the original implementation is the *shape* of the helpers: address
// comparison, loopback/private-range detection, and string parsing.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};

/// Returns true if `addr`'s IP is loopback or within a private range.
/// Used to decide whether NAT-traversal concerns apply (out of scope
/// per spec, beyond a single UDP bind, but useful for diagnostics).
pub fn is_local_addr(addr: &SocketAddr) -> bool {
    match addr.ip() {
        IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_private() || v4.is_link_local()
        }
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

/// Parse `host[:port]` into a `SocketAddr`, resolving hostnames via DNS.
/// Returns `None` on malformed input, matching the prior implementation's
/// `net_string_to_adr` failure contract (caller decides how to report it).
pub fn parse_addr(s: &str, default_port: u16) -> Option<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr);
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, default_port));
    }

    let with_port = if s.contains(':') {
        s.to_string()
    } else {
        format!("{s}:{default_port}")
    };

    with_port.to_socket_addrs().ok()?.next()
}

/// Default bind address used when `client.properties` has no `IP`.
pub fn loopback(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_ipv4_with_port() {
        let addr = parse_addr("127.0.0.1:4242", 0).unwrap();
        assert_eq!(addr.port(), 4242);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn parse_bare_ip_uses_default_port() {
        let addr = parse_addr("10.0.0.5", 4242).unwrap();
        assert_eq!(addr.port(), 4242);
    }

    #[test]
    fn parse_garbage_is_none() {
        assert!(parse_addr("not an address!!", 4242).is_none());
    }

    #[test]
    fn is_local_addr_detects_loopback() {
        let addr = loopback(4242);
        assert!(is_local_addr(&addr));
    }

    #[test]
    fn is_local_addr_rejects_public() {
        let addr: SocketAddr = "8.8.8.8:53".parse().unwrap();
        assert!(!is_local_addr(&addr));
    }
}

//! Identity resolution
//!
//! Priority: verified principal, then session identifier, then client IP.
//! Returns `None` when the request carries none of them; callers then skip
//! counting without failing the request.

use std::net::IpAddr;

use crate::identity::{IdentityKind, ViewerIdentity};
use crate::value_objects::Snowflake;

/// Session identifiers longer than this are ignored
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Raw identity signals extracted from a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    /// Verified user id from a valid bearer token
    pub principal: Option<Snowflake>,
    /// Session identifier from header or cookie
    pub session_id: Option<String>,
    /// Raw `X-Forwarded-For` header value
    pub forwarded_for: Option<String>,
    /// Raw `X-Real-IP` header value
    pub real_ip: Option<String>,
    /// Socket peer address
    pub peer_addr: Option<IpAddr>,
}

impl RequestSignals {
    #[must_use]
    pub fn with_principal(mut self, user_id: Snowflake) -> Self {
        self.principal = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_peer(mut self, addr: IpAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Normalized client address, honouring proxy headers first
    pub fn client_ip(&self) -> Option<IpAddr> {
        let forwarded = self
            .forwarded_for
            .as_deref()
            .and_then(|v| v.split(',').next())
            .and_then(parse_ip);

        forwarded
            .or_else(|| self.real_ip.as_deref().and_then(parse_ip))
            .or(self.peer_addr)
            .map(fold_mapped)
    }

    fn usable_session(&self) -> Option<&str> {
        let session = self.session_id.as_deref()?.trim();
        let valid = !session.is_empty()
            && session.len() <= MAX_SESSION_ID_LEN
            && !session.chars().any(char::is_control);
        valid.then_some(session)
    }
}

/// Derive the deduplication identity for a request
pub fn resolve_identity(signals: &RequestSignals) -> Option<ViewerIdentity> {
    if let Some(user_id) = signals.principal {
        return Some(ViewerIdentity::new(IdentityKind::User, user_id.to_string()));
    }

    if let Some(session) = signals.usable_session() {
        return Some(ViewerIdentity::new(IdentityKind::Session, session));
    }

    signals
        .client_ip()
        .map(|ip| ViewerIdentity::new(IdentityKind::Ip, ip.to_string()))
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    // Some proxies forward bracketed IPv6 literals
    let raw = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(raw);
    raw.parse().ok()
}

fn fold_mapped(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn peer() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))
    }

    #[test]
    fn test_principal_wins_over_session() {
        let signals = RequestSignals::default()
            .with_principal(Snowflake::new(42))
            .with_session("abc")
            .with_peer(peer());
        let identity = resolve_identity(&signals).unwrap();
        assert_eq!(identity.kind, IdentityKind::User);
        assert_eq!(identity.storage_key(), "user:42");
    }

    #[test]
    fn test_session_used_without_principal() {
        let signals = RequestSignals::default().with_session("  abc  ").with_peer(peer());
        let identity = resolve_identity(&signals).unwrap();
        assert_eq!(identity, ViewerIdentity::new(IdentityKind::Session, "abc"));
    }

    #[test]
    fn test_invalid_session_falls_back_to_ip() {
        for bad in ["", "   ", "abc\ndef"] {
            let signals = RequestSignals::default().with_session(bad).with_peer(peer());
            assert_eq!(resolve_identity(&signals).unwrap().kind, IdentityKind::Ip);
        }

        let oversized = "s".repeat(MAX_SESSION_ID_LEN + 1);
        let signals = RequestSignals::default().with_session(oversized).with_peer(peer());
        assert_eq!(resolve_identity(&signals).unwrap().kind, IdentityKind::Ip);
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let signals = RequestSignals {
            forwarded_for: Some("203.0.113.7, 10.1.1.1".into()),
            real_ip: Some("198.51.100.2".into()),
            peer_addr: Some(peer()),
            ..Default::default()
        };
        assert_eq!(resolve_identity(&signals).unwrap().key, "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer() {
        let signals = RequestSignals {
            forwarded_for: Some("garbage".into()),
            real_ip: Some("198.51.100.2".into()),
            peer_addr: Some(peer()),
            ..Default::default()
        };
        assert_eq!(resolve_identity(&signals).unwrap().key, "198.51.100.2");

        let signals = RequestSignals::default().with_peer(peer());
        assert_eq!(resolve_identity(&signals).unwrap().storage_key(), "ip:10.0.0.1");
    }

    #[test]
    fn test_ipv4_mapped_address_is_folded() {
        let mapped = Ipv4Addr::new(192, 0, 2, 5).to_ipv6_mapped();
        let signals = RequestSignals::default().with_peer(IpAddr::V6(mapped));
        assert_eq!(resolve_identity(&signals).unwrap().key, "192.0.2.5");

        let signals = RequestSignals {
            forwarded_for: Some("[::ffff:192.0.2.9]".into()),
            ..Default::default()
        };
        assert_eq!(resolve_identity(&signals).unwrap().key, "192.0.2.9");

        let signals = RequestSignals::default().with_peer(IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(resolve_identity(&signals).unwrap().key, "::1");
    }

    #[test]
    fn test_no_signals_is_unresolvable() {
        assert!(resolve_identity(&RequestSignals::default()).is_none());
    }
}

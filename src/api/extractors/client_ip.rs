/*
 * Responsibility
 * - ClientIp: the address stored with a post
 *   1. first hop of X-Forwarded-For (trimmed)
 *   2. peer address from ConnectInfo (present when served with connect info)
 *   3. empty string
 * - QuotaKey: the address the rate limiter counts against
 *   - the first X-Forwarded-For hop is client supplied, so it is never used here
 *   - with N trusted proxies, the Nth hop from the right (the one our proxy appended),
 *     otherwise the peer address
 * - Neither rejects: missing information just yields ""
 */
use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{Extensions, HeaderMap, request::Parts},
};

const FORWARDED_FOR: &str = "x-forwarded-for";

fn forwarded_hops(headers: &HeaderMap) -> Vec<&str> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .map(|chain| {
            chain
                .split(',')
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn peer_addr(extensions: &Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn derive(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let ip = match (forwarded_hops(headers).first(), peer) {
            (Some(first), _) => first.to_string(),
            (None, Some(addr)) => addr.ip().to_string(),
            (None, None) => String::new(),
        };

        Self(ip)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::derive(&parts.headers, peer_addr(&parts.extensions)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaKey(pub String);

impl QuotaKey {
    /// `trusted_hops` is the number of reverse proxies in front of the server.
    /// A chain shorter than that resolves to its leftmost hop.
    pub fn derive(headers: &HeaderMap, peer: Option<SocketAddr>, trusted_hops: usize) -> Self {
        let peer_ip = peer.map(|addr| addr.ip().to_string()).unwrap_or_default();
        if trusted_hops == 0 {
            return Self(peer_ip);
        }

        let hops = forwarded_hops(headers);
        let key = match hops.len() {
            0 => peer_ip,
            len => hops[len - trusted_hops.min(len)].to_string(),
        };

        Self(key)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn peer() -> Option<SocketAddr> {
        Some("192.168.0.7:51234".parse().unwrap())
    }

    fn forwarded(chain: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(chain));
        headers
    }

    #[test]
    fn takes_first_forwarded_hop() {
        let headers = forwarded(" 203.0.113.9 , 10.0.0.1, 10.0.0.2");
        assert_eq!(ClientIp::derive(&headers, peer()).0, "203.0.113.9");
    }

    #[test]
    fn falls_back_to_peer_address() {
        let headers = HeaderMap::new();
        assert_eq!(ClientIp::derive(&headers, peer()).0, "192.168.0.7");

        let headers = forwarded(" , ");
        assert_eq!(ClientIp::derive(&headers, peer()).0, "192.168.0.7");
    }

    #[test]
    fn empty_when_nothing_is_known() {
        assert_eq!(ClientIp::derive(&HeaderMap::new(), None).0, "");
    }

    #[test]
    fn quota_key_ignores_forwarded_chain_without_trusted_proxies() {
        let headers = forwarded("6.6.6.6");
        assert_eq!(QuotaKey::derive(&headers, peer(), 0).0, "192.168.0.7");
        assert_eq!(QuotaKey::derive(&headers, None, 0).0, "");
    }

    #[test]
    fn quota_key_uses_hop_appended_by_trusted_proxy() {
        let headers = forwarded("6.6.6.6, 198.51.100.9");
        assert_eq!(QuotaKey::derive(&headers, peer(), 1).0, "198.51.100.9");

        let headers = forwarded("6.6.6.6, 198.51.100.9, 10.0.0.1");
        assert_eq!(QuotaKey::derive(&headers, peer(), 2).0, "198.51.100.9");
    }

    #[test]
    fn quota_key_with_short_chain_takes_leftmost() {
        let headers = forwarded("198.51.100.9");
        assert_eq!(QuotaKey::derive(&headers, peer(), 3).0, "198.51.100.9");
        assert_eq!(
            QuotaKey::derive(&HeaderMap::new(), peer(), 1).0,
            "192.168.0.7"
        );
    }
}

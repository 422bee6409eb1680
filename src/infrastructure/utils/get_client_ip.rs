use std::net::IpAddr;

use actix_web::HttpRequest;

const UNKNOWN_CLIENT: &str = "unknown";

/// Key used to rate limit a caller. Proxy headers are only honoured when the
/// deployment sits behind a trusted reverse proxy; otherwise any client could
/// pick its own bucket.
pub fn get_client_ip(req: &HttpRequest, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_ip(req) {
            return ip.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

// First parseable hop of X-Forwarded-For, then X-Real-IP.
fn forwarded_ip(req: &HttpRequest) -> Option<IpAddr> {
    let header = |name: &str| req.headers().get(name).and_then(|value| value.to_str().ok());

    header("x-forwarded-for")
        .and_then(|list| list.split(',').find_map(|hop| hop.trim().parse().ok()))
        .or_else(|| header("x-real-ip").and_then(|value| value.trim().parse().ok()))
}

//! Request-line parsing for inbound proxy connections.

use crate::error::{Result, WebProxyError};

/// The destination a proxy client asked for.
///
/// `target_url` is the request-target exactly as sent: an absolute URI for
/// plain proxy requests, a `host:port` authority for `CONNECT`. It is the
/// only field the policy evaluator looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub method: String,
    pub target_url: String,
    pub host: String,
    pub port: u16,
}

impl RequestTarget {
    pub fn is_connect(&self) -> bool {
        self.method.eq_ignore_ascii_case("CONNECT")
    }

    /// `host:port` suitable for `TcpStream::connect`.
    pub fn upstream_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse the first line of a proxy request, e.g. `GET http://a.com/ HTTP/1.1`.
pub fn parse_request_line(line: &str) -> Result<RequestTarget> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(WebProxyError::Proxy(format!("malformed request line: {line:?}")));
    };

    let (host, port) = if method.eq_ignore_ascii_case("CONNECT") {
        split_host_port(target, 443)
    } else {
        let (rest, default_port) = if let Some(rest) = target.strip_prefix("http://") {
            (rest, 80)
        } else if let Some(rest) = target.strip_prefix("https://") {
            (rest, 443)
        } else {
            return Err(WebProxyError::Proxy(format!(
                "expected absolute URI in proxy request, got {target:?}"
            )));
        };
        let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        split_host_port(authority, default_port)
    };

    if host.is_empty() {
        return Err(WebProxyError::Proxy(format!("missing host in {target:?}")));
    }

    Ok(RequestTarget {
        method: method.to_string(),
        target_url: target.to_string(),
        host,
        port,
    })
}

/// Split `host[:port]`, keeping bracketed IPv6 literals intact.
fn split_host_port(authority: &str, default_port: u16) -> (String, u16) {
    if let Some((host, port_str)) = authority.rsplit_once(':') {
        if !host.starts_with('[') || host.ends_with(']') {
            if let Ok(port) = port_str.parse() {
                return (host.to_string(), port);
            }
        }
    }
    (authority.to_string(), default_port)
}

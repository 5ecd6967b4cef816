use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use super::request::{self, RequestTarget};
use crate::policy::evaluator::{self, Verdict};
use crate::policy::store::PolicyStore;

/// Largest request head accepted before evaluating.
const MAX_HEAD_BYTES: usize = 8192;

/// How long a plain HTTP response may take to stream back.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifecycle of one proxied connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Received,
    Evaluating,
    Forwarding,
    Rejected,
}

/// Main accept loop: accept incoming connections and handle them.
pub async fn accept_loop(listener: TcpListener, store: Arc<PolicyStore>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                debug!("New connection from {}", peer_addr);
                let store = store.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &store).await {
                        error!("Error handling connection from {}: {}", peer_addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single client connection and return the state it ended in.
///
/// The policy is consulted exactly once, after the request line is parsed and
/// before any upstream connection is opened.
pub async fn handle_connection(
    mut client: TcpStream,
    store: &PolicyStore,
) -> anyhow::Result<ConnectionState> {
    let head = read_request_head(&mut client).await?;
    if head.is_empty() {
        return Ok(ConnectionState::Received);
    }

    let text = String::from_utf8_lossy(&head);
    let first_line = text.lines().next().unwrap_or("");
    let target = match request::parse_request_line(first_line) {
        Ok(target) => target,
        Err(e) => {
            warn!("Bad proxy request: {}", e);
            client
                .write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n")
                .await?;
            return Ok(ConnectionState::Rejected);
        }
    };

    debug!("{} {} -> {:?}", target.method, target.target_url, ConnectionState::Evaluating);
    let verdict = evaluator::evaluate(&store.get(), &target.target_url);
    if !verdict.is_allowed() {
        reject(&mut client, &target, &verdict).await?;
        return Ok(ConnectionState::Rejected);
    }

    info!("Forwarding {} {} ({})", target.method, target.target_url, verdict);
    if target.is_connect() {
        tunnel(&mut client, &target, &head).await?;
    } else {
        forward_http(&mut client, &target, &head).await?;
    }
    Ok(ConnectionState::Forwarding)
}

/// Read until the end of the request head, EOF, or [`MAX_HEAD_BYTES`].
async fn read_request_head(client: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 2048];
    while buf.len() < MAX_HEAD_BYTES {
        let n = client.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    Ok(buf)
}

async fn reject(
    client: &mut TcpStream,
    target: &RequestTarget,
    verdict: &Verdict,
) -> std::io::Result<()> {
    warn!("Refusing connection to: {} ({})", target.target_url, verdict);
    let response = format!(
        "HTTP/1.1 403 Forbidden\r\nX-WebProxy-Reason: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        verdict
    );
    client.write_all(response.as_bytes()).await?;
    client.shutdown().await
}

/// Handle CONNECT by relaying bytes in both directions.
///
/// Bytes the client pipelined after the CONNECT head are sent upstream first.
async fn tunnel(
    client: &mut TcpStream,
    target: &RequestTarget,
    raw_request: &[u8],
) -> anyhow::Result<()> {
    let addr = target.upstream_addr();
    let mut remote = match TcpStream::connect(&addr).await {
        Ok(remote) => remote,
        Err(e) => {
            warn!("Failed to connect to {}: {}", addr, e);
            client.write_all(b"HTTP/1.1 502 Bad Gateway\r\n\r\n").await?;
            return Ok(());
        }
    };

    client
        .write_all(b"HTTP/1.1 200 Connection Established\r\n\r\n")
        .await?;

    if let Some(end) = head_end(raw_request) {
        let pipelined = &raw_request[end + 4..];
        if !pipelined.is_empty() {
            remote.write_all(pipelined).await?;
        }
    }

    match tokio::io::copy_bidirectional(client, &mut remote).await {
        Ok((up, down)) => debug!("Tunnel to {} closed ({} up, {} down)", addr, up, down),
        Err(e) => debug!("Tunnel to {} ended: {}", addr, e),
    }
    Ok(())
}

/// Forward a plain HTTP request and stream the response back.
async fn forward_http(
    client: &mut TcpStream,
    target: &RequestTarget,
    raw_request: &[u8],
) -> anyhow::Result<()> {
    let addr = target.upstream_addr();
    let mut remote = match TcpStream::connect(&addr).await {
        Ok(remote) => remote,
        Err(e) => {
            warn!("Failed to connect to {}: {}", addr, e);
            client.write_all(b"HTTP/1.1 502 Bad Gateway\r\n\r\n").await?;
            return Ok(());
        }
    };

    remote.write_all(&with_connection_close(raw_request)).await?;

    match tokio::time::timeout(RESPONSE_TIMEOUT, relay_exchange(client, &mut remote)).await {
        Ok(Ok(bytes)) => debug!("Streamed {} bytes from {}", bytes, addr),
        Ok(Err(e)) => warn!("Error streaming response from {}: {}", addr, e),
        Err(_) => warn!("Timeout streaming response from {}", addr),
    }
    Ok(())
}

/// Pump the rest of the request body upstream while streaming the response back.
///
/// Finishes when the upstream closes its side, returning the response byte count.
async fn relay_exchange(client: &mut TcpStream, remote: &mut TcpStream) -> std::io::Result<u64> {
    let (mut client_read, mut client_write) = client.split();
    let (mut remote_read, mut remote_write) = remote.split();

    let upload = tokio::io::copy(&mut client_read, &mut remote_write);
    let download = tokio::io::copy(&mut remote_read, &mut client_write);
    tokio::pin!(upload, download);

    let mut upload_done = false;
    loop {
        tokio::select! {
            r = &mut upload, if !upload_done => {
                upload_done = true;
                if let Err(e) = r {
                    debug!("client->remote ended: {}", e);
                }
            }
            r = &mut download => return r,
        }
    }
}

fn head_end(raw_request: &[u8]) -> Option<usize> {
    raw_request.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Force `Connection: close` on the request head so the upstream ends the response with EOF.
///
/// Any `Connection` or `Proxy-Connection` header the client sent is replaced.
fn with_connection_close(raw_request: &[u8]) -> Vec<u8> {
    let Some(end) = head_end(raw_request) else {
        return raw_request.to_vec();
    };

    let mut out = Vec::with_capacity(raw_request.len() + 19);
    for (i, line) in raw_request[..end].split(|&b| b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let name = line.split(|&b| b == b':').next().unwrap_or_default();
        let name = String::from_utf8_lossy(name);
        let name = name.trim();
        if i > 0
            && (name.eq_ignore_ascii_case("connection")
                || name.eq_ignore_ascii_case("proxy-connection"))
        {
            continue;
        }
        if i > 0 {
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(line);
    }
    out.extend_from_slice(b"\r\nConnection: close");
    out.extend_from_slice(&raw_request[end..]);
    out
}

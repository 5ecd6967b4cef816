pub mod connect;
pub mod request;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use crate::policy::store::PolicyStore;

pub struct ProxyServer {
    listen_addr: String,
    store: Arc<PolicyStore>,
}

impl ProxyServer {
    pub fn new(listen_addr: String, store: Arc<PolicyStore>) -> Self {
        Self { listen_addr, store }
    }

    /// Start the proxy server and return the actual bound address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("WebProxy listening on {}", local_addr);

        let store = self.store.clone();
        tokio::spawn(async move {
            connect::accept_loop(listener, store).await;
        });

        Ok(local_addr)
    }
}

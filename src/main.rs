use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use webproxy::cli::Cli;
use webproxy::control;
use webproxy::policy::config::AppConfig;
use webproxy::proxy::ProxyServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load_or_create(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    println!("WebProxy starting...");
    println!("Config: {}", cli.config.display());
    println!("Proxy port: {}", config.proxyport);
    println!("Default state: {}", if config.defaulton { "on" } else { "off" });
    println!("Whitelist entries: {}", config.whitelist.len());
    println!("Blacklist entries: {}", config.blacklist.len());

    let store = Arc::new(config.to_store());

    let server = ProxyServer::new(
        format!("{}:{}", cli.proxy_bind, config.proxyport),
        store.clone(),
    );
    let addr = server.start().await?;
    println!("Proxy running on {}", addr);

    let control_addr = cli.listen.clone();
    let control_store = store.clone();
    let control_task = tokio::spawn(async move { control::start(&control_addr, control_store).await });
    println!("Control API on http://{}", cli.listen);

    tokio::select! {
        res = control_task => {
            res.context("control API task panicked")??;
        }
        res = shutdown_signal() => {
            res?;
            println!("\nShutting down webproxy service.");
        }
    }
    Ok(())
}

/// Resolve on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = term.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

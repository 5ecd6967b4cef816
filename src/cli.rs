use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "webproxy")]
#[command(about = "Minimal HTTP forward proxy with an on/off switch and URL filtering")]
#[command(version)]
pub struct Cli {
    /// Path to config file (created with defaults if missing)
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Address the control API listens on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// Host the proxy port is bound on
    #[arg(long, default_value = "0.0.0.0")]
    pub proxy_bind: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

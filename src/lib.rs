//! # WebProxy
//!
//! **A small HTTP forward proxy with an on/off switch and URL filtering.**
//!
//! WebProxy lets a host act as an outbound web proxy for other clients. Every
//! inbound request is checked against an administrator-controlled policy: a
//! master switch plus a whitelist or blacklist of URL substrings.
//!
//! ## Architecture
//!
//! - **[`policy`]** — JSON configuration, shared policy store, and the evaluator
//! - **[`proxy`]** — TCP proxy server handling plain HTTP and `CONNECT` tunneling
//! - **[`control`]** — axum control API (`/toggle`, `/status`, `/info`)
//! - **[`cli`]** — command-line interface (clap)
//! - **[`error`]** — unified error types using `thiserror`
//!
//! ## Quick Start
//!
//! ```bash
//! # Start with ./config.json (generated on first run)
//! webproxy
//!
//! # Route traffic through the proxy
//! export HTTPS_PROXY=http://127.0.0.1:8081
//!
//! # Switch the proxy off
//! curl 'http://127.0.0.1:8080/toggle?opr=off'
//! ```

pub mod cli;
pub mod control;
pub mod error;
pub mod policy;
pub mod proxy;

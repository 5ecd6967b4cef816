//! Policy engine for webproxy.
//!
//! This module provides the JSON configuration file ([`config`]), the shared
//! runtime state holding the master switch and filter lists ([`store`]), and
//! the evaluator that decides whether each proxied request may pass
//! ([`evaluator`]).

pub mod config;
pub mod evaluator;
pub mod store;

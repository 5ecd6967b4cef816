//! Shared policy state.
//!
//! The filter lists are fixed when the store is built; only the master switch
//! changes at runtime. The switch is an [`AtomicBool`], so connection
//! handlers never wait on the control plane and each read sees either the
//! value before or after a toggle.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// Point-in-time view of the policy, handed to the evaluator and to `/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySnapshot {
    /// Master switch; when false every request is refused.
    pub enabled: bool,
    /// Substrings of which a URL must contain at least one (if non-empty).
    pub allow_list: Vec<String>,
    /// Substrings a URL must not contain (only when `allow_list` is empty).
    pub deny_list: Vec<String>,
}

/// Process-wide policy state, shared as `Arc<PolicyStore>`.
#[derive(Debug)]
pub struct PolicyStore {
    enabled: AtomicBool,
    allow_list: Vec<String>,
    deny_list: Vec<String>,
}

impl PolicyStore {
    pub fn new(enabled: bool, allow_list: Vec<String>, deny_list: Vec<String>) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            allow_list,
            deny_list,
        }
    }

    /// Read the current snapshot.
    pub fn get(&self) -> PolicySnapshot {
        PolicySnapshot {
            enabled: self.is_enabled(),
            allow_list: self.allow_list.clone(),
            deny_list: self.deny_list.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(true, Vec::new(), Vec::new())
    }
}

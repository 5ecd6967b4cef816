use std::fmt;

use super::store::PolicySnapshot;

/// Why the evaluator reached its decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The URL contains the given allow-list entry.
    AllowListMatch(String),
    /// Allow list is empty and no deny-list entry matched.
    NoDenyListMatch,
    /// Both lists are empty.
    OpenPolicy,
    /// Master switch is off.
    Disabled,
    /// Allow list is non-empty and none of its entries matched.
    NotInAllowList,
    /// The URL contains the given deny-list entry.
    DenyListMatch(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            Verdict::AllowListMatch(_) | Verdict::NoDenyListMatch | Verdict::OpenPolicy
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::AllowListMatch(entry) => write!(f, "matched whitelist entry {entry}"),
            Verdict::NoDenyListMatch => f.write_str("no blacklist entry matched"),
            Verdict::OpenPolicy => f.write_str("no filter lists configured"),
            Verdict::Disabled => f.write_str("proxy is switched off"),
            Verdict::NotInAllowList => f.write_str("not in whitelist"),
            Verdict::DenyListMatch(entry) => write!(f, "matched blacklist entry {entry}"),
        }
    }
}

/// Evaluate a target URL against the policy.
///
/// The allow list, when non-empty, decides alone; the deny list is only
/// consulted when the allow list is empty. Matching is case-sensitive
/// substring containment.
pub fn evaluate(config: &PolicySnapshot, target_url: &str) -> Verdict {
    if !config.enabled {
        return Verdict::Disabled;
    }

    if !config.allow_list.is_empty() {
        return match first_contained(&config.allow_list, target_url) {
            Some(entry) => Verdict::AllowListMatch(entry.to_string()),
            None => Verdict::NotInAllowList,
        };
    }

    if !config.deny_list.is_empty() {
        return match first_contained(&config.deny_list, target_url) {
            Some(entry) => Verdict::DenyListMatch(entry.to_string()),
            None => Verdict::NoDenyListMatch,
        };
    }

    Verdict::OpenPolicy
}

/// Whether a request for `target_url` may be forwarded.
pub fn authorize(config: &PolicySnapshot, target_url: &str) -> bool {
    evaluate(config, target_url).is_allowed()
}

fn first_contained<'a>(entries: &'a [String], target_url: &str) -> Option<&'a str> {
    entries
        .iter()
        .map(String::as_str)
        .find(|entry| target_url.contains(entry))
}

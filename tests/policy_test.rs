use std::sync::Arc;

use webproxy::policy::config::AppConfig;
use webproxy::policy::evaluator::authorize;
use webproxy::policy::store::PolicyStore;

const DEFAULT_JSON: &str = r#"{
    "proxyport": 8081,
    "defaulton": true,
    "whitelist": [],
    "blacklist": []
}"#;

const FILTERED_JSON: &str = r#"{
    "proxyport": 3128,
    "defaulton": false,
    "whitelist": ["example.com", "rust-lang.org"],
    "blacklist": ["evil.com"]
}"#;

#[test]
fn parse_default_config() {
    let config: AppConfig = serde_json::from_str(DEFAULT_JSON).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn parse_filtered_config() {
    let config: AppConfig = serde_json::from_str(FILTERED_JSON).unwrap();
    assert_eq!(config.proxyport, 3128);
    assert!(!config.defaulton);
    assert_eq!(config.whitelist, vec!["example.com", "rust-lang.org"]);
    assert_eq!(config.blacklist, vec!["evil.com"]);
}

#[test]
fn invalid_json_returns_error() {
    assert!(serde_json::from_str::<AppConfig>("this is not json").is_err());
    assert!(serde_json::from_str::<AppConfig>(r#"{"proxyport": "x", "defaulton": true}"#).is_err());
    assert!(serde_json::from_str::<AppConfig>(r#"{"proxyport": 70000, "defaulton": true}"#).is_err());
}

#[test]
fn config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, FILTERED_JSON).unwrap();

    let config = AppConfig::load_from_path(&config_path).unwrap();
    assert_eq!(config.proxyport, 3128);
}

#[test]
fn unreadable_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory exists at the path, so it cannot be read as a file.
    let err = AppConfig::load_or_create(dir.path()).unwrap_err();
    assert!(matches!(err, webproxy::error::WebProxyError::Io(_)));
}

#[test]
fn allow_then_deny_scenario() {
    let store = PolicyStore::new(
        true,
        vec!["example.com".to_string()],
        vec!["evil.com".to_string()],
    );
    assert!(authorize(&store.get(), "http://example.com/page"));
    assert!(!authorize(&store.get(), "http://evil.com"));
}

#[test]
fn deny_only_scenario() {
    let store = PolicyStore::new(true, vec![], vec!["evil.com".to_string()]);
    assert!(!authorize(&store.get(), "http://evil.com/x"));
    assert!(authorize(&store.get(), "http://good.com"));
}

#[test]
fn loaded_config_drives_decisions() {
    let config: AppConfig = serde_json::from_str(FILTERED_JSON).unwrap();
    let store = config.to_store();
    assert!(!authorize(&store.get(), "http://example.com/"));

    store.set_enabled(true);
    assert!(authorize(&store.get(), "http://example.com/"));
    assert!(authorize(&store.get(), "https://doc.rust-lang.org/std"));
    assert!(!authorize(&store.get(), "http://unlisted.net/"));
}

#[test]
fn concurrent_authorize_with_toggle_sees_valid_states() {
    let store = Arc::new(PolicyStore::new(true, vec![], vec![]));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                let (mut allowed, mut denied) = (0usize, 0usize);
                for _ in 0..10_000 {
                    let snap = store.get();
                    let verdict = authorize(&snap, "http://anything.example/");
                    // With empty lists the verdict is exactly the flag.
                    assert_eq!(verdict, snap.enabled);
                    if verdict {
                        allowed += 1;
                    } else {
                        denied += 1;
                    }
                }
                allowed + denied
            })
        })
        .collect();

    store.set_enabled(false);

    for w in workers {
        assert_eq!(w.join().unwrap(), 10_000);
    }
    assert!(!authorize(&store.get(), "http://anything.example/"));
}

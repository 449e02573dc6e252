use std::path::PathBuf;
use std::time::Duration;

use browser_connector::{Config, UnmatchedReplyPolicy};

const VARS: &[&str] = &[
    "CONNECTOR_HOST",
    "CONNECTOR_PORT",
    "SCREENSHOT_PATH",
    "CAPTURE_TIMEOUT_MS",
    "UNMATCHED_REPLY_POLICY",
    "MAX_BODY_BYTES",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

// Environment variables are process wide, so every case runs in one test.
#[test]
fn test_environment_configuration() {
    clear_env();
    let config = Config::from_env();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3025);
    assert_eq!(config.capture_timeout(), Duration::from_secs(10));
    assert_eq!(config.unmatched_reply_policy, UnmatchedReplyPolicy::DiskOnly);
    assert_eq!(config.max_body_bytes, 50 * 1024 * 1024);
    assert!(config.screenshot_path.ends_with("mcp-screenshots"));
    assert!(config.validate().is_ok());

    unsafe {
        std::env::set_var("CONNECTOR_HOST", "0.0.0.0");
        std::env::set_var("CONNECTOR_PORT", "4100");
        std::env::set_var("SCREENSHOT_PATH", "/tmp/shots");
        std::env::set_var("CAPTURE_TIMEOUT_MS", "2500");
        std::env::set_var("UNMATCHED_REPLY_POLICY", "oldest");
    }
    let config = Config::from_env();
    assert_eq!(config.bind_address(), "0.0.0.0:4100");
    assert_eq!(config.screenshot_path, PathBuf::from("/tmp/shots"));
    assert_eq!(config.capture_timeout(), Duration::from_millis(2500));
    assert_eq!(
        config.unmatched_reply_policy,
        UnmatchedReplyPolicy::ResolveOldest
    );

    // Unparseable values fall back to defaults.
    unsafe {
        std::env::set_var("CONNECTOR_PORT", "not-a-port");
        std::env::set_var("UNMATCHED_REPLY_POLICY", "sometimes");
    }
    let config = Config::from_env();
    assert_eq!(config.port, 3025);
    assert_eq!(config.unmatched_reply_policy, UnmatchedReplyPolicy::DiskOnly);

    unsafe {
        std::env::set_var("CAPTURE_TIMEOUT_MS", "0");
    }
    assert!(Config::from_env().validate().is_err());

    clear_env();
}

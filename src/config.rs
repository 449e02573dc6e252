use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_CONNECTOR_PORT: u16 = 3025;
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// What to do with a screenshot reply whose request id matches nothing outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedReplyPolicy {
    /// Write the image to disk and leave pending requests to their own deadlines.
    #[default]
    DiskOnly,
    /// Hand the reply to the oldest outstanding request, if any.
    ResolveOldest,
}

impl UnmatchedReplyPolicy {
    pub fn from_string(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "disk" | "disk-only" | "disk_only" => Some(Self::DiskOnly),
            "oldest" | "resolve-oldest" | "resolve_oldest" => Some(Self::ResolveOldest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub screenshot_path: PathBuf,
    pub capture_timeout_ms: u64,
    pub unmatched_reply_policy: UnmatchedReplyPolicy,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("CONNECTOR_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("CONNECTOR_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECTOR_PORT),
            screenshot_path: env::var("SCREENSHOT_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_screenshot_dir),
            capture_timeout_ms: env::var("CAPTURE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CAPTURE_TIMEOUT_MS),
            unmatched_reply_policy: env::var("UNMATCHED_REPLY_POLICY")
                .ok()
                .and_then(|s| UnmatchedReplyPolicy::from_string(&s))
                .unwrap_or_default(),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Connector port must be greater than 0".to_string());
        }

        if self.capture_timeout_ms == 0 {
            return Err("Capture timeout must be greater than 0".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("Maximum request body size must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_CONNECTOR_PORT,
            screenshot_path: default_screenshot_dir(),
            capture_timeout_ms: DEFAULT_CAPTURE_TIMEOUT_MS,
            unmatched_reply_policy: UnmatchedReplyPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// `<downloads>/mcp-screenshots`, falling back to `~/Downloads` and then the working directory.
pub fn default_screenshot_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mcp-screenshots")
}

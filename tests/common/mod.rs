#![allow(dead_code)]

use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use browser_connector::{Bridge, Config, ConnectorServer, UnmatchedReplyPolicy};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tempfile::TempDir;
use tokio::{net::TcpStream, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub const PNG_BASE64: &str = "iVBORw0KGgo=";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

const WAIT_LIMIT: Duration = Duration::from_secs(5);

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A connector bound to an ephemeral port, writing into a temporary directory.
pub struct TestConnector {
    pub addr: SocketAddr,
    pub bridge: Arc<Bridge>,
    pub dir: TempDir,
    pub http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestConnector {
    pub async fn start() -> Self {
        Self::start_with(Duration::from_secs(5), UnmatchedReplyPolicy::DiskOnly).await
    }

    pub async fn start_with(timeout: Duration, policy: UnmatchedReplyPolicy) -> Self {
        init_test_tracing();
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            screenshot_path: dir.path().to_path_buf(),
            capture_timeout_ms: timeout.as_millis() as u64,
            unmatched_reply_policy: policy,
            ..Config::default()
        };

        let server = ConnectorServer::bind(&config).await.expect("bind connector");
        let addr = server.local_addr();
        let bridge = server.bridge();
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(server.serve(async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            bridge,
            dir,
            http: reqwest::Client::new(),
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Connects a fake extension and waits until the bridge has adopted it.
    pub async fn connect_extension(&self) -> FakeExtension {
        let before = self.bridge.peers().current().map(|p| p.id());
        let (ws, _) = connect_async(format!("ws://{}/extension-ws", self.addr))
            .await
            .expect("extension websocket");

        let peers = self.bridge.clone();
        wait_until(move || {
            let now = peers.peers().current().map(|p| p.id());
            now.is_some() && now != before
        })
        .await;

        FakeExtension { ws }
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(WAIT_LIMIT, task).await;
        }
    }

    pub fn saved_files(&self) -> Vec<std::path::PathBuf> {
        files_in(self.path())
    }
}

pub fn files_in(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Polls `check` until it holds or the wait limit passes.
pub async fn wait_until<F: FnMut() -> bool>(mut check: F) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within {WAIT_LIMIT:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Plays the browser extension side of the socket.
pub struct FakeExtension {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FakeExtension {
    pub async fn send_json(&mut self, value: Value) {
        self.ws
            .send(Message::text(value.to_string()))
            .await
            .expect("send frame");
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::text(text.to_string()))
            .await
            .expect("send frame");
    }

    /// Next JSON text frame from the connector.
    pub async fn next_json(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(WAIT_LIMIT, self.ws.next())
                .await
                .expect("frame within wait limit")
                .expect("socket open")
                .expect("valid frame");
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).expect("json frame");
            }
        }
    }

    /// Waits for a `take-screenshot` command and returns its request id.
    pub async fn expect_capture_request(&mut self) -> String {
        let frame = self.next_json().await;
        assert_eq!(frame["type"], "take-screenshot", "unexpected frame {frame}");
        frame["requestId"]
            .as_str()
            .expect("requestId on take-screenshot")
            .to_string()
    }

    /// Asserts the connector sends nothing within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(frame) = tokio::time::timeout(window, self.ws.next()).await {
            panic!("unexpected frame from connector: {frame:?}");
        }
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

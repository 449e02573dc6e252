pub mod api;
pub mod bridge;
mod config;
mod error;
pub mod handlers;
pub mod protocol;
mod server;
pub mod socket;
pub mod store;
pub mod tools;

pub use api::{ConnectorServer, ConnectorState, create_router};
pub use bridge::{Bridge, CaptureReply, PeerHandle, PeerRegistry, RouteOutcome, SavedScreenshot};
pub use config::{Config, UnmatchedReplyPolicy, default_screenshot_dir};
pub use error::{BridgeError, Result};
pub use server::ConnectorMcpServer;

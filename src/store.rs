//! Screenshot destination, artifact writes and the selected-element list.

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt};

use crate::{error::Result, protocol::ElementRecord};

const DEFAULT_PREFIX: &str = "screenshot-";
const MAX_NAME_ATTEMPTS: u32 = 64;

/// Snapshot of the runtime settings, as served by `GET /settings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub screenshot_path: PathBuf,
}

/// Owns the capture destination and writes decoded screenshots below it.
pub struct ArtifactStore {
    destination: RwLock<PathBuf>,
}

impl ArtifactStore {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: RwLock::new(destination.into()),
        }
    }

    pub fn destination(&self) -> PathBuf {
        self.destination.read().clone()
    }

    pub fn set_destination(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let previous = std::mem::replace(&mut *self.destination.write(), path.clone());
        tracing::info!(
            "Screenshot path changed from {} to {}",
            previous.display(),
            path.display()
        );
    }

    pub fn settings(&self) -> Settings {
        Settings {
            screenshot_path: self.destination(),
        }
    }

    /// Decode `payload` and write it as a new PNG file.
    ///
    /// `override_path` applies to this write only: a path with an extension names the
    /// directory and filename prefix, a path without one names the directory.
    pub async fn write_artifact(&self, payload: &str, override_path: Option<&str>) -> Result<PathBuf> {
        let bytes = decode_payload(payload)?;
        let (dir, prefix) = self.resolve_target(override_path);

        fs::create_dir_all(&dir).await?;

        let stamp = file_timestamp(Utc::now());
        let mut attempt = 0;
        loop {
            let filename = if attempt == 0 {
                format!("{prefix}{stamp}.png")
            } else {
                format!("{prefix}{stamp}-{attempt}.png")
            };
            let full_path = dir.join(filename);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full_path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&bytes).await?;
                    file.flush().await?;
                    tracing::info!("Saved screenshot to {}", full_path.display());
                    return Ok(full_path);
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn resolve_target(&self, override_path: Option<&str>) -> (PathBuf, String) {
        match override_path.filter(|p| !p.is_empty()).map(Path::new) {
            Some(path) if path.extension().is_some() => {
                let dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => self.destination(),
                };
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (dir, format!("{stem}-"))
            }
            Some(dir) => (dir.to_path_buf(), DEFAULT_PREFIX.to_string()),
            None => (self.destination(), DEFAULT_PREFIX.to_string()),
        }
    }
}

/// Drop a leading `data:<mime>;base64,` prefix, if any.
pub fn strip_data_uri(payload: &str) -> &str {
    let trimmed = payload.trim();
    if let Some(rest) = trimmed.strip_prefix("data:") {
        if let Some((_, data)) = rest.split_once(";base64,") {
            return data;
        }
    }
    trimmed
}

pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(strip_data_uri(payload))?)
}

/// ISO-8601 with `:` and `.` replaced, e.g. `2024-05-01T10-20-30-456Z`.
fn file_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Elements picked in the browser, oldest first.
#[derive(Default)]
pub struct SelectedElements {
    elements: RwLock<Vec<ElementRecord>>,
}

impl SelectedElements {
    pub fn push(&self, element: ElementRecord) {
        self.elements.write().push(element);
    }

    pub fn snapshot(&self) -> Vec<ElementRecord> {
        self.elements.read().clone()
    }

    pub fn clear(&self) -> usize {
        let mut elements = self.elements.write();
        let count = elements.len();
        elements.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }
}

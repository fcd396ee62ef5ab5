//! Static file fallback for requests no route claimed.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::error;

use crate::http::mime::{MimeLookup, extension_of};
use crate::http::response::{Response, StatusCode};

/// Largest file served from memory; anything bigger is streamed.
const IN_MEMORY_BOUND: u64 = i32::MAX as u64;

/// Maps request paths onto files under a root directory.
pub struct StaticFiles {
    root: PathBuf,
    default_document: String,
    mime_lookup: MimeLookup,
}

impl StaticFiles {
    pub fn new(
        root: impl Into<PathBuf>,
        default_document: impl Into<String>,
        mime_lookup: MimeLookup,
    ) -> Self {
        Self {
            root: root.into(),
            default_document: default_document.into(),
            mime_lookup,
        }
    }

    /// Resolve a root-relative path onto the response.
    ///
    /// Empty paths resolve to the default document. Missing files and paths
    /// that try to climb out of the root give 404. Existing files get a 200
    /// with their media type, read fully into memory below the size bound
    /// and streamed above it. Permission failures map to 403, any other I/O
    /// failure to 500; both are logged with the peer and the requested path,
    /// and the response is still returned.
    pub async fn resolve(&self, relative_path: &str, peer: SocketAddr, response: &mut Response) {
        let name = if relative_path.is_empty() {
            self.default_document.as_str()
        } else {
            relative_path
        };

        if escapes_root(Path::new(name)) {
            response.set_status(StatusCode::NotFound);
            return;
        }

        let path = self.root.join(name);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                response.set_status(StatusCode::NotFound);
                return;
            }
            Err(e) => {
                self.fail(e, peer, relative_path, response);
                return;
            }
        };

        if !metadata.is_file() {
            response.set_status(StatusCode::NotFound);
            return;
        }

        let mime = extension_of(&path)
            .and_then(|ext| (self.mime_lookup)(ext))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        response.set_status(StatusCode::Ok);
        response.headers.set("Content-Type", mime);

        if metadata.len() < IN_MEMORY_BOUND {
            match fs::read(&path).await {
                Ok(bytes) => response.set_raw_content(bytes),
                Err(e) => self.fail(e, peer, relative_path, response),
            }
        } else {
            match fs::File::open(&path).await {
                Ok(file) => {
                    if let Err(e) = response.set_stream(metadata.len(), Box::new(file)) {
                        error!(peer = %peer, path = relative_path, error = %e,
                            "Could not switch response to streaming");
                        response.set_status(StatusCode::InternalServerError);
                    }
                }
                Err(e) => self.fail(e, peer, relative_path, response),
            }
        }
    }

    fn fail(&self, e: std::io::Error, peer: SocketAddr, requested: &str, response: &mut Response) {
        if e.kind() == ErrorKind::PermissionDenied {
            response.set_status(StatusCode::Forbidden);
        } else {
            response.set_status(StatusCode::InternalServerError);
        }
        error!(peer = %peer, path = requested, error = %e, "Error serving file");
    }
}

fn escapes_root(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

//! Media type lookup for static file serving.
//!
//! The resolver sees MIME resolution as an injected function so the
//! surrounding application can bring its own table; [`default_mime_lookup`]
//! covers the common cases.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Extension -> media type lookup, injected into the static file resolver.
/// Extensions are passed without the leading dot.
pub type MimeLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Media types bundled with the server, keyed by file extension.
static DEFAULT_TYPES: &[(&str, &str)] = &[
    // Web & text
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xhtml", "application/xhtml+xml"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("rss", "application/rss+xml"),
    ("atom", "application/atom+xml"),
    ("yaml", "text/yaml"),
    ("yml", "text/yaml"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("md", "text/markdown"),
    ("pdf", "application/pdf"),
    ("rtf", "application/rtf"),
    ("ics", "text/calendar"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("mid", "audio/midi"),
    // Video
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("mpeg", "video/mpeg"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    // Archives & binaries
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("wasm", "application/wasm"),
];

/// The bundled lookup: case-insensitive on the extension, `None` for
/// anything unlisted (the resolver falls back to `application/octet-stream`).
pub fn default_mime_lookup() -> MimeLookup {
    let table: HashMap<&'static str, &'static str> = DEFAULT_TYPES.iter().copied().collect();
    Arc::new(move |ext| {
        table
            .get(ext.to_ascii_lowercase().as_str())
            .map(|mime| (*mime).to_string())
    })
}

/// File extension the way the resolver keys it: everything after the last
/// dot, or `None` when there is no extension.
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_extensions() {
        let lookup = default_mime_lookup();
        assert_eq!(lookup("html"), Some("text/html".to_string()));
        assert_eq!(lookup("PNG"), Some("image/png".to_string()));
    }

    #[test]
    fn lookup_unknown_extension() {
        let lookup = default_mime_lookup();
        assert_eq!(lookup("xyzzy"), None);
    }

    #[test]
    fn extension_of_paths() {
        assert_eq!(extension_of(Path::new("site/index.html")), Some("html"));
        assert_eq!(extension_of(Path::new("archive.tar.gz")), Some("gz"));
        assert_eq!(extension_of(Path::new("LICENSE")), None);
    }
}

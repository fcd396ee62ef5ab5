use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use outpost::http::mime::default_mime_lookup;
use outpost::http::response::{Body, Response, StatusCode};
use outpost::router::static_files::StaticFiles;

fn peer() -> SocketAddr {
    "127.0.0.1:50300".parse().unwrap()
}

/// Fresh fixture directory under the OS temp dir, unique per test.
fn fixture_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("outpost-static-{}-{}", std::process::id(), tag));
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn resolver(root: &PathBuf) -> StaticFiles {
    StaticFiles::new(root.clone(), "index.html", default_mime_lookup())
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let root = fixture_root("missing");
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("missing.txt", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_existing_file_is_served_whole() {
    let root = fixture_root("whole");
    std::fs::write(root.join("data.txt"), b"0123456789").unwrap();
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("data.txt", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::Ok);
    assert_eq!(resp.headers.get("Content-Type"), Some("text/plain"));
    assert!(matches!(resp.body(), Body::Bytes(bytes) if bytes == b"0123456789"));
}

#[tokio::test]
async fn test_empty_path_serves_default_document() {
    let root = fixture_root("default-doc");
    std::fs::write(root.join("index.html"), b"<html>home</html>").unwrap();
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::Ok);
    assert_eq!(resp.headers.get("Content-Type"), Some("text/html"));
    assert!(matches!(resp.body(), Body::Bytes(bytes) if bytes == b"<html>home</html>"));
}

#[tokio::test]
async fn test_unknown_extension_falls_back_to_octet_stream() {
    let root = fixture_root("octet");
    std::fs::write(root.join("blob.weird"), b"??").unwrap();
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("blob.weird", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::Ok);
    assert_eq!(
        resp.headers.get("Content-Type"),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn test_injected_lookup_is_used() {
    let root = fixture_root("injected");
    std::fs::write(root.join("data.foo"), b"x").unwrap();
    let files = StaticFiles::new(
        root,
        "index.html",
        Arc::new(|ext: &str| (ext == "foo").then(|| "application/x-foo".to_string())),
    );

    let mut resp = Response::new();
    files.resolve("data.foo", peer(), &mut resp).await;

    assert_eq!(resp.headers.get("Content-Type"), Some("application/x-foo"));
}

#[tokio::test]
async fn test_nested_path_is_joined_under_root() {
    let root = fixture_root("nested");
    std::fs::create_dir_all(root.join("css")).unwrap();
    std::fs::write(root.join("css/site.css"), b"body{}").unwrap();
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("css/site.css", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::Ok);
    assert_eq!(resp.headers.get("Content-Type"), Some("text/css"));
}

#[tokio::test]
async fn test_parent_dir_components_are_refused() {
    let root = fixture_root("traversal");
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("../etc/passwd", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_directory_path_is_404() {
    let root = fixture_root("dir");
    std::fs::create_dir_all(root.join("subdir")).unwrap();
    let files = resolver(&root);

    let mut resp = Response::new();
    files.resolve("subdir", peer(), &mut resp).await;

    assert_eq!(resp.status, StatusCode::NotFound);
}

use std::io::{self, Read};

use lantern::http::writer::{send_internal_response, INTERNAL_FALLBACK_BODY};
use lantern::http::response::{Response, StatusCode};
use lantern::internal::{
    internal_asset_for, serve_internal_resource, AssetLoader, AssetReader, BundledAssets,
    InternalResourceError, ResourceStore, INTERNAL_RESOURCE_MAX_SIZE,
};

const BACKGROUND_JPG: &[u8] = include_bytes!("../assets/error_pages/404-background.jpg");

/// Endless stream of zeroes.
struct Zeroes;

impl Read for Zeroes {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        buf.fill(0);
        Ok(buf.len())
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

/// Serves one misbehaving asset under `name`.
enum Misbehaving {
    /// Honestly reports a size over the limit
    Oversized,
    /// Claims to be tiny, then never stops
    Lying,
    Failing,
}

struct OddLoader {
    name: &'static str,
    kind: Misbehaving,
}

impl AssetLoader for OddLoader {
    fn open(&self, name: &str) -> Option<AssetReader> {
        if name != self.name {
            return BundledAssets.open(name);
        }
        Some(match self.kind {
            Misbehaving::Oversized => AssetReader {
                available: INTERNAL_RESOURCE_MAX_SIZE + 1,
                reader: Box::new(Zeroes),
            },
            Misbehaving::Lying => AssetReader {
                available: 10,
                reader: Box::new(Zeroes),
            },
            Misbehaving::Failing => AssetReader {
                available: 10,
                reader: Box::new(FailingReader),
            },
        })
    }
}

#[test]
fn test_bundled_error_pages() {
    let store = ResourceStore::default();

    for code in [400, 401, 404, 500] {
        let page = store.read(&format!("/error_pages/{code}.html")).unwrap();
        assert_eq!(
            page,
            format!("<!DOCTYPE html><html><body>{code} Error</body></html>").into_bytes()
        );
    }
}

#[test]
fn test_bundled_names() {
    let names: Vec<&str> = BundledAssets::names().collect();

    assert_eq!(names.len(), 8);
    assert!(names.contains(&"/error_pages/404.html"));
    assert!(names.contains(&"/error_pages/500-background.jpg"));
}

#[test]
fn test_read_unknown_resource() {
    let store = ResourceStore::default();

    assert!(matches!(
        store.read("/error_pages/418.html"),
        Err(InternalResourceError::NotFound(_))
    ));
}

#[test]
fn test_read_rejects_advertised_oversize() {
    let store = ResourceStore::new(OddLoader {
        name: "/huge",
        kind: Misbehaving::Oversized,
    });

    assert!(matches!(
        store.read("/huge"),
        Err(InternalResourceError::TooLarge { size, .. }) if size == INTERNAL_RESOURCE_MAX_SIZE + 1
    ));
}

#[test]
fn test_read_stops_when_reader_lies_about_size() {
    let store = ResourceStore::new(OddLoader {
        name: "/liar",
        kind: Misbehaving::Lying,
    });

    assert!(matches!(
        store.read("/liar"),
        Err(InternalResourceError::TooLarge { size, .. }) if size > INTERNAL_RESOURCE_MAX_SIZE
    ));
}

#[test]
fn test_read_reports_io_errors() {
    let store = ResourceStore::new(OddLoader {
        name: "/broken",
        kind: Misbehaving::Failing,
    });

    assert!(matches!(store.read("/broken"), Err(InternalResourceError::Io { .. })));
}

#[test]
fn test_internal_targets_are_a_closed_set() {
    assert_eq!(internal_asset_for("/400-background.jpg"), Some("/error_pages/400-background.jpg"));
    assert_eq!(internal_asset_for("/401-background.jpg"), Some("/error_pages/401-background.jpg"));
    assert_eq!(internal_asset_for("/404-background.jpg"), Some("/error_pages/404-background.jpg"));
    assert_eq!(internal_asset_for("/500-background.jpg"), Some("/error_pages/500-background.jpg"));

    assert_eq!(internal_asset_for("/900-background.jpg"), None);
    assert_eq!(internal_asset_for("/error_pages/404.html"), None);
    assert_eq!(internal_asset_for("/error_pages/404-background.jpg"), None);
}

#[tokio::test]
async fn test_serve_internal_resource() {
    let store = ResourceStore::default();
    let mut out = Vec::new();

    assert!(serve_internal_resource(&store, "/404-background.jpg", &mut out).await);

    let head = format!(
        "HTTP/1.1 200 OK\nContent-Length: {}\nContent-Type: image/jpeg\n\n",
        BACKGROUND_JPG.len()
    );
    assert_eq!(&out[..head.len()], head.as_bytes());
    assert_eq!(&out[head.len()..], BACKGROUND_JPG);
}

#[tokio::test]
async fn test_serve_internal_resource_ignores_other_targets() {
    let store = ResourceStore::default();
    let mut out = Vec::new();

    assert!(!serve_internal_resource(&store, "/900-background.jpg", &mut out).await);
    assert!(!serve_internal_resource(&store, "/error_pages/404.html", &mut out).await);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_send_internal_response_error_page() {
    let store = ResourceStore::default();
    let mut out = Vec::new();

    let response = Response::new(StatusCode::NotFound);
    send_internal_response(&store, response, "/error_pages/404.html", &mut out).await;

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 404 Not Found\nContent-Length: 50\nContent-Type: text/html\n\n\
<!DOCTYPE html><html><body>404 Error</body></html>"
    );
}

#[tokio::test]
async fn test_send_internal_response_falls_back_when_too_large() {
    let store = ResourceStore::new(OddLoader {
        name: "/error_pages/404.html",
        kind: Misbehaving::Oversized,
    });
    let mut out = Vec::new();

    let response = Response::new(StatusCode::NotFound);
    send_internal_response(&store, response, "/error_pages/404.html", &mut out).await;

    let mut expected = format!(
        "HTTP/1.1 404 Not Found\nContent-Length: {}\nContent-Type: text/plain\n\n",
        INTERNAL_FALLBACK_BODY.len()
    )
    .into_bytes();
    expected.extend_from_slice(INTERNAL_FALLBACK_BODY);
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_send_internal_response_falls_back_when_missing() {
    let store = ResourceStore::default();
    let mut out = Vec::new();

    let response = Response::new(StatusCode::Ok);
    send_internal_response(&store, response, "/error_pages/nope.html", &mut out).await;

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 OK\nContent-Length: 59\nContent-Type: text/plain\n\n"));
    assert!(text.ends_with("Internal Server Error -- error loading internal error page."));
}

use std::io::Cursor;

use crate::internal::store::{AssetLoader, AssetReader, ResourceStore};

/// Error pages and their background images, compiled into the binary.
static BUNDLED: &[(&str, &[u8])] = &[
    ("/error_pages/400.html", include_bytes!("../../assets/error_pages/400.html")),
    ("/error_pages/401.html", include_bytes!("../../assets/error_pages/401.html")),
    ("/error_pages/404.html", include_bytes!("../../assets/error_pages/404.html")),
    ("/error_pages/500.html", include_bytes!("../../assets/error_pages/500.html")),
    (
        "/error_pages/400-background.jpg",
        include_bytes!("../../assets/error_pages/400-background.jpg"),
    ),
    (
        "/error_pages/401-background.jpg",
        include_bytes!("../../assets/error_pages/401-background.jpg"),
    ),
    (
        "/error_pages/404-background.jpg",
        include_bytes!("../../assets/error_pages/404-background.jpg"),
    ),
    (
        "/error_pages/500-background.jpg",
        include_bytes!("../../assets/error_pages/500-background.jpg"),
    ),
];

/// Loads internal resources from the compiled-in bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledAssets;

impl BundledAssets {
    pub fn names() -> impl Iterator<Item = &'static str> {
        BUNDLED.iter().map(|(name, _)| *name)
    }
}

impl AssetLoader for BundledAssets {
    fn open(&self, name: &str) -> Option<AssetReader> {
        let (_, bytes) = BUNDLED.iter().find(|(n, _)| *n == name)?;
        Some(AssetReader {
            available: bytes.len(),
            reader: Box::new(Cursor::new(*bytes)),
        })
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        ResourceStore::new(BundledAssets)
    }
}

//! Internal resources: error pages and images shipped inside the binary.
//!
//! These are served independently of the document root. Only the error
//! pages (via the internal fallback path) and the four background images
//! listed in [`INTERNAL_TARGETS`] are ever reachable from a client.

pub mod bundled;
pub mod store;

pub use bundled::BundledAssets;
pub use store::{
    AssetLoader, AssetReader, InternalResourceError, ResourceStore, INTERNAL_RESOURCE_MAX_SIZE,
};

use tokio::io::AsyncWrite;

use crate::http::response::{Response, StatusCode};
use crate::http::writer::send_internal_response;

/// Request targets answered from the bundle when no such file exists under
/// the document root, and the resource each one maps to.
pub const INTERNAL_TARGETS: &[(&str, &str)] = &[
    ("/400-background.jpg", "/error_pages/400-background.jpg"),
    ("/401-background.jpg", "/error_pages/401-background.jpg"),
    ("/404-background.jpg", "/error_pages/404-background.jpg"),
    ("/500-background.jpg", "/error_pages/500-background.jpg"),
];

/// Maps a request target to its internal resource, if it is one of the
/// reserved targets.
pub fn internal_asset_for(target: &str) -> Option<&'static str> {
    INTERNAL_TARGETS
        .iter()
        .find(|(t, _)| *t == target)
        .map(|(_, asset)| *asset)
}

/// Serves `target` from the bundle with a 200 if it is a reserved internal
/// target. Returns `false`, having written nothing, for any other target.
pub async fn serve_internal_resource<W>(store: &ResourceStore, target: &str, out: &mut W) -> bool
where
    W: AsyncWrite + Unpin,
{
    let Some(asset) = internal_asset_for(target) else {
        return false;
    };

    tracing::debug!(request_target = target, asset, "serving internal resource");
    send_internal_response(store, Response::new(StatusCode::Ok), asset, out).await;
    true
}

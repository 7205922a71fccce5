//! Lantern - a small static file server
//!
//! Serves files from a document root over a minimal HTTP/1.1 dialect, with
//! error pages bundled into the binary.

pub mod config;
pub mod files;
pub mod http;
pub mod internal;
pub mod server;

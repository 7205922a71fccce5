//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 dialect: `GET` only, no request bodies, and
//! `\n` line endings on everything the server writes.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection request/response state machine
//! - **`parser`**: Reads request heads line by line from the client
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and response heads
//! - **`writer`**: Serializes heads and streams bodies, best effort
//! - **`mime`**: Content-type detection by sniffing, with an extension fallback
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌───────────────────┐
//!   ┌──▶ │  AwaitingRequest  │ ── EOF / timeout ──────────────▶ Closed
//!   │    └─────────┬─────────┘
//!   │              │ request parsed        malformed ─▶ 400 page ─▶ Closed
//!   │              ▼
//!   │    ┌───────────────────┐
//!   │    │    Dispatching    │
//!   │    └────┬─────────┬────┘
//!   │  200    │         │ 400 / 401 / 404 / 500,
//!   │         ▼         ▼ or a bundled background image
//!   │  ┌───────────┐ ┌──────────────────┐
//!   │  │ Streaming │ │ InternalFallback │
//!   │  └─────┬─────┘ └────────┬─────────┘
//!   └────────┴────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lantern::http::connection::{Connection, ServeContext};
//! use lantern::internal::ResourceStore;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let ctx = Arc::new(ServeContext::new("./public", ResourceStore::default()));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let ctx = ctx.clone();
//!         tokio::spawn(async move {
//!             Connection::new(socket, ctx).run().await;
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;

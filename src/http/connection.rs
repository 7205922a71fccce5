use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::files::{self, FileError, OpenedFile};
use crate::http::parser::read_request;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{send_internal_response, stream_file};
use crate::internal::{serve_internal_resource, ResourceStore};

/// Everything a connection needs besides its stream. Shared by all
/// connections of a server.
pub struct ServeContext {
    /// Prefix for every resolved path, used verbatim (no trailing slash needed)
    pub document_root: String,
    /// Bundled error pages and images
    pub store: ResourceStore,
    /// How long to wait for each line of a request before giving up on the
    /// connection. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl ServeContext {
    pub fn new(document_root: impl Into<String>, store: ResourceStore) -> Self {
        Self {
            document_root: document_root.into(),
            store,
            idle_timeout: None,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

pub struct Connection<S> {
    stream: BufReader<S>,
    ctx: Arc<ServeContext>,
    state: ConnectionState,
}

/// Where a connection goes once an internal response has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterResponse {
    AwaitRequest,
    Close,
}

pub enum ConnectionState {
    AwaitingRequest,
    Dispatching(Request),
    Streaming(Response, OpenedFile),
    InternalFallback {
        response: Response,
        asset: &'static str,
        then: AfterResponse,
    },
    Closed,
}

impl ConnectionState {
    /// Answers with `status` and its bundled error page.
    fn error_page(status: StatusCode, then: AfterResponse) -> Self {
        ConnectionState::InternalFallback {
            response: Response::new(status),
            asset: status.error_page().unwrap_or("/error_pages/500.html"),
            then,
        }
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, ctx: Arc<ServeContext>) -> Self {
        Self {
            stream: BufReader::new(stream),
            ctx,
            state: ConnectionState::AwaitingRequest,
        }
    }

    /// Serves requests one after another until the client goes quiet, hangs
    /// up, or sends something unparseable.
    pub async fn run(&mut self) {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitingRequest => self.await_request().await,

                ConnectionState::Dispatching(request) => self.dispatch(request).await,

                ConnectionState::Streaming(response, opened) => {
                    if stream_file(&response, opened, self.stream.get_mut()).await {
                        ConnectionState::AwaitingRequest
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::InternalFallback { response, asset, then } => {
                    let out = self.stream.get_mut();
                    send_internal_response(&self.ctx.store, response, asset, out).await;
                    match then {
                        AfterResponse::AwaitRequest => ConnectionState::AwaitingRequest,
                        AfterResponse::Close => ConnectionState::Closed,
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::debug!(error = %e, "error shutting down client stream");
        }
        tracing::debug!("processed all requests, releasing connection");
    }

    async fn await_request(&mut self) -> ConnectionState {
        match read_request(&mut self.stream, self.ctx.idle_timeout).await {
            Ok(Some(request)) => {
                tracing::debug!(request_line = %request.request_line, "request received");
                ConnectionState::Dispatching(request)
            }
            Ok(None) => ConnectionState::Closed,
            Err(e) => {
                tracing::warn!(error = %e, "request was malformed, closing connection");
                ConnectionState::error_page(StatusCode::BadRequest, AfterResponse::Close)
            }
        }
    }

    async fn dispatch(&mut self, request: Request) -> ConnectionState {
        if request.method != Method::GET {
            tracing::info!(
                method = %request.method,
                uri = %request.target,
                status = StatusCode::BadRequest.as_u16(),
                "unsupported method"
            );
            return ConnectionState::error_page(StatusCode::BadRequest, AfterResponse::AwaitRequest);
        }

        let path = files::resolve(&self.ctx.document_root, &request.target);

        let (state, status) = match files::open(&path).await {
            Ok(opened) => {
                let mut response = Response::new(StatusCode::Ok);
                response.set_content(opened.len, opened.content_type.clone());
                (ConnectionState::Streaming(response, opened), StatusCode::Ok)
            }

            Err(FileError::AccessDenied(path)) => {
                tracing::warn!(path = %path.display(), "access denied");
                (
                    ConnectionState::error_page(
                        StatusCode::Unauthorized,
                        AfterResponse::AwaitRequest,
                    ),
                    StatusCode::Unauthorized,
                )
            }

            Err(FileError::NotFound(path)) => {
                let served = serve_internal_resource(
                    &self.ctx.store,
                    &request.target,
                    self.stream.get_mut(),
                )
                .await;

                if served {
                    (ConnectionState::AwaitingRequest, StatusCode::Ok)
                } else {
                    tracing::warn!(path = %path.display(), "file not found");
                    (
                        ConnectionState::error_page(
                            StatusCode::NotFound,
                            AfterResponse::AwaitRequest,
                        ),
                        StatusCode::NotFound,
                    )
                }
            }

            Err(e @ FileError::Io { .. }) => {
                tracing::warn!(error = %e, "unexpected error opening file");
                (
                    ConnectionState::error_page(
                        StatusCode::InternalServerError,
                        AfterResponse::AwaitRequest,
                    ),
                    StatusCode::InternalServerError,
                )
            }
        };

        tracing::info!(
            method = %request.method,
            uri = %request.target,
            status = status.as_u16(),
            "request served"
        );
        state
    }
}

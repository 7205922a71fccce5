use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{info, Instrument};

use crate::config::Config;
use crate::http::connection::{Connection, ServeContext};
use crate::internal::ResourceStore;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("listen address {0:?} is not a valid socket address")]
    InvalidAddress(String),
    #[error("something else is already using {0}")]
    AddressInUse(SocketAddr),
    #[error("no permission to bind to {0}")]
    PermissionDenied(SocketAddr),
    #[error("socket error on {addr}: {source}")]
    Socket {
        addr: String,
        #[source]
        source: io::Error,
    },
}

impl ServerError {
    /// Process exit code for a server that failed to start.
    pub fn exit_code(&self) -> u8 {
        match self {
            ServerError::AddressInUse(_) | ServerError::PermissionDenied(_) => 2,
            ServerError::InvalidAddress(_) => 3,
            ServerError::Socket { .. } => 4,
        }
    }
}

/// Binds the configured address with the configured backlog.
pub fn bind(cfg: &Config) -> Result<TcpListener, ServerError> {
    let listen_addr = &cfg.server.listen_addr;
    let addr: SocketAddr = listen_addr
        .parse()
        .map_err(|_| ServerError::InvalidAddress(listen_addr.clone()))?;

    let socket_error = |source| ServerError::Socket {
        addr: listen_addr.clone(),
        source,
    };

    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    };
    let socket = socket.map_err(socket_error)?;
    socket.set_reuseaddr(true).map_err(socket_error)?;

    socket.bind(addr).map_err(|e| match e.kind() {
        io::ErrorKind::AddrInUse => ServerError::AddressInUse(addr),
        io::ErrorKind::PermissionDenied => ServerError::PermissionDenied(addr),
        io::ErrorKind::AddrNotAvailable => ServerError::InvalidAddress(listen_addr.clone()),
        _ => socket_error(e),
    })?;

    socket.listen(cfg.server.backlog).map_err(socket_error)
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = bind(cfg)?;
    let ctx = Arc::new(
        ServeContext::new(cfg.static_files.document_root.clone(), ResourceStore::default())
            .with_idle_timeout(cfg.server.idle_timeout()),
    );
    serve(listener, ctx, cfg.server.workers).await
}

/// Accepts connections forever, running at most `workers` of them at once.
pub async fn serve(
    listener: TcpListener,
    ctx: Arc<ServeContext>,
    workers: usize,
) -> anyhow::Result<()> {
    info!(
        addr = %listener.local_addr()?,
        workers,
        document_root = %ctx.document_root,
        "Waiting for connections"
    );
    let pool = Arc::new(Semaphore::new(workers));

    loop {
        let permit = pool.clone().acquire_owned().await?;
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        let ctx = ctx.clone();
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, ctx);
                conn.run().await;
                drop(permit);
            }
            .instrument(tracing::info_span!("conn", %peer)),
        );
    }
}

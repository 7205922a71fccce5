use std::io::{self, Read};

use bytes::{BufMut, Bytes, BytesMut};

/// Largest internal resource the store will hand out.
pub const INTERNAL_RESOURCE_MAX_SIZE: usize = 1_048_576;

const CHUNK_SIZE: usize = 32 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum InternalResourceError {
    #[error("no internal resource named {0}")]
    NotFound(String),
    #[error("internal resource {name} is larger than the 1 MiB limit ({size} bytes)")]
    TooLarge { name: String, size: usize },
    #[error("failed reading internal resource {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// An opened asset: the size its source claims, and a reader over its bytes.
///
/// `available` is advisory. The store re-checks the limit while reading.
pub struct AssetReader {
    pub available: usize,
    pub reader: Box<dyn Read + Send>,
}

/// Somewhere internal resources can be loaded from.
pub trait AssetLoader: Send + Sync {
    fn open(&self, name: &str) -> Option<AssetReader>;
}

/// Read-only access to internal resources, shared by every connection.
pub struct ResourceStore {
    loader: Box<dyn AssetLoader>,
}

impl ResourceStore {
    pub fn new(loader: impl AssetLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
        }
    }

    /// Reads an internal resource in full.
    ///
    /// Fails with `TooLarge` if the advertised size is over the limit, or if
    /// more bytes than the limit actually come out of the reader.
    pub fn read(&self, name: &str) -> Result<Bytes, InternalResourceError> {
        tracing::debug!(name, "reading internal resource");

        let AssetReader { available, mut reader } = self
            .loader
            .open(name)
            .ok_or_else(|| InternalResourceError::NotFound(name.to_string()))?;

        tracing::trace!(name, available, "internal resource opened");
        if available > INTERNAL_RESOURCE_MAX_SIZE {
            return Err(InternalResourceError::TooLarge {
                name: name.to_string(),
                size: available,
            });
        }

        let mut output = BytesMut::with_capacity(available.min(INTERNAL_RESOURCE_MAX_SIZE));
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(InternalResourceError::Io {
                        name: name.to_string(),
                        source,
                    });
                }
            };

            if output.len() + n > INTERNAL_RESOURCE_MAX_SIZE {
                return Err(InternalResourceError::TooLarge {
                    name: name.to_string(),
                    size: output.len() + n,
                });
            }
            output.put_slice(&chunk[..n]);
        }

        tracing::debug!(name, size = output.len(), "internal resource read");
        Ok(output.freeze())
    }
}

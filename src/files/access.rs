use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::http::mime;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("unable to locate file: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unable to read file: {}", .0.display())]
    AccessDenied(PathBuf),
    #[error("error opening {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file opened for serving.
///
/// `head` holds the bytes already consumed from `file` for content sniffing;
/// they have to be sent before the rest of the file.
#[derive(Debug)]
pub struct OpenedFile {
    pub path: PathBuf,
    pub file: File,
    pub len: u64,
    pub content_type: String,
    pub head: Vec<u8>,
}

/// Opens `path` for reading and works out its size and content type.
///
/// Directories count as missing.
pub async fn open(path: &Path) -> Result<OpenedFile, FileError> {
    tracing::debug!(path = %path.display(), "opening file");

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| classify(path, e))?;
    if metadata.is_dir() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }

    let mut file = File::open(path).await.map_err(|e| classify(path, e))?;

    let mut head = vec![0u8; mime::SNIFF_LEN];
    let mut filled = 0;
    while filled < head.len() {
        let n = file
            .read(&mut head[filled..])
            .await
            .map_err(|e| classify(path, e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    head.truncate(filled);

    let content_type = mime::detect(Some(path), &head);

    Ok(OpenedFile {
        path: path.to_path_buf(),
        file,
        len: metadata.len(),
        content_type,
        head,
    })
}

fn classify(path: &Path, err: io::Error) -> FileError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            FileError::NotFound(path.to_path_buf())
        }
        io::ErrorKind::PermissionDenied => FileError::AccessDenied(path.to_path_buf()),
        _ => FileError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

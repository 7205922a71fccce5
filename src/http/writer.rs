use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::files::OpenedFile;
use crate::http::mime;
use crate::http::response::Response;
use crate::internal::ResourceStore;

/// Files are copied to the client this many bytes at a time.
pub const STREAM_CHUNK_SIZE: usize = 1024;

/// Sent in place of an internal resource that could not be loaded.
pub const INTERNAL_FALLBACK_BODY: &[u8] =
    b"Internal Server Error -- error loading internal error page.";

/// Serializes a response head.
///
/// Lines end in a bare `\n`, not `\r\n`. Clients of this server depend on
/// that framing.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\n");

    buf
}

/// Writes `bytes`, logging instead of failing if the peer is gone.
///
/// Returns whether the write went through so callers can skip the rest of a
/// body, but a failure is never escalated.
pub async fn write_best_effort<W>(out: &mut W, bytes: &[u8], what: &str) -> bool
where
    W: AsyncWrite + Unpin,
{
    match out.write_all(bytes).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "problem writing {} to the client", what);
            false
        }
    }
}

pub async fn flush_best_effort<W>(out: &mut W)
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = out.flush().await {
        tracing::warn!(error = %e, "problem flushing output to the client");
    }
}

/// Sends `response` with an internal resource as its body.
///
/// A resource that cannot be loaded is replaced by a short plain-text body.
/// `Content-Length` and `Content-Type` always describe the bytes actually sent.
pub async fn send_internal_response<W>(
    store: &ResourceStore,
    mut response: Response,
    asset: &str,
    out: &mut W,
) where
    W: AsyncWrite + Unpin,
{
    let (body, content_type) = match store.read(asset) {
        Ok(bytes) => {
            let content_type = mime::detect(Some(Path::new(asset)), &bytes);
            (bytes, content_type)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                asset,
                "couldn't load internal resource, sending fallback body"
            );
            let bytes = bytes::Bytes::from_static(INTERNAL_FALLBACK_BODY);
            let content_type = mime::detect(None, &bytes);
            (bytes, content_type)
        }
    };

    response.set_content(body.len() as u64, content_type);

    if write_best_effort(out, &serialize_head(&response), "response head").await {
        write_best_effort(out, &body, "internal resource").await;
    }
    flush_best_effort(out).await;
}

/// Sends `response` followed by the contents of `opened`, in
/// [`STREAM_CHUNK_SIZE`] pieces.
///
/// Returns `false` when the file could not be read to the end after the head
/// went out. The client is then short of `Content-Length` bytes and can't
/// find where a following response starts.
pub async fn stream_file<W>(response: &Response, opened: OpenedFile, out: &mut W) -> bool
where
    W: AsyncWrite + Unpin,
{
    let OpenedFile { path, file, head, .. } = opened;

    let complete = stream_body(response, &head, file, out).await;
    if !complete {
        tracing::warn!(path = %path.display(), "file body cut short");
    }
    complete
}

/// Writes the head, the already-read `head` bytes, then the rest of `body`.
///
/// Write failures are logged and end the body early but still count as
/// complete; only a failed read of `body` returns `false`.
pub async fn stream_body<R, W>(
    response: &Response,
    head: &[u8],
    mut body: R,
    out: &mut W,
) -> bool
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if !write_best_effort(out, &serialize_head(response), "response head").await {
        return true;
    }

    for chunk in head.chunks(STREAM_CHUNK_SIZE) {
        if !write_best_effort(out, chunk, "file data").await {
            return true;
        }
    }

    let mut buffer = [0u8; STREAM_CHUNK_SIZE];
    let complete = loop {
        let n = match body.read(&mut buffer).await {
            Ok(0) => break true,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "problem reading file while streaming it");
                break false;
            }
        };

        if !write_best_effort(out, &buffer[..n], "file data").await {
            return true;
        }
    };

    flush_best_effort(out).await;
    complete
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{ResponseBuilder, StatusCode};

    #[test]
    fn head_uses_bare_newlines_and_insertion_order() {
        let response = ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", "text/html")
            .header("Content-Length", "50")
            .build();

        assert_eq!(
            serialize_head(&response),
            b"HTTP/1.1 404 Not Found\nContent-Type: text/html\nContent-Length: 50\n\n".to_vec()
        );
    }

    /// Hands out `data` once, then fails every read.
    struct BrokenFile {
        data: Option<Vec<u8>>,
    }

    impl AsyncRead for BrokenFile {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    Ok(())
                }
                None => Err(std::io::Error::other("bad sector")),
            })
        }
    }

    #[tokio::test]
    async fn body_copied_after_head() {
        let response = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Length", "5")
            .build();
        let mut out = Vec::new();

        let complete = stream_body(&response, b"he", &b"llo"[..], &mut out).await;

        assert!(complete);
        assert_eq!(out, b"HTTP/1.1 200 OK\nContent-Length: 5\n\nhello".to_vec());
    }

    #[tokio::test]
    async fn failed_read_mid_body_is_reported() {
        let response = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Length", "2048")
            .build();
        let body = BrokenFile {
            data: Some(vec![7u8; 100]),
        };
        let mut out = Vec::new();

        let complete = stream_body(&response, &[0u8; 1024], body, &mut out).await;

        assert!(!complete);
        let head = b"HTTP/1.1 200 OK\nContent-Length: 2048\n\n";
        assert_eq!(out.len(), head.len() + 1024 + 100);
    }
}

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::headers::HeaderMap;
use crate::http::response::{Body, Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

fn serialize_head(status: StatusCode, headers: &HeaderMap) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (key, value) in headers.iter() {
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Head/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Serialize a response onto the connection's output.
///
/// Buffered bodies go out in one pass: `Content-Type` defaults to
/// `text/html; charset=UTF-8` when unset, and `Content-Length` is stamped
/// with the exact byte length of the payload. Streaming bodies get the same
/// head treatment with the declared length, then the source is copied in
/// `buffer_size` chunks; a source that runs dry before the declared length
/// is an error.
pub async fn write_response<W>(
    response: Response,
    stream: &mut W,
    buffer_size: usize,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let (status, mut headers, body) = response.into_parts();

    if !headers.contains("Content-Type") {
        headers.set("Content-Type", "text/html; charset=UTF-8");
    }

    match body {
        Body::Stream { len, source } => {
            headers.set("Content-Length", len.to_string());
            stream.write_all(&serialize_head(status, &headers)).await?;

            let mut taken = source.take(len);
            let mut chunk = BytesMut::with_capacity(buffer_size.max(1));
            let mut copied: u64 = 0;
            loop {
                chunk.clear();
                let n = taken.read_buf(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                stream.write_all(&chunk).await?;
                copied += n as u64;
            }
            if copied != len {
                anyhow::bail!("response stream ended after {copied} of {len} declared bytes");
            }
        }
        Body::Bytes(payload) => {
            headers.set("Content-Length", payload.len().to_string());
            let mut out = serialize_head(status, &headers);
            out.extend_from_slice(&payload);
            stream.write_all(&out).await?;
        }
        Body::Text(text) => {
            let payload = text.into_bytes();
            headers.set("Content-Length", payload.len().to_string());
            let mut out = serialize_head(status, &headers);
            out.extend_from_slice(&payload);
            stream.write_all(&out).await?;
        }
    }

    stream.flush().await?;
    Ok(())
}

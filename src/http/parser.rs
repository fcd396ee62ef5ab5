use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::http::headers::HeaderMap;
use crate::http::request::{Method, Request, RequestBody};

#[derive(Debug, Error)]
pub enum ParseError {
    /// The peer closed the stream before sending a request line.
    #[error("connection closed before a request line was sent")]
    ConnectionClosed,

    /// The request line did not have exactly three space-separated tokens.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// A POST/PUT declared a Content-Length that is not an unsigned number.
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse one HTTP request head from a line-oriented byte stream.
///
/// The request line must split on single spaces into exactly three tokens
/// (method, path, version); anything else is malformed and the caller must
/// close without responding. Unrecognized method tokens become
/// [`Method::UNKNOWN`]. Header lines are read until an empty line or stream
/// end; a line with no `:` is ignored, and the first occurrence of a key
/// wins. Lines may end in `\r\n` or bare `\n`.
///
/// For POST/PUT requests carrying a `Content-Length` header, the remaining
/// stream is bound to the request as an unread body; no body bytes are
/// consumed here.
pub async fn parse_request<R>(
    mut reader: R,
    peer: SocketAddr,
    read_timeout: Duration,
    buffer_size: usize,
) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(ParseError::ConnectionClosed);
    }
    let request_line = line.trim_end_matches(['\r', '\n']);

    let tokens: Vec<&str> = request_line.split(' ').collect();
    if tokens.len() != 3 {
        return Err(ParseError::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::parse(tokens[0]);
    let path = tokens[1].to_string();
    let version = tokens[2].to_string();

    let mut headers = HeaderMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.add(key.trim(), value.trim());
        }
        // No colon: not a header, skip the line.
    }

    let mut request = Request::new(method, path, version, headers, peer);

    if matches!(request.method, Method::POST | Method::PUT) {
        if let Some(raw) = request.header("Content-Length") {
            let declared: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))?;
            request.attach_body(RequestBody::new(
                Box::new(reader),
                declared,
                read_timeout,
                buffer_size,
            ));
        }
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::BufReader;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().expect("test addr")
    }

    #[tokio::test]
    async fn parse_simple_get() {
        let raw = Cursor::new(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec());
        let req = parse_request(BufReader::new(raw), peer(), Duration::from_secs(1), 1024)
            .await
            .unwrap();

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.header("Host"), Some("example.com"));
        assert!(!req.has_body());
    }
}

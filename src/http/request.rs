use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncReadExt};
use tokio::time::timeout;

use crate::http::headers::HeaderMap;

/// Upper bound on what a body read pre-allocates; anything larger grows as
/// bytes actually arrive.
const MAX_PREALLOC: u64 = 64 * 1024;

/// HTTP request methods.
///
/// Anything outside this set parses to [`Method::UNKNOWN`] rather than
/// failing: routing simply finds no match for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// PUT - Replace a resource
    PUT,
    /// POST - Create or submit data
    POST,
    /// DELETE - Delete a resource
    DELETE,
    /// An unrecognized method token
    UNKNOWN,
}

impl Method {
    /// Parses a method token, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// # use outpost::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::GET);
    /// assert_eq!(Method::parse("BREW"), Method::UNKNOWN);
    /// ```
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Method::GET,
            "PUT" => Method::PUT,
            "POST" => Method::POST,
            "DELETE" => Method::DELETE,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures while reading a declared request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The peer closed the stream before the declared length arrived.
    #[error("request body ended after {read} of {declared} declared bytes")]
    TruncatedBody { declared: u64, read: u64 },

    /// A chunk read exceeded the connection's read timeout.
    #[error("timed out reading request body")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub(crate) type BodyReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// The unread body of a POST/PUT request, bound to the connection's read
/// half. Nothing is read from the socket until a handler asks for it.
pub struct RequestBody {
    reader: BodyReader,
    declared_len: u64,
    read_timeout: Duration,
    buffer_size: usize,
}

impl RequestBody {
    pub(crate) fn new(
        reader: BodyReader,
        declared_len: u64,
        read_timeout: Duration,
        buffer_size: usize,
    ) -> Self {
        Self {
            reader,
            declared_len,
            read_timeout,
            buffer_size,
        }
    }

    /// The length the peer declared via `Content-Length`.
    pub fn declared_len(&self) -> u64 {
        self.declared_len
    }

    /// Read exactly the declared number of bytes, in bounded chunks. Each
    /// chunk read is subject to the connection's read timeout. Stream end
    /// before the declared length is an error, not a short result.
    pub async fn read_bytes(mut self) -> Result<Vec<u8>, BodyError> {
        let mut out = Vec::with_capacity(self.declared_len.min(MAX_PREALLOC) as usize);
        let mut chunk = vec![0u8; self.buffer_size.max(1)];
        let mut total: u64 = 0;

        while total < self.declared_len {
            // Min in u64 first so the remainder cannot wrap a 32-bit usize.
            let want = (self.declared_len - total).min(chunk.len() as u64) as usize;
            let n = timeout(self.read_timeout, self.reader.read(&mut chunk[..want]))
                .await
                .map_err(|_| BodyError::Timeout)??;
            if n == 0 {
                return Err(BodyError::TruncatedBody {
                    declared: self.declared_len,
                    read: total,
                });
            }
            out.extend_from_slice(&chunk[..n]);
            total += n as u64;
        }

        Ok(out)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("declared_len", &self.declared_len)
            .finish()
    }
}

/// A parsed HTTP request from a client.
///
/// The request line and headers are fixed once parsing completes; the body,
/// when one was bound, can be consumed exactly once.
#[derive(Debug)]
pub struct Request {
    /// The HTTP method (GET, POST, ...)
    pub method: Method,
    /// The raw request path, query suffix and all (e.g. "/search?q=x")
    pub path: String,
    /// HTTP version token as received (typically "HTTP/1.1")
    pub version: String,
    /// Request headers, first occurrence of each key
    pub headers: HeaderMap,
    /// Address of the peer that sent this request
    pub peer: SocketAddr,
    body: Option<RequestBody>,
}

impl Request {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        version: impl Into<String>,
        headers: HeaderMap,
        peer: SocketAddr,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            version: version.into(),
            headers,
            peer,
            body: None,
        }
    }

    pub(crate) fn attach_body(&mut self, body: RequestBody) {
        self.body = Some(body);
    }

    /// Header value by exact key, if the client sent it.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.headers.contains(key)
    }

    /// The declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length")?.trim().parse().ok()
    }

    /// The last path segment.
    ///
    /// For a path of `/api/foo` this is `foo`; for `/` it is empty.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Whether a body was bound to this request (POST/PUT with a
    /// `Content-Length` header).
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Read the enclosed content as bytes. Returns `None` when no body was
    /// bound, and on later calls once the body has been consumed.
    pub async fn body_bytes(&mut self) -> Result<Option<Vec<u8>>, BodyError> {
        match self.body.take() {
            Some(body) => Ok(Some(body.read_bytes().await?)),
            None => Ok(None),
        }
    }

    /// Read the enclosed content as text (UTF-8, lossy).
    pub async fn body_text(&mut self) -> Result<Option<String>, BodyError> {
        Ok(self
            .body_bytes()
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

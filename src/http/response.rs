use std::fmt;

use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::headers::HeaderMap;

/// HTTP status codes this server can respond with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 100 Continue
    Continue,
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 202 Accepted
    Accepted,
    /// 204 No Content
    NoContent,
    /// 205 Reset Content
    ResetContent,
    /// 206 Partial Content
    PartialContent,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    Found,
    /// 304 Not Modified
    NotModified,
    /// 307 Temporary Redirect
    TemporaryRedirect,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 406 Not Acceptable
    NotAcceptable,
    /// 408 Request Timeout
    RequestTimeout,
    /// 409 Conflict
    Conflict,
    /// 410 Gone
    Gone,
    /// 411 Length Required
    LengthRequired,
    /// 412 Precondition Failed
    PreconditionFailed,
    /// 413 Request Entity Too Large
    RequestEntityTooLarge,
    /// 414 Request-URI Too Long
    RequestUriTooLong,
    /// 415 Unsupported Media Type
    UnsupportedMediaType,
    /// 416 Requested Range Not Satisfiable
    RequestedRangeNotSatisfiable,
    /// 417 Expectation Failed
    ExpectationFailed,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
    /// 502 Bad Gateway
    BadGateway,
    /// 503 Service Unavailable
    ServiceUnavailable,
    /// 504 Gateway Timeout
    GatewayTimeout,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use outpost::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Found.as_u16(), 302);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Continue => 100,
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::Accepted => 202,
            StatusCode::NoContent => 204,
            StatusCode::ResetContent => 205,
            StatusCode::PartialContent => 206,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::NotModified => 304,
            StatusCode::TemporaryRedirect => 307,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::NotAcceptable => 406,
            StatusCode::RequestTimeout => 408,
            StatusCode::Conflict => 409,
            StatusCode::Gone => 410,
            StatusCode::LengthRequired => 411,
            StatusCode::PreconditionFailed => 412,
            StatusCode::RequestEntityTooLarge => 413,
            StatusCode::RequestUriTooLong => 414,
            StatusCode::UnsupportedMediaType => 415,
            StatusCode::RequestedRangeNotSatisfiable => 416,
            StatusCode::ExpectationFailed => 417,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::BadGateway => 502,
            StatusCode::ServiceUnavailable => 503,
            StatusCode::GatewayTimeout => 504,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// Returns the standard reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Continue => "Continue",
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::ResetContent => "Reset Content",
            StatusCode::PartialContent => "Partial Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::TemporaryRedirect => "Temporary Redirect",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::NotAcceptable => "Not Acceptable",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::Conflict => "Conflict",
            StatusCode::Gone => "Gone",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::PreconditionFailed => "Precondition Failed",
            StatusCode::RequestEntityTooLarge => "Request Entity Too Large",
            StatusCode::RequestUriTooLong => "Request-URI Too Long",
            StatusCode::UnsupportedMediaType => "Unsupported Media Type",
            StatusCode::RequestedRangeNotSatisfiable => "Requested Range Not Satisfiable",
            StatusCode::ExpectationFailed => "Expectation Failed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::GatewayTimeout => "Gateway Timeout",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

/// Byte source for a streaming response body.
pub type StreamSource = Box<dyn AsyncRead + Send + Unpin>;

/// Response body, exactly one of three forms.
///
/// Text accumulates via [`Response::echo`], bytes are set wholesale, and a
/// stream carries a declared length plus the source the writer copies from
/// after the head is sent.
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
    Stream { len: u64, source: StreamSource },
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Stream { len, .. } => f.debug_struct("Stream").field("len", len).finish(),
        }
    }
}

/// Violations of the response streaming contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// A second stream for the same response, or a stream with a declared
    /// length of zero.
    #[error("invalid stream state: {0}")]
    InvalidStreamState(&'static str),
}

/// An HTTP response under construction.
///
/// Handlers and the static file resolver mutate this in place; the writer
/// serializes it once dispatch completes.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::Ok,
            headers: HeaderMap::new(),
            body: Body::Text(String::new()),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Append to the text content. Ignored once a raw payload or stream has
    /// been set; raw content always wins over accumulated text.
    pub fn echo(&mut self, piece: impl fmt::Display) {
        if let Body::Text(text) = &mut self.body {
            text.push_str(&piece.to_string());
        }
    }

    /// Replace the text content. Ignored once a stream has been set.
    pub fn set_content(&mut self, content: impl Into<String>) {
        if !self.is_streaming() {
            self.body = Body::Text(content.into());
        }
    }

    /// Replace the body with a raw byte payload. Ignored once a stream has
    /// been set.
    pub fn set_raw_content(&mut self, data: Vec<u8>) {
        if !self.is_streaming() {
            self.body = Body::Bytes(data);
        }
    }

    /// Switch this response into streaming mode: `len` bytes will be copied
    /// from `source` after the head is written. At most one stream may be
    /// created per response, and its length must be nonzero.
    pub fn set_stream(&mut self, len: u64, source: StreamSource) -> Result<(), ResponseError> {
        if self.is_streaming() {
            return Err(ResponseError::InvalidStreamState(
                "a stream was already created for this response",
            ));
        }
        if len == 0 {
            return Err(ResponseError::InvalidStreamState(
                "cannot stream with a content length of zero",
            ));
        }
        self.body = Body::Stream { len, source };
        Ok(())
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.body, Body::Stream { .. })
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Text content accumulated so far, if the body is still in text form.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderMap, Body) {
        (self.status, self.headers, self.body)
    }

    /// A 404 response with the default body.
    pub fn not_found() -> Self {
        let mut response = Self::new();
        response.set_status(StatusCode::NotFound);
        response.set_content("404 Not Found");
        response
    }

    /// A 500 response with a generic body; the cause stays server-side.
    pub fn internal_error() -> Self {
        let mut response = Self::new();
        response.set_status(StatusCode::InternalServerError);
        response.set_content("500 Internal Server Error");
        response
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

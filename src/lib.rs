//! Outpost - Minimal HTTP/1.x Server
//!
//! Core library: one request per connection, regex-routed handlers with a
//! static file fallback, buffered and streaming responses.

pub mod config;
pub mod http;
pub mod router;
pub mod server;

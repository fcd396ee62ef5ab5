//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.x core: one request per connection,
//! parsed, dispatched, answered, closed.
//!
//! # Architecture
//!
//! - **`connection`**: the per-connection state machine
//! - **`parser`**: parses an incoming request head from the byte stream
//! - **`request`**: request representation with a lazily-read body
//! - **`response`**: response representation with buffered and streaming bodies
//! - **`writer`**: serializes and writes responses to the client
//! - **`headers`**: ordered header map with per-side duplicate rules
//! - **`mime`**: media type lookup for static file serving
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │    Idle     │ ← Accepted, nothing read yet
//!        └──────┬──────┘
//!               │ Start
//!               ▼
//!        ┌──────────────────┐
//!        │    Parsing       │ ← Read request line, headers, bind body
//!        └──────┬───────────┘
//!               │ Parse ok          (absent/malformed request line,
//!               ▼                    or read timeout → Closed, no bytes written)
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Route to a handler or the file fallback
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Serialize head + body, or stream the body
//!        └──────┬───────────┘
//!               │
//!               ▼
//!             Closed  ← always reached; the registry entry is dropped here
//! ```

pub mod connection;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

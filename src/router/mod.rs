//! Request routing.
//!
//! Routes are registered explicitly before the server starts: a method, a
//! whole-path regular expression, and an async handler that mutates the
//! response in place. Dispatch walks the entries in registration order and
//! the first match wins; anything unmatched falls through to the static
//! file resolver when one is configured, otherwise 404.

pub mod static_files;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Context;
use regex::Regex;
use tracing::{error, warn};

use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::router::static_files::StaticFiles;

/// Future returned by a route handler.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// A registered request handler. Handlers read the request (including its
/// body, if any) and mutate the response; an `Err` becomes a 500 and never
/// reaches the client.
///
/// The easiest way to satisfy the lifetime shape is a plain function:
///
/// ```ignore
/// fn hello<'a>(_req: &'a mut Request, resp: &'a mut Response) -> HandlerFuture<'a> {
///     Box::pin(async move {
///         resp.echo("hi");
///         Ok(())
///     })
/// }
/// ```
pub type Handler =
    Arc<dyn for<'a> Fn(&'a mut Request, &'a mut Response) -> HandlerFuture<'a> + Send + Sync>;

/// One (method, pattern, handler) binding. Identity for de-duplication is
/// (method, pattern source); matching uses the compiled anchored regex.
pub struct RouteEntry {
    method: Method,
    pattern: String,
    regex: Regex,
    handler: Handler,
}

impl RouteEntry {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

pub struct Router {
    routes: Vec<RouteEntry>,
    static_files: Option<StaticFiles>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            static_files: None,
        }
    }

    /// Enable the static file fallback for unrouted requests.
    pub fn with_static_files(mut self, static_files: StaticFiles) -> Self {
        self.static_files = Some(static_files);
        self
    }

    /// Register a route. The pattern is a regular expression matched against
    /// the whole request path (it is anchored here; `/api/[a-z]+` matches
    /// `/api/foo` but not `/api/foo/bar`). Registering the same (method,
    /// pattern) pair twice keeps the first handler.
    pub fn register<F>(&mut self, method: Method, pattern: &str, handler: F) -> anyhow::Result<()>
    where
        F: for<'a> Fn(&'a mut Request, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        if self
            .routes
            .iter()
            .any(|route| route.method == method && route.pattern == pattern)
        {
            warn!(method = %method, pattern = %pattern, "Duplicate route registration ignored");
            return Ok(());
        }

        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .with_context(|| format!("invalid route pattern {pattern:?}"))?;

        self.routes.push(RouteEntry {
            method,
            pattern: pattern.to_string(),
            regex,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn serves_static_files(&self) -> bool {
        self.static_files.is_some()
    }

    /// Dispatch a request: first registered route whose method and whole
    /// path pattern match wins. `Date` and `Server` are stamped on every
    /// response before the handler or fallback runs.
    pub async fn dispatch(&self, request: &mut Request) -> Response {
        let mut response = Response::new();
        stamp(&mut response);

        for route in &self.routes {
            if route.method == request.method && route.regex.is_match(&request.path) {
                if let Err(e) = (route.handler)(request, &mut response).await {
                    error!(peer = %request.peer, method = %request.method, path = %request.path,
                        error = %e, "Handler failed");
                    let mut failed = Response::internal_error();
                    stamp(&mut failed);
                    return failed;
                }
                return response;
            }
        }

        if let Some(static_files) = &self.static_files {
            let relative = request.path.strip_prefix('/').unwrap_or(&request.path);
            static_files
                .resolve(relative, request.peer, &mut response)
                .await;
            return response;
        }

        response.set_status(StatusCode::NotFound);
        response
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn stamp(response: &mut Response) {
    response
        .headers
        .set("Date", httpdate::fmt_http_date(SystemTime::now()));
    response.headers.set("Server", server_token());
}

fn server_token() -> String {
    format!(
        "outpost/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

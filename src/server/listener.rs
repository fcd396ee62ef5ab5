use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::router::Router;
use crate::server::registry::ConnectionRegistry;

/// Owns the listening socket and the set of live connections.
///
/// `start` blocks the calling task in an accept loop until [`Server::stop`]
/// is invoked or the bind fails. Each accepted connection is registered,
/// given the read timeout configured at that moment, and handled on its own
/// task (threaded mode) or inline on the accept task (single-threaded
/// mode). A connection failing never takes the listener down.
pub struct Server {
    config: Config,
    router: Arc<Router>,
    registry: Arc<ConnectionRegistry>,
    running: AtomicBool,
    shutdown: Notify,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Server {
    pub fn new(config: Config, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
            registry: Arc::new(ConnectionRegistry::new()),
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
            local_addr: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The address actually bound, once listening. With a configured port of
    /// 0 this is where the kernel put us.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self
            .local_addr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bind and accept until stopped. Starting a server that is already
    /// running is an error.
    pub async fn start(&self) -> anyhow::Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            bail!("this server is already running");
        }

        let result = self.accept_loop().await;

        self.set_local_addr(None);
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn accept_loop(&self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.config.server.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.config.server.listen_addr))?;
        let addr = listener.local_addr()?;
        self.set_local_addr(Some(addr));
        info!("Listening on {}", addr);

        let read_timeout = Duration::from_millis(self.config.server.read_timeout_ms);

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Stop requested, closing listener");
                    break;
                }

                accepted = listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!(error = %e, "Error accepting connection");
                            continue;
                        }
                    };
                    debug!("Accepted connection from {}", peer);

                    let id = self.registry.add(peer);
                    let connection = Connection::new(
                        id,
                        socket,
                        peer,
                        Arc::clone(&self.router),
                        Arc::clone(&self.registry),
                        read_timeout,
                        self.config.server.buffer_size,
                    );

                    if self.config.server.threaded {
                        tokio::spawn(async move {
                            if let Err(e) = connection.run().await {
                                error!(peer = %peer, error = %e, "Connection error");
                            }
                        });
                    } else if let Err(e) = connection.run().await {
                        error!(peer = %peer, error = %e, "Connection error");
                    }
                }
            }
        }

        Ok(())
    }

    /// Stop accepting and close the listening socket. In-flight connections
    /// are left to finish. Stopping a server that is not running is an
    /// error.
    pub fn stop(&self) -> anyhow::Result<()> {
        if !self.is_running() {
            bail!("this server is not running");
        }
        self.shutdown.notify_one();
        Ok(())
    }

    fn set_local_addr(&self, addr: Option<SocketAddr>) {
        *self
            .local_addr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = addr;
    }
}

use crate::shutdown::Shutdown;
use async_trait::async_trait;
use std::net;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error("serve task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("server closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;

/// HttpServer serves an axum router in the background until it is shut down.
///
/// Shutting down stops accepting new connections and waits for the requests
/// in flight to finish; how long that takes is up to hyper and the handlers.
pub struct HttpServer {
    local_addr: net::SocketAddr,
    stop: watch::Sender<bool>,
    serve: Mutex<Option<JoinHandle<std::result::Result<(), hyper::Error>>>>,
}

impl HttpServer {
    /// Binds `addr` and starts serving. Must be called from within a tokio
    /// runtime.
    pub fn bind(addr: &net::SocketAddr, router: axum::Router) -> Result<Self> {
        let (stop, mut stopped) = watch::channel(false);

        let server = axum::Server::try_bind(addr)?.serve(router.into_make_service());
        let local_addr = server.local_addr();
        info!(local_addr = local_addr.to_string(), "listening");

        let server = server.with_graceful_shutdown(async move {
            // Also stops if the HttpServer is dropped.
            let _ = stopped.changed().await;
        });

        Ok(Self {
            local_addr,
            stop,
            serve: Mutex::new(Some(tokio::spawn(server))),
        })
    }

    pub fn local_addr(&self) -> net::SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl Shutdown for HttpServer {
    type Error = Error;

    async fn shutdown(&self) -> Result<()> {
        let serve = self.serve.lock().await.take().ok_or(Error::Closed)?;

        debug!(
            local_addr = self.local_addr.to_string(),
            "closing listener, draining connections"
        );
        let _ = self.stop.send(true);

        serve.await??;

        Ok(())
    }
}

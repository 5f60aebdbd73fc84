use async_trait::async_trait;

// Shutdown is what a server has to provide to be drained.
//
// An implementation stops accepting new work, waits for in-flight work to
// finish (or ends it according to its own policy) and reports whether that
// went cleanly. It is called from a background task, at most once per drain.
#[async_trait]
pub trait Shutdown: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn shutdown(&self) -> Result<(), Self::Error>;
}

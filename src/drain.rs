//! Drain coordination.
//!
//! A [`DrainCoordinator`] waits in the background for the first termination
//! trigger, shuts the server down exactly once and then releases everyone
//! waiting on the [`Drained`] handle it returned.

use crate::shutdown::Shutdown;
use crate::signal::{Signal, Signals};
use std::fmt;
use std::future::{self, Future};
use std::io;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to register signal handlers: {0}")]
    Signal(#[from] io::Error),
    #[error("drain listener stopped before completing")]
    Abandoned,
}

pub type Result<T> = std::result::Result<T, Error>;

/// What started the drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Signal(Signal),
    Cancelled,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal) => write!(f, "{}", signal),
            Self::Cancelled => write!(f, "cancellation"),
        }
    }
}

/// Where a drain is at. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Listening,
    ShuttingDown(Trigger),
    Completed(Trigger),
}

impl Phase {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

pub struct DrainCoordinator<S> {
    server: Arc<S>,
    signals: Signals,
}

impl<S> DrainCoordinator<S>
where
    S: Shutdown + 'static,
{
    /// Subscribes to the OS termination signals right away, so a signal sent
    /// before the drain is started is not lost.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(server: Arc<S>) -> Result<Self> {
        let signals = Signals::os()?;

        Ok(Self::with_signals(server, signals))
    }

    /// Uses `signals` instead of subscribing to the OS. The drain itself still
    /// needs a tokio runtime, see [`DrainCoordinator::start`].
    pub fn with_signals(server: Arc<S>, signals: Signals) -> Self {
        Self { server, signals }
    }

    /// Starts listening; only a signal can trigger the shutdown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Drained {
        self.start_cancelable(future::pending())
    }

    /// Starts listening; either a signal or `cancel` resolving triggers the
    /// shutdown, whichever comes first. The other one is dropped.
    ///
    /// `cancel` only ends the wait. The shutdown itself is never cut short by
    /// it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_cancelable<C>(self, cancel: C) -> Drained
    where
        C: Future<Output = ()> + Send + 'static,
    {
        let (phase_sender, phase_receiver) = watch::channel(Phase::Listening);

        tokio::spawn(listen(self.server, self.signals, cancel, phase_sender));

        Drained {
            phase: phase_receiver,
        }
    }
}

/// Drains `server` on SIGINT or SIGTERM.
///
/// Must be called from within a tokio runtime.
pub fn start_drain<S>(server: Arc<S>) -> Result<Drained>
where
    S: Shutdown + 'static,
{
    Ok(DrainCoordinator::new(server)?.start())
}

/// Drains `server` on SIGINT, SIGTERM or when `cancel` resolves.
///
/// Must be called from within a tokio runtime.
pub fn start_drain_cancelable<S, C>(server: Arc<S>, cancel: C) -> Result<Drained>
where
    S: Shutdown + 'static,
    C: Future<Output = ()> + Send + 'static,
{
    Ok(DrainCoordinator::new(server)?.start_cancelable(cancel))
}

async fn listen<S, C>(
    server: Arc<S>,
    mut signals: Signals,
    cancel: C,
    phase: watch::Sender<Phase>,
) where
    S: Shutdown + 'static,
    C: Future<Output = ()> + Send + 'static,
{
    debug!("waiting for a termination trigger");

    let trigger = tokio::select! {
        signal = signals.recv() => Trigger::Signal(signal),
        _ = cancel => Trigger::Cancelled,
    };

    phase.send_replace(Phase::ShuttingDown(trigger));
    info!(%trigger, "starting shutdown sequence");

    // Run in its own task so a panicking server still lets us complete.
    let shutdown = tokio::spawn(async move { server.shutdown().await });

    match shutdown.await {
        Ok(Ok(())) => info!(%trigger, "server drained"),
        Ok(Err(err)) => error!(%err, "could not shutdown gracefully"),
        Err(err) => error!(%err, "shutdown task failed"),
    }

    phase.send_replace(Phase::Completed(trigger));
}

/// Completion handle of a drain.
///
/// Clones are independent observers. Once the drain completed, waiting
/// returns immediately, forever.
#[derive(Debug, Clone)]
pub struct Drained {
    phase: watch::Receiver<Phase>,
}

impl Drained {
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn is_drained(&self) -> bool {
        self.phase().is_completed()
    }

    /// Waits until the server has been shut down and returns what triggered
    /// it. A failed shutdown still counts as completed.
    pub async fn wait(&self) -> Result<Trigger> {
        let mut phase = self.phase.clone();

        let phase = phase
            .wait_for(Phase::is_completed)
            .await
            .map_err(|_| Error::Abandoned)?;

        match *phase {
            Phase::Completed(trigger) => Ok(trigger),
            _ => Err(Error::Abandoned),
        }
    }
}

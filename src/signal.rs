use std::fmt;
use std::io;
use tokio::sync::mpsc;

/// A process termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// A subscription to termination signals.
///
/// The subscription is live as soon as the value exists: a signal delivered
/// before anyone calls [`Signals::recv`] is buffered, not lost.
///
/// tokio installs one process-wide handler per signal kind and fans each
/// delivery out to every subscription, so any number of `Signals` may
/// coexist in a process and all of them observe the same signal.
#[derive(Debug)]
pub struct Signals {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    #[cfg(unix)]
    Os {
        interrupt: tokio::signal::unix::Signal,
        terminate: tokio::signal::unix::Signal,
    },
    #[cfg(windows)]
    CtrlC(tokio::signal::windows::CtrlC),
    Channel(mpsc::Receiver<Signal>),
}

impl Signals {
    /// Subscribes to SIGINT and SIGTERM.
    ///
    /// Must be called from within a tokio runtime.
    #[cfg(unix)]
    pub fn os() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt())?;
        let terminate = signal(SignalKind::terminate())?;

        Ok(Self {
            inner: Inner::Os {
                interrupt,
                terminate,
            },
        })
    }

    /// Subscribes to Ctrl+C, reported as [`Signal::Interrupt`].
    #[cfg(windows)]
    pub fn os() -> io::Result<Self> {
        let ctrl_c = tokio::signal::windows::ctrl_c()?;

        Ok(Self {
            inner: Inner::CtrlC(ctrl_c),
        })
    }

    /// Creates a subscription fed by hand through a single-slot channel.
    ///
    /// Useful when signals are received elsewhere and forwarded. Once every
    /// sender is dropped no signal will ever arrive.
    pub fn channel() -> (mpsc::Sender<Signal>, Self) {
        let (sender, receiver) = mpsc::channel(1);

        (
            sender,
            Self {
                inner: Inner::Channel(receiver),
            },
        )
    }

    /// Waits for the next signal.
    pub async fn recv(&mut self) -> Signal {
        match &mut self.inner {
            #[cfg(unix)]
            Inner::Os {
                interrupt,
                terminate,
            } => {
                tokio::select! {
                    Some(()) = interrupt.recv() => Signal::Interrupt,
                    Some(()) = terminate.recv() => Signal::Terminate,
                    else => std::future::pending().await,
                }
            }
            #[cfg(windows)]
            Inner::CtrlC(ctrl_c) => match ctrl_c.recv().await {
                Some(()) => Signal::Interrupt,
                None => std::future::pending().await,
            },
            Inner::Channel(receiver) => match receiver.recv().await {
                Some(signal) => signal,
                None => std::future::pending().await,
            },
        }
    }
}

//! Process lifecycle: serve until a termination signal, then tear down in order.
//!
//! ```text
//! Idle --start--> Running --signal--> Stopping --stop--> Stopped
//!                    \--serve failed--> Stopped --stop--> Stopped
//! ```
//!
//! [`App::stop`] must run whatever [`App::start`] returned: it is the only place the driver
//! and everything below it are released.

use docket_kernel::{Error, ErrorKind, Result, ResultExt};
use docket_logger::Logger;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// A driving adapter the application serves through.
pub trait Driver: Send + Sync + 'static {
    /// Serves until the driver is stopped. Resolves with an error if serving cannot begin or
    /// breaks down.
    fn start(&self) -> impl Future<Output = Result<()>> + Send;

    /// Stops accepting work, drains, then tears down what the driver owns.
    fn stop(&self) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        })
    }
}

#[derive(Debug)]
pub struct App<D> {
    driver: Arc<D>,
    state: LifecycleState,
    serve: Option<JoinHandle<Result<()>>>,
    logger: Option<Logger>,
    torn_down: bool,
}

impl<D: Driver> App<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver: Arc::new(driver),
            state: LifecycleState::Idle,
            serve: None,
            logger: None,
            torn_down: false,
        }
    }

    /// Hands the process logger to the application, which keeps it alive until
    /// [`App::take_logger`] gives it back.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Returns the logger handle so the caller can log its last lines before
    /// [`Logger::shutdown`] flushes file output.
    pub const fn take_logger(&mut self) -> Option<Logger> {
        self.logger.take()
    }

    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    /// See [`App::start_until`].
    pub async fn start(&mut self) -> Result<()> {
        self.start_until(shutdown_signal()).await
    }

    /// Serves until `signal` resolves or the driver fails, whichever comes first.
    ///
    /// A driver that finishes cleanly before the signal is not a failure; the signal is still
    /// awaited. When the signal wins, the serve task is left running for [`App::stop`].
    ///
    /// # Errors
    /// * `Internal` if the application is not idle.
    /// * The driver's failure, wrapped `"failed to start drivers"`.
    /// * The signal's own failure (for example, a handler that cannot be installed).
    pub async fn start_until<F>(&mut self, signal: F) -> Result<()>
    where
        F: Future<Output = Result<&'static str>>,
    {
        if self.state != LifecycleState::Idle {
            return Err(Error::internal(format!("cannot start application while {}", self.state)));
        }
        self.state = LifecycleState::Running;
        info!("Application started");

        let driver = Arc::clone(&self.driver);
        let mut serve = tokio::spawn(async move { driver.start().await });
        let mut serving = true;
        tokio::pin!(signal);

        let (outcome, next) = loop {
            tokio::select! {
                joined = &mut serve, if serving => {
                    serving = false;
                    let failure = match joined {
                        Ok(Ok(())) => {
                            warn!("Drivers finished before any termination signal");
                            continue;
                        },
                        Ok(Err(err)) => Error::wrap(err, "failed to start drivers"),
                        Err(err) => {
                            Error::wrap_as(ErrorKind::Internal, err, "failed to start drivers")
                        },
                    };
                    break (Err(failure), LifecycleState::Stopped);
                },
                received = &mut signal => {
                    let outcome = received.map(|name| {
                        info!(signal = name, "Termination signal received");
                    });
                    break (outcome, LifecycleState::Stopping);
                },
            }
        };

        self.state = next;
        if serving {
            self.serve = Some(serve);
        }
        outcome
    }

    /// Stops the driver and joins the serve task, all before `deadline`.
    ///
    /// Runs once. The application ends up [`LifecycleState::Stopped`] whatever the outcome.
    /// The logger handle stays owned by the application; see [`App::take_logger`].
    ///
    /// # Errors
    /// * `Internal` on a second call.
    /// * `Internal` when `deadline` has passed or passes while stopping; the serve task is
    ///   aborted in that case.
    /// * The driver's failure, wrapped `"failed to gracefully stop rest server"`.
    pub async fn stop(&mut self, deadline: Instant) -> Result<()> {
        if self.torn_down {
            return Err(Error::internal("application has already been stopped"));
        }
        self.torn_down = true;
        if self.state != LifecycleState::Stopped {
            self.state = LifecycleState::Stopping;
        }

        let outcome = if Instant::now() >= deadline {
            if let Some(serve) = self.serve.take() {
                serve.abort();
            }
            Err(Error::internal("failed to stop application: deadline exceeded"))
        } else {
            self.stop_before(deadline).await
        };

        self.state = LifecycleState::Stopped;
        if let Err(err) = &outcome {
            error!(error = %err, "Application stopped with errors");
        } else {
            info!("Application stopped");
        }
        outcome
    }

    async fn stop_before(&mut self, deadline: Instant) -> Result<()> {
        let driver = Arc::clone(&self.driver);
        let serve = self.serve.take();
        let abort = serve.as_ref().map(JoinHandle::abort_handle);

        match tokio::time::timeout_at(deadline, Self::drain(driver, serve)).await {
            Ok(outcome) => outcome,
            Err(elapsed) => {
                if let Some(abort) = abort {
                    abort.abort();
                }
                Err(Error::wrap_as(
                    ErrorKind::Internal,
                    elapsed,
                    "failed to stop application: deadline exceeded",
                ))
            },
        }
    }

    /// Stops the driver, then waits for the serve task to wind down.
    async fn drain(driver: Arc<D>, serve: Option<JoinHandle<Result<()>>>) -> Result<()> {
        driver.stop().await.context("failed to gracefully stop rest server")?;

        let Some(serve) = serve else { return Ok(()) };
        match serve.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                warn!(error = %err, "Drivers reported an error while shutting down");
                Ok(())
            },
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => Err(Error::wrap_as(ErrorKind::Internal, err, "serve task failed")),
        }
    }
}

/// Resolves with the signal's name on SIGINT or, on unix, SIGTERM.
///
/// # Errors
/// `Internal` if a handler cannot be installed.
pub async fn shutdown_signal() -> Result<&'static str> {
    let interrupt = async {
        signal::ctrl_c().await.map_err(|e| {
            Error::wrap_as(ErrorKind::Internal, e, "failed to install SIGINT handler")
        })?;
        Ok::<_, Error>("SIGINT")
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(|e| {
                Error::wrap_as(ErrorKind::Internal, e, "failed to install SIGTERM handler")
            })?
            .recv()
            .await;
        Ok::<_, Error>("SIGTERM")
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<&'static str>>();

    tokio::select! {
        received = interrupt => received,
        received = terminate => received,
    }
}

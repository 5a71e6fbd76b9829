use docket_kernel::prelude::*;
use docket_server::{App, Driver, LifecycleState};
use std::future::pending;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// How the fake driver's `start` behaves.
#[derive(Debug, Clone, Copy)]
enum Serve {
    /// Serves until `stop` is called.
    UntilStopped,
    Fails,
    Finishes,
}

#[derive(Debug)]
struct FakeDriver {
    serve: Serve,
    stop_delay: Duration,
    stop_fails: bool,
    stopped: Notify,
    stops: AtomicUsize,
}

impl FakeDriver {
    fn new(serve: Serve) -> Self {
        Self {
            serve,
            stop_delay: Duration::ZERO,
            stop_fails: false,
            stopped: Notify::new(),
            stops: AtomicUsize::new(0),
        }
    }

    fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Driver for FakeDriver {
    async fn start(&self) -> Result<()> {
        match self.serve {
            Serve::UntilStopped => {
                self.stopped.notified().await;
                Ok(())
            },
            Serve::Fails => Err(Error::internal("address already in use")),
            Serve::Finishes => Ok(()),
        }
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.stop_delay).await;
        self.stopped.notify_one();
        if self.stop_fails {
            return Err(Error::internal("teardown failed"));
        }
        Ok(())
    }
}

fn soon() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

#[tokio::test]
async fn signal_then_stop_runs_the_full_lifecycle() {
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped));
    assert_eq!(app.state(), LifecycleState::Idle);

    app.start_until(async { Ok::<_, Error>("SIGTERM") }).await.unwrap();
    assert_eq!(app.state(), LifecycleState::Stopping);

    app.stop(soon()).await.unwrap();
    assert_eq!(app.state(), LifecycleState::Stopped);
    assert_eq!(app.driver().stops(), 1);
}

#[tokio::test]
async fn serve_failure_is_returned_and_stop_still_tears_down() {
    let mut app = App::new(FakeDriver::new(Serve::Fails));

    let err = app.start_until(pending()).await.unwrap_err();
    assert_eq!(err.to_string(), "failed to start drivers: address already in use");
    assert!(err.is(ErrorKind::Internal));
    assert_eq!(app.state(), LifecycleState::Stopped);

    app.stop(soon()).await.unwrap();
    assert_eq!(app.driver().stops(), 1);
    assert_eq!(app.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn clean_serve_exit_waits_for_the_signal() {
    let mut app = App::new(FakeDriver::new(Serve::Finishes));

    let signal = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, Error>("SIGINT")
    };
    app.start_until(signal).await.unwrap();
    assert_eq!(app.state(), LifecycleState::Stopping);

    app.stop(soon()).await.unwrap();
    assert_eq!(app.driver().stops(), 1);
}

#[tokio::test]
async fn signal_failure_is_returned_and_leaves_the_app_stoppable() {
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped));

    let failing = async { Err::<&'static str, _>(Error::internal("failed to install SIGINT handler")) };
    let err = app.start_until(failing).await.unwrap_err();
    assert!(err.is(ErrorKind::Internal));
    assert_eq!(app.state(), LifecycleState::Stopping);

    app.stop(soon()).await.unwrap();
    assert_eq!(app.driver().stops(), 1);
}

#[tokio::test]
async fn start_twice_is_rejected() {
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped));
    app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap();

    let err = app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap_err();
    assert!(err.is(ErrorKind::Internal));
    assert_eq!(app.state(), LifecycleState::Stopping);

    app.stop(soon()).await.unwrap();
}

#[tokio::test]
async fn expired_deadline_fails_without_touching_the_driver() {
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped));
    app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap();

    let err = app.stop(Instant::now()).await.unwrap_err();
    assert!(err.is(ErrorKind::Internal));
    assert!(err.to_string().contains("deadline exceeded"));
    assert_eq!(app.driver().stops(), 0);
    assert_eq!(app.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn slow_teardown_is_cut_off_at_the_deadline() {
    let mut driver = FakeDriver::new(Serve::UntilStopped);
    driver.stop_delay = Duration::from_secs(30);
    let mut app = App::new(driver);
    app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap();

    let started = Instant::now();
    let err = app.stop(Instant::now() + Duration::from_millis(50)).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(err.is(ErrorKind::Internal));
    assert!(err.to_string().starts_with("failed to stop application: deadline exceeded"));
    assert_eq!(app.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn driver_stop_failure_is_wrapped() {
    let mut driver = FakeDriver::new(Serve::UntilStopped);
    driver.stop_fails = true;
    let mut app = App::new(driver);
    app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap();

    let err = app.stop(soon()).await.unwrap_err();
    assert_eq!(err.to_string(), "failed to gracefully stop rest server: teardown failed");
    assert!(err.is(ErrorKind::Internal));
    assert_eq!(app.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn stop_runs_only_once() {
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped));
    app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap();
    app.stop(soon()).await.unwrap();

    let err = app.stop(soon()).await.unwrap_err();
    assert!(err.is(ErrorKind::Internal));
    assert_eq!(err.to_string(), "application has already been stopped");
    assert_eq!(app.driver().stops(), 1);
}

#[tokio::test]
async fn stop_without_start_still_tears_down() {
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped));

    app.stop(soon()).await.unwrap();
    assert_eq!(app.driver().stops(), 1);
    assert_eq!(app.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn logger_outlives_stop_and_flushes_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let logger = docket_logger::Logger::builder()
        .name("docket-app-test")
        .console(false)
        .path(dir.path())
        .level(docket_logger::LevelFilter::INFO)
        .init()
        .unwrap();
    let mut app = App::new(FakeDriver::new(Serve::UntilStopped)).with_logger(logger);
    app.start_until(async { Ok::<_, Error>("SIGINT") }).await.unwrap();
    app.stop(soon()).await.unwrap();

    tracing::info!("Application closed");
    let logger = app.take_logger().unwrap();
    assert!(app.take_logger().is_none());
    logger.shutdown();

    let contents: String = std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "log"))
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap())
        .collect();
    assert!(contents.contains("Application stopped"), "{contents}");
    assert!(contents.contains("Application closed"), "{contents}");
}

use anyhow::{Context, anyhow};
use docket_kernel::config::Settings;
use docket_server::bootstrap::{self, CONFIG_ENV};
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{error, info};

const INIT_TIMEOUT: Duration = Duration::from_secs(15);
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

#[docket_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    let mut app = timeout(INIT_TIMEOUT, async {
        let config_path = std::env::var(CONFIG_ENV).ok();
        let settings = Settings::load(config_path.as_deref())?;
        let logger = bootstrap::init_logger(&settings)?;
        Ok::<_, docket_kernel::Error>(bootstrap::build_app(&settings).await?.with_logger(logger))
    })
    .await
    .map_err(|_| anyhow!("Application initialization timed out after {INIT_TIMEOUT:?}"))?
    .context("Failed to initialize application")?;

    let started = app.start().await;
    if let Err(err) = &started {
        error!(error = %err, "Application failed while running");
    }
    let stopped = app.stop(Instant::now() + STOP_TIMEOUT).await;

    info!("Application closed");
    if let Some(logger) = app.take_logger() {
        logger.shutdown();
    }

    started.context("Failed to run application")?;
    stopped.context("Failed to stop application")?;
    Ok(())
}

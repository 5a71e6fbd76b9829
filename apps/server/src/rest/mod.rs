//! HTTP driving adapter.
//!
//! [`RestServer`] exposes the documents service over two routes:
//!
//! | Method | Path               | Success                        |
//! |--------|--------------------|--------------------------------|
//! | GET    | `/documents/{id}`  | 200, JSON document             |
//! | POST   | `/documents`       | 200, the new id as plain text  |
//!
//! Classified failures become `404`/`400`; everything else is a `500` with a generic body.

mod handlers;
mod router;

pub use handlers::ApiError;
pub use router::router;

use crate::app::Driver;
use axum::Router;
use axum_server::Handle;
use docket_documents::DocumentService;
use docket_kernel::config::Configuration;
use docket_kernel::domain::constants::POST_DOCUMENT_SCHEMA;
use docket_kernel::ports::SchemaValidator;
use docket_kernel::{Error, ErrorKind, Result, ResultExt};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

pub const PORT_KEY: &str = "server.port";
pub const TIMEOUT_KEY: &str = "server.timeout";
pub const SCHEMA_KEY: &str = "server.schema";

/// Extra time granted to the listener after the drain timeout before stop moves on.
const DRAIN_SLACK: Duration = Duration::from_secs(1);

/// Shared request state: the domain service and the payload validator.
#[derive(Debug)]
pub struct RestState<D, V> {
    pub domain: D,
    pub validator: V,
}

impl<D: DocumentService, V: SchemaValidator> RestState<D, V> {
    pub fn new(domain: D, validator: V) -> Arc<Self> {
        Arc::new(Self { domain, validator })
    }
}

#[derive(Debug)]
pub struct RestServer<D, V> {
    port: u16,
    timeout: Duration,
    handle: Handle<SocketAddr>,
    serving: watch::Sender<bool>,
    state: Arc<RestState<D, V>>,
}

impl<D: DocumentService, V: SchemaValidator> RestServer<D, V> {
    /// Builds the adapter from `server.port`, `server.timeout` and `server.schema`.
    ///
    /// The schema file is read and registered under
    /// [`POST_DOCUMENT_SCHEMA`] before anything is bound.
    ///
    /// # Errors
    /// Missing keys are `NotFound`. A malformed value, an out of range port or an unreadable
    /// schema file are `Internal`. A schema that does not compile is `BadRequest`.
    pub async fn new(conf: &impl Configuration, domain: D, validator: V) -> Result<Self> {
        let port = conf.get_int(PORT_KEY)?;
        let port = u16::try_from(port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| Error::internal(format!("port ({port}) must be within 1..=65535")))?;
        let timeout = conf.get_duration(TIMEOUT_KEY)?;
        let schema_path = conf.get_string(SCHEMA_KEY)?;

        let schema = tokio::fs::read(&schema_path).await.map_err(|e| {
            let message = format!("failed to read schema file ({schema_path})");
            Error::wrap_as(ErrorKind::Internal, e, message)
        })?;
        validator
            .set_schema(POST_DOCUMENT_SCHEMA, &schema)
            .with_context(|| format!("failed to register schema ({schema_path})"))?;

        info!(port, timeout = ?timeout, schema = %schema_path, "REST server configured");

        Ok(Self {
            port,
            timeout,
            handle: Handle::new(),
            serving: watch::Sender::new(false),
            state: RestState::new(domain, validator),
        })
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The routes with their middleware, independent of any listener.
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state), self.timeout)
    }

    async fn wait_until_drained(&self) {
        let mut serving = self.serving.subscribe();
        let drained = tokio::time::timeout(
            self.timeout + DRAIN_SLACK,
            serving.wait_for(|serving| !serving),
        )
        .await
        .is_ok_and(|changed| changed.is_ok());
        if !drained {
            warn!(timeout = ?self.timeout, "Listener did not drain in time");
        }
    }
}

impl<D: DocumentService, V: SchemaValidator> Driver for RestServer<D, V> {
    async fn start(&self) -> Result<()> {
        let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port));
        info!(%address, "Starting REST server on http://{address}");

        self.serving.send_replace(true);
        let served = axum_server::bind(address)
            .handle(self.handle.clone())
            .serve(self.router().into_make_service())
            .await;
        self.serving.send_replace(false);

        served.map_err(|e| {
            Error::wrap_as(ErrorKind::Internal, e, format!("REST server failed on {address}"))
        })?;
        info!("REST server stopped accepting connections");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!(timeout = ?self.timeout, "Shutting down REST server");
        self.handle.graceful_shutdown(Some(self.timeout));
        self.wait_until_drained().await;

        self.state.domain.teardown().await.context("fail to tear down domain service")
    }
}

//! # Docket Server
//!
//! A document storage service: JSON documents in, ids out, served over HTTP.
//!
//! * [`rest`]: the HTTP driving adapter built on `axum`.
//! * [`app`]: the lifecycle orchestrator that serves until a termination signal and then
//!   tears everything down in order.
//! * [`bootstrap`]: explicit, ordered construction of the production object graph.
//!
//! ## Example
//! ```no_run
//! use docket_kernel::prelude::*;
//! use docket_server::bootstrap;
//! use tokio::time::{Duration, Instant};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load(Some("docket.toml"))?;
//!     let mut app = bootstrap::build_app(&settings).await?;
//!     let started = app.start().await;
//!     app.stop(Instant::now() + Duration::from_secs(10)).await?;
//!     started
//! }
//! ```

pub mod app;
pub mod bootstrap;
pub mod rest;

pub use app::{App, Driver, LifecycleState, shutdown_signal};
pub use rest::{ApiError, RestServer, RestState};

//! Production wiring, in dependency order: store → domain → schema registry → REST server.

use crate::app::App;
use crate::rest::RestServer;
use docket_documents::DocumentDomain;
use docket_kernel::config::Configuration;
use docket_kernel::{ErrorKind, Result};
use docket_logger::{Logger, parse_level};
use docket_schema::SchemaRegistry;
use docket_storage::DocumentRepository;
use tracing::info;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "DOCKET_CONFIG";

pub const LOG_LEVEL_KEY: &str = "log.level";
pub const LOG_DIR_KEY: &str = "log.dir";
pub const LOG_JSON_KEY: &str = "log.json";

/// The REST adapter as wired in production.
pub type DocketRest = RestServer<DocumentDomain<DocumentRepository>, SchemaRegistry>;

/// Installs the process logger from `log.level`, `log.dir` and `log.json`.
///
/// Console output is always on. `log.dir` adds a daily rolling file, written as JSON lines
/// when `log.json` is true.
///
/// # Errors
/// `NotFound` without `log.level`; `Internal` for an unknown level or a second install.
pub fn init_logger(conf: &impl Configuration) -> Result<Logger> {
    let level = parse_level(&conf.get_string(LOG_LEVEL_KEY)?)?;
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level);

    let logger = match optional(conf.get_string(LOG_DIR_KEY))? {
        Some(dir) => {
            let json = optional(conf.get_bool(LOG_JSON_KEY))?.unwrap_or(false);
            builder.path(dir).json(json).init()?
        },
        None => builder.init()?,
    };

    info!(level = %logger.level(), "Logger initialized");
    Ok(logger)
}

/// Connects the store and builds every layer above it.
///
/// # Errors
/// The first failing layer's error, with its classification intact.
pub async fn build_app(conf: &impl Configuration) -> Result<App<DocketRest>> {
    let store = DocumentRepository::connect(conf).await?;
    let domain = DocumentDomain::new(store);
    let schemas = SchemaRegistry::new();
    let rest = RestServer::new(conf, domain, schemas).await?;
    Ok(App::new(rest))
}

fn optional<T>(value: Result<T>) -> Result<Option<T>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is(ErrorKind::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

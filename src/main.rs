//! commandeer server binary.
//!
//! Configuration comes from `COMMANDEER_*` environment variables; see
//! [`commandeer::config`].

use std::sync::Arc;

use commandeer::commands::{self, CommandStore};
use commandeer::middleware::RequestLogging;
use commandeer::sink::Logger;
use commandeer::{health, Config, Error, Router, Server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    let logger = Logger::from_config(&config.log)?;

    // Server-level events (listen, shutdown, connection errors) go to the
    // same sink as request entries.
    logger.install_global()?;

    let store = Arc::new(CommandStore::open(&config.database)?);
    info!(database = %config.database.display(), "command store opened");

    let app = Router::new()
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);
    let app = commands::mount(app, store).layer(RequestLogging::new(logger));

    Server::bind(config.bind).await?.serve(app).await
}

//! # commandeer
//!
//! A small HTTP service for a "commands" resource, built on a minimal
//! hyper-based framework with a middleware chain and a request-logging
//! middleware that writes to an explicitly constructed, size-rotated sink.
//!
//! ## Pieces
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - A [`Middleware`](middleware::Middleware) trait: given a request and
//!   [`Next`](middleware::Next), produce a response
//! - [`RequestLogging`](middleware::RequestLogging): one "Incoming request"
//!   and one "Outgoing response" entry per call
//! - [`sink::Logger`]: `<timestamp> | <level> | <message>` lines into a
//!   rotated file, no global state
//! - The [`commands`] resource over SQLite
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use commandeer::commands::{self, CommandStore};
//! use commandeer::middleware::RequestLogging;
//! use commandeer::sink::{LogConfig, Logger};
//! use commandeer::{Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), commandeer::Error> {
//!     let logger = Logger::from_config(&LogConfig::default())?;
//!     let store = Arc::new(CommandStore::open("commands.db")?);
//!
//!     let app = commands::mount(Router::new(), store)
//!         .layer(RequestLogging::new(logger));
//!
//!     Server::bind(([0, 0, 0, 0], 8000).into()).await?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod commands;
pub mod config;
pub mod health;
pub mod middleware;
pub mod sink;

pub use config::Config;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

//! The log sink.
//!
//! A [`Logger`] is an explicitly constructed handle to one `tracing`
//! subscriber: destination, rotation policy and minimum level are fixed when
//! it is built. Code that logs through a `Logger` never consults the global
//! dispatcher, so several sinks can coexist in one process (and in tests).
//!
//! ```rust,no_run
//! use commandeer::sink::{LogConfig, Logger};
//!
//! # fn main() -> Result<(), commandeer::Error> {
//! let logger = Logger::from_config(&LogConfig::default())?;
//! logger.in_scope(|| tracing::info!("sink ready"));
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::Error;

mod format;
mod memory;
mod rolling;

pub use format::PipeFormat;
pub use memory::{MemorySink, MemoryWriter};
pub use rolling::{RollingFile, RollingWriter};

/// Rotation threshold used when none is configured: 500 MB.
pub const DEFAULT_ROTATION_BYTES: u64 = 500 * 1024 * 1024;

/// Where the sink writes and what it keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Active log file; rotated files land next to it.
    pub path: PathBuf,
    /// Rotate before the active file would exceed this many bytes.
    pub rotation_bytes: u64,
    /// Minimum severity that reaches the file.
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/app.log"),
            rotation_bytes: DEFAULT_ROTATION_BYTES,
            level: LevelFilter::INFO,
        }
    }
}

/// Handle to a configured log sink. Cloning shares the same sink.
#[derive(Clone, Debug)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Builds a sink backed by a size-rotated file.
    pub fn from_config(config: &LogConfig) -> Result<Self, Error> {
        let file = RollingFile::open(&config.path, config.rotation_bytes)?;
        Ok(Self::with_writer(file, config.level))
    }

    /// Builds a sink over any `MakeWriter`: stderr, an in-memory buffer, …
    pub fn with_writer<W>(make_writer: W, level: LevelFilter) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(level)
            .event_format(PipeFormat)
            .with_writer(make_writer)
            .finish();
        Self { dispatch: Dispatch::new(subscriber) }
    }

    /// Runs `f` with this sink as the current thread's default subscriber.
    ///
    /// `f` must not await: the scope ends when `f` returns.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Makes this sink the process-wide default, for events logged outside
    /// any [`in_scope`](Self::in_scope) call. Succeeds at most once per process.
    pub fn install_global(&self) -> Result<(), Error> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }
}

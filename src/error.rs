//! Unified error type.

/// A boxed error raised somewhere down the handler chain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by commandeer's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding a port, opening the log sink or the
/// store, bad configuration, and failures a middleware chooses to raise.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),

    /// Another subscriber was already installed process-wide.
    #[error("log sink: {0}")]
    Sink(#[from] tracing::dispatcher::SetGlobalDefaultError),

    #[error("store: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("task: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A failure produced by a middleware further down the chain.
    #[error("{0}")]
    Downstream(BoxError),
}

impl Error {
    /// Wraps any error as a [`Error::Downstream`] failure.
    pub fn downstream(err: impl Into<BoxError>) -> Self {
        Self::Downstream(err.into())
    }
}

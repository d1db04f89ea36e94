//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. A middleware receives the request together with
//! [`Next`], the rest of the chain, and decides what to do around the call:
//!
//! ```text
//! Router::call ─► layer 0 ─► layer 1 ─► … ─► endpoint
//!                  │  ▲        │  ▲
//!                  └──┘        └──┘   each layer: before → next.run(req) → after
//! ```
//!
//! Layers run in registration order: the first [`Router::layer`] call is
//! the outermost stage.
//!
//! Built-in middleware:
//! - [`RequestLogging`]: one entry line and one exit line per request
//!
//! [`Router::layer`]: crate::Router::layer

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::handler::BoxedEndpoint;
use crate::request::Request;
use crate::response::Response;

pub mod logging;

pub use logging::{Completion, Observation, RequestLogging};

/// One stage of the handler chain.
///
/// ```rust
/// use async_trait::async_trait;
/// use commandeer::middleware::{Middleware, Next};
/// use commandeer::{Error, Request, Response};
///
/// struct PoweredBy;
///
/// #[async_trait]
/// impl Middleware for PoweredBy {
///     async fn handle(&self, req: Request, next: Next) -> Result<Response, Error> {
///         let mut res = next.run(req).await?;
///         res.headers_mut().insert("x-powered-by", http::HeaderValue::from_static("commandeer"));
///         Ok(res)
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, req: Request, next: Next) -> Result<Response, Error>;
}

/// The shared, frozen middleware stack of a router.
pub(crate) type Stack = Arc<[Arc<dyn Middleware>]>;

/// The remainder of the handler chain after the current middleware.
///
/// Consumed by [`Next::run`], so a middleware delegates at most once.
pub struct Next {
    stack: Stack,
    position: usize,
    endpoint: BoxedEndpoint,
}

impl Next {
    pub(crate) fn new(stack: Stack, endpoint: BoxedEndpoint) -> Self {
        Self { stack, position: 0, endpoint }
    }

    /// Passes `req` to the next stage and resolves to its response.
    pub async fn run(self, req: Request) -> Result<Response, Error> {
        match self.stack.get(self.position).cloned() {
            Some(middleware) => {
                let rest = Next {
                    stack: self.stack,
                    position: self.position + 1,
                    endpoint: self.endpoint,
                };
                middleware.handle(req, rest).await
            }
            None => self.endpoint.call(req).await,
        }
    }
}

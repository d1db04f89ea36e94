//! Route handlers and the chain's terminal stage.
//!
//! The router stores handlers of different concrete types side by side, and
//! [`Next`](crate::middleware::Next) hands "whatever answers this request"
//! down the middleware stack. Both see a handler only as an [`Endpoint`]:
//!
//! ```text
//! async fn list(req: Request) -> impl IntoResponse { … }   ← user writes this
//!        ↓ router.get("/commands/", list)
//! list.into_endpoint()                                     ← Handler blanket impl
//!        ↓
//! Arc<dyn Endpoint>                                        ← stored in the route tree
//!        ↓
//! next.run(req) → endpoint.call(req)                       ← last stage of the chain
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// What every stage of the chain resolves to.
pub(crate) type ChainFuture = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// The innermost stage of the chain, after all middleware.
///
/// `#[doc(hidden)] pub` because it appears in the public `Handler` trait.
#[doc(hidden)]
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, req: Request) -> ChainFuture;
}

#[doc(hidden)]
pub type BoxedEndpoint = Arc<dyn Endpoint>;

/// Implemented for every valid route handler.
///
/// Satisfied by any function or closure shaped like
/// `Fn(Request) -> impl Future<Output = impl IntoResponse>`. Sealed: the
/// blanket impl is the only one.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> BoxedEndpoint;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_endpoint(self) -> BoxedEndpoint {
        Arc::new(HandlerEndpoint(self))
    }
}

/// A handler never fails the chain: its output is always rendered.
struct HandlerEndpoint<F>(F);

impl<F, Fut, R> Endpoint for HandlerEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> ChainFuture {
        let fut = (self.0)(req);
        Box::pin(async move { Ok(fut.await.into_response()) })
    }
}

/// Terminal stage answering with a bare status, for unmatched requests.
pub(crate) struct StatusEndpoint(pub(crate) http::StatusCode);

impl Endpoint for StatusEndpoint {
    fn call(&self, _req: Request) -> ChainFuture {
        let status = self.0;
        Box::pin(async move { Ok(Response::status(status)) })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    fn req() -> Request {
        http::Request::get("/").body(Bytes::new()).unwrap().into()
    }

    #[tokio::test]
    async fn handler_output_is_rendered() {
        let endpoint = (|_req: Request| async { (StatusCode::CREATED, "made") }).into_endpoint();
        let res = endpoint.call(req()).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.body().as_ref(), b"made");
    }

    #[tokio::test]
    async fn status_endpoint_has_empty_body() {
        let res = StatusEndpoint(StatusCode::NOT_FOUND).call(req()).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
    }
}

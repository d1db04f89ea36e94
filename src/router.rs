//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware registered
//! with [`Router::layer`] wraps every request, matched or not.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedEndpoint, Handler, StatusEndpoint};
use crate::middleware::{Middleware, Next, Stack};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedEndpoint>>,
    middleware: Stack,
}

enum Lookup {
    Found(BoxedEndpoint, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), middleware: Arc::from(Vec::new()) }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use commandeer::{Request, Response, Router};
    /// # async fn list(_: Request) -> Response { Response::text("") }
    /// # async fn create(_: Request) -> Response { Response::text("") }
    /// # async fn delete(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .get("/commands/",          list)
    ///     .post("/commands/",         create)
    ///     .delete("/commands/{id}",   delete);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with an existing one.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_endpoint())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Append a middleware. The first layer registered runs outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        let mut stack = self.middleware.to_vec();
        stack.push(Arc::new(middleware));
        self.middleware = stack.into();
        self
    }

    /// Runs one request through the middleware stack and its endpoint.
    ///
    /// Unknown paths end at a `404` endpoint, paths registered only under
    /// other methods at a `405` one; both still pass through every layer.
    pub async fn call(&self, mut req: Request) -> Result<Response, Error> {
        let endpoint: BoxedEndpoint = match self.lookup(req.method(), req.path()) {
            Lookup::Found(endpoint, params) => {
                req.params = params;
                endpoint
            }
            Lookup::MethodNotAllowed => Arc::new(StatusEndpoint(StatusCode::METHOD_NOT_ALLOWED)),
            Lookup::NotFound => Arc::new(StatusEndpoint(StatusCode::NOT_FOUND)),
        };
        Next::new(Arc::clone(&self.middleware), endpoint).run(req).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }
        let elsewhere = self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok());
        if elsewhere { Lookup::MethodNotAllowed } else { Lookup::NotFound }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

//! Per-request logging.
//!
//! [`RequestLogging`] writes two entries for every call that passes through
//! it, both at INFO:
//!
//! ```text
//! 2026-10-17 09:14:03 | INFO | Incoming request method=GET url=http://localhost:8000/commands/ headers={"host": "localhost:8000"} query_params={}
//! 2026-10-17 09:14:03 | INFO | Outgoing response status_code=200 duration_sec=0.000412 headers={"content-type": "application/json"}
//! ```
//!
//! When the rest of the chain fails, the exit entry is an ERROR
//! `Request failed` line carrying the error and the elapsed time, and the
//! error itself is handed back to the caller untouched.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::{HeaderMap, Method};
use tracing::{error, info};

use super::{Middleware, Next};
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::sink::Logger;

/// Logs every request on the way in and its response on the way out.
///
/// Holds its own [`Logger`]; nothing is written to the global subscriber.
#[derive(Clone, Debug)]
pub struct RequestLogging {
    logger: Logger,
}

impl RequestLogging {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl Middleware for RequestLogging {
    async fn handle(&self, req: Request, next: Next) -> Result<Response, Error> {
        let observation = Observation::capture(&req);
        self.logger.in_scope(|| observation.log_entry());

        match next.run(req).await {
            Ok(response) => {
                let completion = observation.complete(&response);
                self.logger.in_scope(|| completion.log_exit());
                Ok(response)
            }
            Err(err) => {
                let elapsed = observation.elapsed();
                self.logger.in_scope(|| {
                    error!(error = %err, duration_sec = elapsed.as_secs_f64(), "Request failed");
                });
                Err(err)
            }
        }
    }
}

// ── Observation ───────────────────────────────────────────────────────────────

/// What the middleware records about a request when it enters the chain.
///
/// Every field is an owned copy: later changes to the request made further
/// down the chain do not show up here.
#[derive(Clone, Debug)]
pub struct Observation {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
    started: Instant,
}

impl Observation {
    pub fn capture(req: &Request) -> Self {
        Self {
            started: Instant::now(),
            method: req.method().clone(),
            url: req.url(),
            headers: snapshot(req.headers()),
            query_params: req.query_params(),
        }
    }

    /// Monotonic time since [`capture`](Self::capture).
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Records the response side of the call.
    pub fn complete(&self, response: &Response) -> Completion {
        Completion {
            status_code: response.status_code().as_u16(),
            duration: self.elapsed(),
            headers: snapshot(response.headers()),
        }
    }

    fn log_entry(&self) {
        info!(
            method = %self.method,
            url = %self.url,
            headers = ?self.headers,
            query_params = ?self.query_params,
            "Incoming request"
        );
    }
}

/// What the middleware records about the response on the way out.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub status_code: u16,
    pub duration: Duration,
    pub headers: BTreeMap<String, String>,
}

impl Completion {
    fn log_exit(&self) {
        info!(
            status_code = self.status_code,
            duration_sec = self.duration.as_secs_f64(),
            headers = ?self.headers,
            "Outgoing response"
        );
    }
}

/// Flattens a header map; a repeated header keeps its first value.
fn snapshot(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (name, value) in headers {
        flat.entry(name.as_str().to_owned())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    flat
}

//! Incoming HTTP request type.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request with its body already collected.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/commands/{id}`, `req.param("id")` on `/commands/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Percent-decoded query string as a map. Repeated keys keep the last value.
    pub fn query_params(&self) -> BTreeMap<String, String> {
        self.uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The absolute URL the client asked for.
    ///
    /// Origin-form targets (`/commands/?x=1`) are resolved against the
    /// `Host` header, falling back to `localhost`.
    pub fn url(&self) -> String {
        if self.uri.scheme().is_some() {
            return self.uri.to_string();
        }
        let host = self
            .uri
            .authority()
            .map(|a| a.as_str())
            .or_else(|| self.header("host"))
            .unwrap_or("localhost");
        let target = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("http://{host}{target}")
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(target: &str) -> Request {
        http::Request::get(target)
            .header("host", "api.local:8000")
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    #[test]
    fn query_params_are_decoded_and_last_wins() {
        let req = get("/commands/?name=a%20b&x=1&x=2");
        let q = req.query_params();
        assert_eq!(q.get("name").map(String::as_str), Some("a b"));
        assert_eq!(q.get("x").map(String::as_str), Some("2"));
    }

    #[test]
    fn no_query_is_empty_map() {
        assert!(get("/commands/").query_params().is_empty());
    }

    #[test]
    fn url_uses_host_header() {
        assert_eq!(get("/commands/?x=1").url(), "http://api.local:8000/commands/?x=1");
    }

    #[test]
    fn url_keeps_absolute_targets() {
        let req: Request = http::Request::get("http://example.com/commands/")
            .body(Bytes::new())
            .unwrap()
            .into();
        assert_eq!(req.url(), "http://example.com/commands/");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = get("/");
        assert_eq!(req.header("HOST"), Some("api.local:8000"));
    }
}

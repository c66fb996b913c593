use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Address of the client on the other end of a connection.
///
/// Host and port are kept as strings because they are handed to CGI
/// programs verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peer {
    pub host: String,
    pub port: String,
}

impl From<SocketAddr> for Peer {
    fn from(addr: SocketAddr) -> Self {
        Self {
            host: addr.ip().to_string(),
            port: addr.port().to_string(),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Represents a parsed HTTP request from a client.
///
/// One `Request` exists per connection. It is filled in by the parser,
/// gets its `path` once the URI resolves inside the served root, and is
/// dropped together with the connection.
#[derive(Debug, Clone)]
pub struct Request {
    /// Client address recorded at accept time
    pub peer: Peer,
    /// The HTTP method, accepted verbatim (e.g. "GET")
    pub method: String,
    /// Path portion of the request target, query stripped
    pub uri: String,
    /// Everything after the first `?`, or the empty string
    pub query: String,
    /// Request headers; lookups are exact and case-sensitive
    pub headers: HashMap<String, String>,
    /// Canonical filesystem path, set once resolution succeeds
    pub path: Option<PathBuf>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    peer: Peer,
    method: Option<String>,
    uri: Option<String>,
    query: String,
    headers: HashMap<String, String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            peer: Peer::default(),
            method: None,
            uri: None,
            query: String::new(),
            headers: HashMap::new(),
        }
    }

    pub fn peer(mut self, peer: Peer) -> Self {
        self.peer = peer;
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the request target, splitting off the query string.
    pub fn target(mut self, target: &str) -> Self {
        let (uri, query) = split_target(target);
        self.uri = Some(uri.to_string());
        self.query = query.to_string();
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            peer: self.peer,
            method: self.method.ok_or("method missing")?,
            uri: self.uri.ok_or("uri missing")?,
            query: self.query,
            headers: self.headers,
            path: None,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// The resolved filesystem path, if resolution has happened.
    pub fn resolved_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Splits a request target on the first `?` into URI and query string.
///
/// The query is always defined: a target without `?` yields `""`.
///
/// ```
/// # use spindle::http::request::split_target;
/// assert_eq!(split_target("/cgi.sh?q=foo"), ("/cgi.sh", "q=foo"));
/// assert_eq!(split_target("/index.html"), ("/index.html", ""));
/// ```
pub fn split_target(target: &str) -> (&str, &str) {
    target.split_once('?').unwrap_or((target, ""))
}

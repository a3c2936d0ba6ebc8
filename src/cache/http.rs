//! Request and response snapshots exchanged with the presentation layer and
//! the network.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use super::errors::NetworkError;
use crate::constants::responses;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(format!("Invalid request method: {s}")),
        }
    }
}

/// Normalized cache key: method plus URL without fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Intercepted request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
        }
    }

    /// Build a GET request from an absolute URL string
    pub fn get(url: &str) -> Result<Self, NetworkError> {
        let url = Url::parse(url).map_err(|e| NetworkError::InvalidRequest(format!("{url}: {e}")))?;
        Ok(Self::new(Method::Get, url))
    }

    /// Build a request for an origin-relative path such as `/index.html`
    pub fn for_path(method: Method, origin: &Url, path: &str) -> Result<Self, NetworkError> {
        let url = origin
            .join(path)
            .map_err(|e| NetworkError::InvalidRequest(format!("{path}: {e}")))?;
        Ok(Self::new(method, url))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn key(&self) -> RequestKey {
        let mut url = self.url.clone();
        url.set_fragment(None);
        RequestKey(format!("{} {}", self.method, url))
    }

    /// Whether this request targets the same origin as `origin`
    pub fn is_same_origin(&self, origin: &Url) -> bool {
        self.url.origin() == origin.origin()
    }
}

/// Response snapshot. Cloning produces an independent copy, so a response
/// can be written to a partition and returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Plain-text 503 produced when neither cache nor network can answer
    pub fn service_unavailable(message: &str) -> Self {
        Self::new(responses::SERVICE_UNAVAILABLE, message.as_bytes().to_vec())
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// 2xx status
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_fragment() {
        let a = Request::get("https://spylt.example/index.html#top").unwrap();
        let b = Request::get("https://spylt.example/index.html").unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().as_str(), "GET https://spylt.example/index.html");
    }

    #[test]
    fn test_key_includes_method() {
        let origin = Url::parse("https://spylt.example").unwrap();
        let get = Request::for_path(Method::Get, &origin, "/api/flavors").unwrap();
        let head = Request::for_path(Method::Head, &origin, "/api/flavors").unwrap();
        assert_ne!(get.key(), head.key());
    }

    #[test]
    fn test_same_origin() {
        let origin = Url::parse("https://spylt.example").unwrap();
        assert!(Request::get("https://spylt.example/a.css").unwrap().is_same_origin(&origin));
        assert!(!Request::get("https://cdn.example/a.css").unwrap().is_same_origin(&origin));
        assert!(!Request::get("http://spylt.example/a.css").unwrap().is_same_origin(&origin));
    }

    #[test]
    fn test_service_unavailable_shape() {
        let response = Response::service_unavailable("Offline content not available");
        assert_eq!(response.status, 503);
        assert!(!response.is_ok());
        assert_eq!(response.text(), "Offline content not available");
        assert_eq!(response.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert!("BREW".parse::<Method>().is_err());
    }
}

//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, Uri, Version};

/// An incoming HTTP request together with the peer it arrived from.
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: SocketAddr,
}

impl Request {
    /// Builds a request from its `http` representation and the address of
    /// the directly connected peer.
    pub fn from_http(req: http::Request<Bytes>, remote_addr: SocketAddr) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
            remote_addr,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The raw address of the directly connected peer.
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// The request target as sent: path and query for origin-form and
    /// HTTP/2 requests, the whole URI for HTTP/1 absolute-form.
    ///
    /// hyper rebuilds an absolute URI from the HTTP/2 pseudo-headers, so the
    /// authority alone does not tell the two apart.
    pub fn request_uri(&self) -> String {
        let origin_form = self.uri.authority().is_none()
            || self.version == Version::HTTP_2
            || self.version == Version::HTTP_3;
        match self.uri.path_and_query() {
            Some(pq) if origin_form => pq.as_str().to_owned(),
            _ => self.uri.to_string(),
        }
    }

    /// The host the request is addressed to.
    ///
    /// HTTP/2 carries it in the URI authority, HTTP/1.1 in the `Host` header.
    /// Empty if neither is present.
    pub fn host(&self) -> &str {
        if let Some(authority) = self.uri.authority() {
            return authority.as_str();
        }
        self.header(header::HOST.as_str()).unwrap_or("")
    }

    /// First value of a header, if present and valid visible ASCII.
    /// Lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value of a header, in the order received.
    pub fn header_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        self.headers.get_all(name).into_iter()
    }

    /// The `User-Agent` header, or an empty string.
    pub fn user_agent(&self) -> &str {
        self.header(header::USER_AGENT.as_str()).unwrap_or("")
    }

    /// Credentials from an `Authorization: Basic …` header.
    ///
    /// Returns `None` when the header is missing, uses another scheme, is not
    /// valid padded base64, or decodes to something without a `:`. The pair
    /// is returned as raw bytes split at the first `:`.
    pub fn basic_auth(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        const PREFIX: &[u8] = b"Basic ";

        let value = self.headers.get(header::AUTHORIZATION)?.as_bytes();
        if value.len() < PREFIX.len() || !value[..PREFIX.len()].eq_ignore_ascii_case(PREFIX) {
            return None;
        }
        let decoded = base64::decode(&value[PREFIX.len()..]).ok()?;
        let colon = decoded.iter().position(|&b| b == b':')?;
        let password = decoded[colon + 1..].to_vec();
        let mut user = decoded;
        user.truncate(colon);
        Some((user, password))
    }
}

//! HTTP Basic Authentication gate.

use std::fmt;
use std::str::FromStr;

use http::header::{self, HeaderValue};
use http::StatusCode;
use ring::constant_time::verify_slices_are_equal;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

const CHALLENGE: &str = r#"Basic realm="Please enter user and password""#;
const REJECTION: &str = "name/password is required";

// ── Credentials ───────────────────────────────────────────────────────────────

/// The username and password a [`basic_auth`] gate accepts.
///
/// `Debug` output never shows the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into() }
    }

    pub fn user(&self) -> &str { &self.user }

    /// Compares both halves in constant time. Neither comparison
    /// short-circuits the other.
    fn matches(&self, user: &[u8], password: &[u8]) -> bool {
        let user_ok = verify_slices_are_equal(self.user.as_bytes(), user).is_ok();
        let password_ok = verify_slices_are_equal(self.password.as_bytes(), password).is_ok();
        user_ok & password_ok
    }
}

/// Parses `user:password`, split at the first `:`. The password may be empty,
/// the user may not.
impl FromStr for Credentials {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((user, password)) if !user.is_empty() => Ok(Self::new(user, password)),
            _ => Err(Error::InvalidCredentials),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ── Gate ──────────────────────────────────────────────────────────────────────

/// Requires `credentials` in an `Authorization: Basic` header.
///
/// Missing, malformed or wrong credentials get `401 Unauthorized` with a
/// `WWW-Authenticate` challenge and the inner handler is not called.
pub fn basic_auth(handler: impl Handler, credentials: Credentials) -> BoxedHandler {
    BoxedHandler::new(BasicAuthGate {
        inner: handler.into_boxed_handler(),
        credentials,
    })
}

struct BasicAuthGate {
    inner: BoxedHandler,
    credentials: Credentials,
}

impl ErasedHandler for BasicAuthGate {
    fn call(&self, req: Request) -> BoxFuture {
        let authorized = req
            .basic_auth()
            .is_some_and(|(user, password)| self.credentials.matches(&user, &password));
        if authorized {
            return self.inner.call(req);
        }

        Box::pin(async {
            let mut res = Response::error(StatusCode::UNAUTHORIZED, REJECTION);
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use super::*;

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        Request::from_http(builder.body(Bytes::new()).unwrap(), "127.0.0.1:4000".parse().unwrap())
    }

    fn guarded(hits: Arc<AtomicUsize>) -> BoxedHandler {
        let inner = move |_req: Request| {
            hits.fetch_add(1, Ordering::SeqCst);
            async {
                Response::builder()
                    .status(StatusCode::ACCEPTED)
                    .header("x-inner", "yes")
                    .text("inner")
            }
        };
        basic_auth(inner, Credentials::new("alice", "secret"))
    }

    #[tokio::test]
    async fn correct_credentials_pass_through_unaltered() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = guarded(hits.clone());

        // alice:secret
        let res = handler.call(request(Some("Basic YWxpY2U6c2VjcmV0"))).await;
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()["x-inner"], "yes");
        assert!(res.headers().get(header::WWW_AUTHENTICATE).is_none());
        assert_eq!(res.body(), b"inner");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_credentials_are_challenged() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = guarded(hits.clone());

        for authorization in [
            None,
            // alice:wrong
            Some("Basic YWxpY2U6d3Jvbmc="),
            // bob:secret
            Some("Basic Ym9iOnNlY3JldA=="),
            Some("Basic not base64"),
            Some("Bearer YWxpY2U6c2VjcmV0"),
        ] {
            let res = handler.call(request(authorization)).await;
            assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED, "{authorization:?}");
            assert_eq!(res.headers()[header::WWW_AUTHENTICATE], CHALLENGE);
            assert_eq!(res.body(), b"name/password is required\n");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn parses_user_colon_password() {
        let creds: Credentials = "alice:se:cret".parse().unwrap();
        assert_eq!(creds, Credentials::new("alice", "se:cret"));

        let creds: Credentials = "alice:".parse().unwrap();
        assert_eq!(creds, Credentials::new("alice", ""));

        assert!("alice".parse::<Credentials>().is_err());
        assert!(":secret".parse::<Credentials>().is_err());
    }

    #[test]
    fn debug_hides_password() {
        let out = format!("{:?}", Credentials::new("alice", "secret"));
        assert!(out.contains("alice"));
        assert!(!out.contains("secret"));
    }
}

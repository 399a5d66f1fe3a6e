//! Method gating: single-method gates and multi-method dispatch.

use std::collections::HashMap;

use http::StatusCode;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

// ── MethodSet ─────────────────────────────────────────────────────────────────

/// Handlers keyed by HTTP method name.
///
/// The empty key `""` means "any method" and is only valid as the sole
/// entry. Registering a method twice replaces the earlier handler.
#[derive(Clone, Default)]
pub struct MethodSet {
    handlers: HashMap<String, BoxedHandler>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method`. Returns `self` for chaining.
    ///
    /// Method names are matched exactly, so `"get"` does not match a `GET`
    /// request.
    pub fn on(mut self, method: &str, handler: impl Handler) -> Self {
        self.handlers.insert(method.to_owned(), handler.into_boxed_handler());
        self
    }

    pub fn len(&self) -> usize { self.handlers.len() }
    pub fn is_empty(&self) -> bool { self.handlers.is_empty() }
}

impl<H: Handler> FromIterator<(String, H)> for MethodSet {
    fn from_iter<I: IntoIterator<Item = (String, H)>>(iter: I) -> Self {
        let handlers = iter
            .into_iter()
            .map(|(method, handler)| (method, handler.into_boxed_handler()))
            .collect();
        Self { handlers }
    }
}

// ── Gates ─────────────────────────────────────────────────────────────────────

/// Builds one handler serving every method in `methods`.
///
/// A single entry becomes a [`method_only`] gate, which is also how the
/// "any method" key `""` is served. With several entries each request is
/// dispatched by a direct lookup of its method; unknown methods get
/// `405 Method Not Allowed`.
///
/// # Errors
///
/// [`Error::NoHandlers`] for an empty set, [`Error::MixedAnyMethod`] when
/// `""` is combined with explicit methods.
pub fn multi_method(methods: MethodSet) -> Result<BoxedHandler, Error> {
    let mut handlers = methods.handlers;

    if handlers.len() <= 1 {
        let (method, handler) = handlers.drain().next().ok_or(Error::NoHandlers)?;
        return Ok(method_only(handler, &method));
    }

    if handlers.contains_key("") {
        return Err(Error::MixedAnyMethod);
    }

    handlers.shrink_to_fit();
    Ok(BoxedHandler::new(MethodRouter { handlers }))
}

/// Restricts `handler` to requests with exactly `method`.
///
/// An empty `method` places no restriction and returns the handler as is.
pub fn method_only(handler: impl Handler, method: &str) -> BoxedHandler {
    let inner = handler.into_boxed_handler();
    if method.is_empty() {
        return inner;
    }
    BoxedHandler::new(MethodGate { inner, method: method.to_owned() })
}

fn method_not_allowed() -> Response {
    let status = StatusCode::METHOD_NOT_ALLOWED;
    Response::error(status, status.canonical_reason().unwrap_or_default())
}

struct MethodGate {
    inner: BoxedHandler,
    method: String,
}

impl ErasedHandler for MethodGate {
    fn call(&self, req: Request) -> BoxFuture {
        if req.method().as_str() == self.method {
            self.inner.call(req)
        } else {
            Box::pin(async { method_not_allowed() })
        }
    }
}

struct MethodRouter {
    handlers: HashMap<String, BoxedHandler>,
}

impl ErasedHandler for MethodRouter {
    fn call(&self, req: Request) -> BoxFuture {
        match self.handlers.get(req.method().as_str()) {
            Some(handler) => handler.call(req),
            None => Box::pin(async { method_not_allowed() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use super::*;

    fn request(method: &str) -> Request {
        let req = http::Request::builder()
            .method(method)
            .uri("/")
            .body(Bytes::new())
            .unwrap();
        Request::from_http(req, "127.0.0.1:4000".parse().unwrap())
    }

    fn reply(body: &'static str) -> BoxedHandler {
        (move |_req: Request| async move { Response::text(body) }).into_boxed_handler()
    }

    fn counting(hits: Arc<AtomicUsize>) -> BoxedHandler {
        (move |_req: Request| {
            hits.fetch_add(1, Ordering::SeqCst);
            async { Response::text("inner") }
        })
        .into_boxed_handler()
    }

    #[tokio::test]
    async fn dispatches_by_method() {
        let handler = multi_method(MethodSet::new().on("GET", reply("a")).on("POST", reply("b")))
            .unwrap();

        assert_eq!(handler.call(request("GET")).await.body(), b"a");
        assert_eq!(handler.call(request("POST")).await.body(), b"b");

        let res = handler.call(request("DELETE")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.body(), b"Method Not Allowed\n");
    }

    #[tokio::test]
    async fn unmatched_method_never_reaches_handlers() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = multi_method(
            MethodSet::new()
                .on("GET", counting(hits.clone()))
                .on("PUT", counting(hits.clone())),
        )
        .unwrap();

        let res = handler.call(request("PATCH")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_any_method_entry_accepts_everything() {
        let handler = multi_method(MethodSet::new().on("", reply("any"))).unwrap();
        for method in ["GET", "POST", "DELETE", "OPTIONS", "PURGE"] {
            let res = handler.call(request(method)).await;
            assert_eq!(res.status_code(), StatusCode::OK, "{method}");
            assert_eq!(res.body(), b"any");
        }
    }

    #[tokio::test]
    async fn single_entry_is_gated() {
        let handler = multi_method(MethodSet::new().on("POST", reply("ok"))).unwrap();
        assert_eq!(handler.call(request("POST")).await.status_code(), StatusCode::OK);
        assert_eq!(
            handler.call(request("GET")).await.status_code(),
            StatusCode::METHOD_NOT_ALLOWED,
        );
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(multi_method(MethodSet::new()), Err(Error::NoHandlers)));
    }

    #[test]
    fn any_method_cannot_mix_with_explicit_methods() {
        let methods = MethodSet::new().on("", reply("any")).on("GET", reply("get"));
        assert!(matches!(multi_method(methods), Err(Error::MixedAnyMethod)));
    }

    #[tokio::test]
    async fn method_match_is_case_sensitive() {
        let handler = method_only(reply("ok"), "get");
        assert_eq!(
            handler.call(request("GET")).await.status_code(),
            StatusCode::METHOD_NOT_ALLOWED,
        );
    }

    #[tokio::test]
    async fn empty_method_passes_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = method_only(counting(hits.clone()), "");
        handler.call(request("TRACE")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn later_registration_replaces_earlier() {
        let methods: MethodSet = vec![
            ("GET".to_owned(), reply("first")),
            ("GET".to_owned(), reply("second")),
        ]
        .into_iter()
        .collect();
        assert_eq!(methods.len(), 1);
        let handler = multi_method(methods).unwrap();
        assert_eq!(handler.call(request("GET")).await.body(), b"second");
    }
}

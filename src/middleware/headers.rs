//! Common response headers.

use http::header::{self, HeaderValue};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;

/// Product tag leading the `Server` header value.
pub const SERVER_TAG: &str = "shell2http";

/// Adds `Server: shell2http <version>` to every response.
///
/// The header behaves as if set before the inner handler runs: a handler
/// that sets its own `Server` header wins. Never short-circuits.
///
/// Control characters in `version` (line breaks included) are sent as
/// spaces.
pub fn common_headers(handler: impl Handler, version: &str) -> BoxedHandler {
    BoxedHandler::new(CommonHeaders {
        inner: handler.into_boxed_handler(),
        server: server_value(version),
    })
}

fn server_value(version: &str) -> HeaderValue {
    let value: String = format!("{SERVER_TAG} {version}")
        .chars()
        .map(|c| if c.is_control() && c != '\t' { ' ' } else { c })
        .collect();
    HeaderValue::try_from(value).unwrap_or_else(|_| {
        tracing::warn!(version, "version is not a valid header value, sending the bare tag");
        HeaderValue::from_static(SERVER_TAG)
    })
}

struct CommonHeaders {
    inner: BoxedHandler,
    server: HeaderValue,
}

impl ErasedHandler for CommonHeaders {
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self.inner.call(req);
        let server = self.server.clone();
        Box::pin(async move {
            let mut res = fut.await;
            res.headers_mut().entry(header::SERVER).or_insert(server);
            res
        })
    }
}

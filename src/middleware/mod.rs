//! Request gates.
//!
//! Each function here takes a handler and returns a new [`BoxedHandler`]
//! that adds one cross-cutting behaviour around a call to it. Gates are
//! built once at startup and shared by every request; none of them keeps
//! per-request state.
//!
//! | Gate | Stops the chain with |
//! |---|---|
//! | [`multi_method`] / [`method_only`] | `405 Method Not Allowed` |
//! | [`basic_auth`] | `401 Unauthorized` + `WWW-Authenticate` |
//! | [`logging`] | never, logs one access line after the inner handler |
//! | [`common_headers`] | never, adds `Server: shell2http <version>` |
//!
//! Composition order is up to the caller. The usual chain, and the one
//! [`Config::wrap`](crate::Config::wrap) builds, is
//! headers → logging → auth → method:
//!
//! ```rust
//! use shell2http::middleware::{self, Credentials, MethodSet};
//! use shell2http::{Request, Response};
//!
//! async fn run(_req: Request) -> Response { Response::text("done") }
//!
//! let methods = MethodSet::new().on("POST", run);
//! let handler = middleware::multi_method(methods)?;
//! let handler = middleware::basic_auth(handler, Credentials::new("alice", "secret"));
//! let handler = middleware::logging(handler);
//! let handler = middleware::common_headers(handler, "1.0.0");
//! # Ok::<(), shell2http::Error>(())
//! ```
//!
//! [`BoxedHandler`]: crate::BoxedHandler

mod basic_auth;
mod headers;
mod logging;
mod method;

pub use basic_auth::{basic_auth, Credentials};
pub use headers::{common_headers, SERVER_TAG};
pub use logging::{logging, ACCESS_TARGET};
pub use method::{method_only, multi_method, MethodSet};

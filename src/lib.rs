//! # shell2http
//!
//! Request gates for the shell2http HTTP front end.
//!
//! The host turns each configured shell command into a handler. This crate
//! supplies the layers wrapped around it:
//!
//! - **Method gating** — one method per handler, or several handlers
//!   dispatched by method, with `405` for the rest
//! - **Basic auth** — `401` plus a `WWW-Authenticate` challenge unless the
//!   configured user and password are presented
//! - **Access logging** — one `tracing` line per request with host, client,
//!   method, URI, user agent and elapsed time
//! - **Common headers** — `Server: shell2http <version>` on every response
//!
//! Misconfiguration (an empty method set, mixing "any method" with explicit
//! ones) is reported as an [`Error`] while the chain is built. Once built, a
//! chain never fails; every refusal is an ordinary [`Response`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use shell2http::middleware::{Credentials, MethodSet};
//! use shell2http::{Config, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shell2http::Error> {
//!     let config = Config {
//!         basic_auth: Some(Credentials::new("alice", "secret")),
//!         ..Config::default()
//!     };
//!
//!     let handler = config.wrap(
//!         MethodSet::new()
//!             .on("GET",  show_date)
//!             .on("POST", show_date),
//!     )?;
//!
//!     Server::bind("127.0.0.1:8080")?.serve(handler).await
//! }
//!
//! async fn show_date(_req: Request) -> Response {
//!     Response::text("Mon Oct 19 12:00:00 UTC 2026\n")
//! }
//! ```

mod config;
mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;

pub use config::{Config, BASIC_AUTH_ENV};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;

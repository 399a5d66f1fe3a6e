//! Access logging.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;

/// `tracing` target of access log events.
pub const ACCESS_TARGET: &str = "shell2http::access";

const REAL_IP: &str = "x-real-ip";

/// Logs one access line per request once the inner handler has finished.
///
/// The line reads
///
/// ```text
/// <host> <client> <method> <request-uri> "<user-agent>" <elapsed>
/// ```
///
/// where `<client>` is the peer address, prefixed by the first `X-Real-Ip`
/// value and `", "` when a proxy supplied one. The response is passed through
/// untouched whatever its status.
pub fn logging(handler: impl Handler) -> BoxedHandler {
    BoxedHandler::new(RequestLogger { inner: handler.into_boxed_handler() })
}

struct RequestLogger {
    inner: BoxedHandler,
}

impl ErasedHandler for RequestLogger {
    fn call(&self, req: Request) -> BoxFuture {
        let entry = AccessEntry::from_request(&req);
        let start = Instant::now();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await;
            info!(target: ACCESS_TARGET, "{}", entry.finish(start.elapsed()));
            res
        })
    }
}

// ── Access entry ─────────────────────────────────────────────────────────────

/// Request metadata captured before the request moves into the inner handler.
struct AccessEntry {
    host: String,
    client: String,
    method: String,
    uri: String,
    user_agent: String,
}

impl AccessEntry {
    fn from_request(req: &Request) -> Self {
        Self {
            host: req.host().to_owned(),
            client: client_addr(req),
            method: req.method().as_str().to_owned(),
            uri: req.request_uri(),
            user_agent: req.user_agent().to_owned(),
        }
    }

    fn finish(self, elapsed: Duration) -> AccessLine {
        AccessLine { entry: self, elapsed }
    }
}

struct AccessLine {
    entry: AccessEntry,
    elapsed: Duration,
}

impl fmt::Display for AccessLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.entry;
        write!(
            f,
            "{} {} {} {} \"{}\" {}",
            e.host,
            e.client,
            e.method,
            e.uri,
            e.user_agent,
            Elapsed(round_millis(self.elapsed)),
        )
    }
}

/// The peer address, behind the first `X-Real-Ip` value if there is one.
fn client_addr(req: &Request) -> String {
    let remote = req.remote_addr();
    match req.header_all(REAL_IP).next() {
        Some(real_ip) => format!("{}, {remote}", String::from_utf8_lossy(real_ip.as_bytes())),
        None => remote.to_string(),
    }
}

fn round_millis(elapsed: Duration) -> u128 {
    (elapsed.as_nanos() + 500_000) / 1_000_000
}

/// Whole milliseconds rendered as `0s`, `150ms`, `1.5s`, `2m3.04s`, `1h0m0s`.
struct Elapsed(u128);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0;
        if ms == 0 {
            return f.write_str("0s");
        }
        if ms < 1000 {
            return write!(f, "{ms}ms");
        }

        let hours = ms / 3_600_000;
        let minutes = ms / 60_000 % 60;
        let seconds = ms / 1000 % 60;
        let frac = ms % 1000;

        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write!(f, "{seconds}")?;
        if frac > 0 {
            let digits = format!("{frac:03}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        f.write_str("s")
    }
}

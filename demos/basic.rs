//! Minimal gate chain over an echo handler.
//!
//! Run with:
//!   SH_BASIC_AUTH=alice:secret cargo run --example basic
//!
//! Try:
//!   curl -u alice:secret http://localhost:8080/
//!   curl -u alice:secret -X POST -d 'hi' http://localhost:8080/
//!   curl -u alice:secret -X DELETE http://localhost:8080/   → 405
//!   curl http://localhost:8080/                             → 401

use shell2http::middleware::MethodSet;
use shell2http::{Config, Request, Response, Server};

#[tokio::main]
async fn main() -> Result<(), shell2http::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let handler = config.wrap(
        MethodSet::new()
            .on("GET",  hello)
            .on("POST", echo),
    )?;

    Server::bind("0.0.0.0:8080")?.serve(handler).await
}

// GET / → fixed greeting
async fn hello(_req: Request) -> Response {
    Response::text("hello from shell2http\n")
}

// POST / → request body echoed back
async fn echo(req: Request) -> Response {
    Response::text(String::from_utf8_lossy(req.body()).into_owned())
}

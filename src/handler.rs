//! Handler trait and type erasure.
//!
//! # How handlers are stored and wrapped
//!
//! Every gate in [`middleware`](crate::middleware) takes a handler and hands
//! back a new one, so the chain needs a single concrete type that both plain
//! `async fn`s and already-wrapped handlers can become. That type is
//! [`BoxedHandler`], a cloneable trait object:
//!
//! ```text
//! async fn run(req: Request) -> Response { … }     ← user writes this
//!        ↓ middleware::method_only(run, "POST")
//! run.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! BoxedHandler(Arc::new(FnHandler(run)))            ← heap-allocated wrapper
//!        ↓ wrapped again by basic_auth, logging, …
//! handler.call(req)  at request time                ← one vtable dispatch per gate
//!        ↓
//! Box::pin(async { run(req).await.into_response() })  ← BoxFuture
//! ```
//!
//! A [`BoxedHandler`] is itself a [`Handler`], so gates compose in any order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` lets tokio move the future across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface, implemented by the function wrapper below and
/// by every gate.
pub(crate) trait ErasedHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
///
/// Cloning is one atomic reference count increment; the handler itself is
/// never copied. Build it once at startup and reuse it for every request.
#[derive(Clone)]
pub struct BoxedHandler(Arc<dyn ErasedHandler>);

impl BoxedHandler {
    pub(crate) fn new(handler: impl ErasedHandler) -> Self {
        Self(Arc::new(handler))
    }

    /// Runs the handler for one request.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for everything that can sit at a position in a gate chain.
///
/// You never implement this yourself. It is satisfied by any `async fn` with
/// the signature
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and by [`BoxedHandler`], the output of every gate.
///
/// The trait is **sealed** (via the private `Sealed` supertrait) so the set of
/// handler shapes stays under the crate's control.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        BoxedHandler::new(FnHandler(self))
    }
}

impl private::Sealed for BoxedHandler {}

impl Handler for BoxedHandler {
    fn into_boxed_handler(self) -> BoxedHandler {
        self
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype that bridges a concrete handler function to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

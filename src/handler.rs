//! Handler trait and the per-request [`Context`].
//!
//! # Why handlers return boxed futures
//!
//! A handler borrows its [`Context`] (the request, the response writer and
//! the renderer all live on the dispatching task). An `async fn` that borrows
//! its argument cannot be named as `Fn(Context<'_>) -> impl Future` in a
//! trait bound, so handlers spell the future out:
//!
//! ```rust
//! use http::StatusCode;
//! use quill::{BoxFuture, Context, HandlerResult};
//!
//! fn hello(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
//!     Box::pin(async move { ctx.text(StatusCode::OK, "hello") })
//! }
//! ```
//!
//! Any `fn` item (or closure) with that shape is a [`Handler`]. The router
//! stores them as `Arc<dyn Handler>`; the per-request cost is one virtual
//! call and one boxed future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tokio::io::AsyncRead;

use crate::error::RenderError;
use crate::render::Renderer;
use crate::request::Request;
use crate::writer::ResponseWriter;

/// A heap-allocated, type-erased future borrowing from the request scope.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a handler or middleware. An `Err` is logged by the server;
/// whatever the writer already holds is still sent.
pub type HandlerResult = Result<(), RenderError>;

// ── Handler ───────────────────────────────────────────────────────────────────

/// Implemented for every valid route handler.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: Context<'a>) -> BoxFuture<'a, HandlerResult>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(Context<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: Context<'a>) -> BoxFuture<'a, HandlerResult> {
        self(ctx)
    }
}

/// A type-erased handler shared across concurrent requests.
pub(crate) type BoxedHandler = Arc<dyn Handler>;

// ── Context ───────────────────────────────────────────────────────────────────

/// Everything one step of the handler chain may touch.
///
/// Middleware that wants to observe the response splits the context with
/// [`Context::into_parts`], wraps the writer, and hands a new context built
/// around the wrapper to [`Next::run`](crate::middleware::Next::run).
pub struct Context<'a> {
    request: &'a Request,
    writer: &'a mut dyn ResponseWriter,
    renderer: &'a Renderer,
}

impl<'a> Context<'a> {
    pub fn new(
        request: &'a Request,
        writer: &'a mut dyn ResponseWriter,
        renderer: &'a Renderer,
    ) -> Self {
        Self { request, writer, renderer }
    }

    pub fn request(&self) -> &'a Request { self.request }
    pub fn renderer(&self) -> &'a Renderer { self.renderer }
    pub fn writer(&mut self) -> &mut dyn ResponseWriter { &mut *self.writer }

    pub fn into_parts(self) -> (&'a Request, &'a mut dyn ResponseWriter, &'a Renderer) {
        (self.request, self.writer, self.renderer)
    }

    // Shortcuts onto the shared renderer.

    pub fn no_content(&mut self) -> HandlerResult {
        self.renderer.no_content(&mut *self.writer)
    }

    pub fn text(&mut self, status: StatusCode, value: &str) -> HandlerResult {
        self.renderer.text(&mut *self.writer, status, value)
    }

    pub fn html(&mut self, status: StatusCode, value: &str) -> HandlerResult {
        self.renderer.html(&mut *self.writer, status, value)
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> HandlerResult {
        self.renderer.json(&mut *self.writer, status, value)
    }

    pub fn jsonp<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        callback: &str,
        value: &T,
    ) -> HandlerResult {
        self.renderer.jsonp(&mut *self.writer, status, callback, value)
    }

    pub fn xml<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> HandlerResult {
        self.renderer.xml(&mut *self.writer, status, value)
    }

    pub async fn binary<R: AsyncRead + Unpin>(
        &mut self,
        status: StatusCode,
        source: R,
        name: &str,
        inline: bool,
    ) -> HandlerResult {
        self.renderer
            .binary(&mut *self.writer, status, source, name, inline)
            .await
    }
}

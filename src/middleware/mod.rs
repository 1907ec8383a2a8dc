//! Middleware layer.
//!
//! Middleware runs around every request, before the route handler, in the
//! order it was registered on the [`Router`](crate::Router). Each middleware
//! receives the request [`Context`] and a [`Next`] that runs the rest of the
//! chain:
//!
//! ```text
//! Router::dispatch
//!   └─▶ middleware[0].call(ctx, next)     e.g. AccessLog
//!         └─▶ next.run(ctx) ─▶ middleware[1].call(ctx, next)
//!               └─▶ next.run(ctx) ─▶ handler.call(ctx)
//! ```
//!
//! Built-in middleware:
//! - [`AccessLog`]: one colorized line per request with status and latency

use std::sync::Arc;

use crate::handler::{BoxFuture, Context, Handler, HandlerResult};

mod access_log;
mod palette;

pub use access_log::{AccessLog, DEFAULT_SKIP_PATHS, LogSink, Stdout};
pub use palette::{Color, Palette, StatusBucket};

/// A step in the request chain.
///
/// Implemented for structs such as [`AccessLog`] and for any function shaped
/// `fn<'a>(Context<'a>, Next<'a>) -> BoxFuture<'a, HandlerResult>`.
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: Context<'a>, next: Next<'a>) -> BoxFuture<'a, HandlerResult>;
}

impl<F> Middleware for F
where
    F: for<'a> Fn(Context<'a>, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: Context<'a>, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        self(ctx, next)
    }
}

/// The remainder of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(chain: &'a [Arc<dyn Middleware>], endpoint: &'a dyn Handler) -> Self {
        Self { chain, endpoint }
    }

    /// Runs the next middleware, or the handler once the chain is exhausted.
    pub fn run(self, ctx: Context<'a>) -> BoxFuture<'a, HandlerResult> {
        match self.chain.split_first() {
            Some((head, rest)) => head.call(ctx, Next::new(rest, self.endpoint)),
            None => self.endpoint.call(ctx),
        }
    }
}

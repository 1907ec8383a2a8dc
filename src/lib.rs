//! # quill
//!
//! Access logging and response rendering for a small hyper-based HTTP
//! pipeline.
//!
//! Handlers do not return response values. Each request gets one
//! [`ResponseWriter`]; middleware may wrap it, and the handler at the end of
//! the chain renders into it through the shared [`Renderer`]:
//!
//! - [`middleware::AccessLog`] wraps the writer in a
//!   [`StatusCapturingWriter`] and prints one colorized line per request
//!   once the chain returns.
//! - [`Renderer`] sets `Content-Type` (and `Content-Disposition` for files),
//!   writes the status, then serializes the body as text, HTML, JSON, JSONP,
//!   XML or raw bytes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use quill::middleware::AccessLog;
//! use quill::{BoxFuture, Context, HandlerResult, Router, Server, health};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { id: u64, name: &'static str }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .middleware(AccessLog::new())
//!         .get("/users/{id}", get_user)
//!         .get("/health", health::liveness);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! fn get_user(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
//!     Box::pin(async move {
//!         let id = ctx.request().param("id").and_then(|id| id.parse().ok());
//!         match id {
//!             Some(id) => ctx.json(StatusCode::OK, &User { id, name: "alice" }),
//!             None => ctx.text(StatusCode::BAD_REQUEST, "id must be numeric"),
//!         }
//!     })
//! }
//! ```

mod capture;
mod error;
mod handler;
mod render;
mod request;
mod router;
mod server;
mod writer;

pub mod health;
pub mod middleware;

pub use capture::{CapturedResponseState, StatusCapturingWriter};
pub use error::{Error, RenderError};
pub use handler::{BoxFuture, Context, Handler, HandlerResult};
pub use render::{ContentKind, RenderOptions, Renderer};
pub use request::Request;
pub use router::Router;
pub use server::Server;
pub use writer::{BufferedResponse, ResponseWriter};

//! Built-in health-check handlers.
//!
//! | Path | Handler | Body |
//! |---|---|---|
//! | `/health` | [`liveness`] | `ok` (text) |
//! | `/status` | [`status`] | `{"status":"ok","version":"…"}` (JSON) |
//!
//! Both paths are in the [`AccessLog`](crate::middleware::AccessLog) default
//! skip set, so probes do not show up in the access log.
//!
//! ```rust,no_run
//! use quill::{Router, health};
//!
//! let app = Router::new()
//!     .get("/health", health::liveness)
//!     .get("/status", health::status);
//! ```

use http::StatusCode;
use serde::Serialize;

use crate::handler::{BoxFuture, Context, HandlerResult};

#[derive(Serialize)]
struct Status {
    status: &'static str,
    version: &'static str,
}

/// Always `200 OK` with body `ok`. If the process can answer at all, it is
/// alive.
pub fn liveness(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move { ctx.text(StatusCode::OK, "ok") })
}

/// `200 OK` with the crate version as JSON.
pub fn status(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let body = Status { status: "ok", version: env!("CARGO_PKG_VERSION") };
        ctx.json(StatusCode::OK, &body)
    })
}

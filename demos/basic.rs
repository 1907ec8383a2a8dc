//! Minimal quill example: access log, every render method, health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/42/xml
//!   curl 'http://localhost:3000/users/42/jsonp?callback=show'
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42
//!   curl -OJ http://localhost:3000/download
//!   curl http://localhost:3000/health       (not logged)

use http::{HeaderValue, StatusCode};
use quill::middleware::AccessLog;
use quill::{BoxFuture, Context, HandlerResult, Renderer, ResponseWriter, Router, Server, health};
use serde::Serialize;

#[derive(Serialize)]
struct User {
    id: String,
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .middleware(AccessLog::new())
        .renderer(Renderer::with(|opts| opts.indent_json = true))
        .get("/users/{id}",       get_user)
        .get("/users/{id}/xml",   get_user_xml)
        .get("/users/{id}/jsonp", get_user_jsonp)
        .post("/users",           create_user)
        .delete("/users/{id}",    delete_user)
        .get("/download",         download)
        .get("/health",           health::liveness)
        .get("/status",           health::status);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

fn user(ctx: &Context<'_>) -> User {
    let id = ctx.request().param("id").unwrap_or("unknown");
    User { id: id.to_owned(), name: "alice".to_owned() }
}

// GET /users/{id}
fn get_user(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let user = user(&ctx);
        ctx.json(StatusCode::OK, &user)
    })
}

// GET /users/{id}/xml
fn get_user_xml(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let user = user(&ctx);
        ctx.xml(StatusCode::OK, &user)
    })
}

// GET /users/{id}/jsonp?callback=show
fn get_user_jsonp(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let user = user(&ctx);
        let callback = ctx
            .request()
            .uri()
            .query()
            .and_then(|q| q.split('&').find_map(|kv| kv.strip_prefix("callback=")))
            .unwrap_or("callback");
        ctx.jsonp(StatusCode::OK, callback, &user)
    })
}

// POST /users
//
// req.body() is &[u8]; parse it with serde_json::from_slice or anything else.
fn create_user(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        if ctx.request().body().is_empty() {
            return ctx.text(StatusCode::BAD_REQUEST, "empty body");
        }
        ctx.writer().headers_mut().insert("location", HeaderValue::from_static("/users/99"));
        ctx.json(StatusCode::CREATED, &User { id: "99".to_owned(), name: "new_user".to_owned() })
    })
}

// DELETE /users/{id} → 204 No Content
fn delete_user(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move { ctx.no_content() })
}

// GET /download → attachment
fn download(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let report = b"id,name\n42,alice\n";
        ctx.binary(StatusCode::OK, &report[..], "report.csv", false).await
    })
}

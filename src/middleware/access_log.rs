//! Access log middleware.
//!
//! Prints one line per request once the rest of the chain has returned:
//!
//! ```text
//! 2024/03/09 14:02:11 10.0.0.1 GET [200] /users/42?full=1 0.184ms
//! ```
//!
//! Method and status are colorized through a [`Palette`]. Health-check paths
//! are skipped by default.

use std::collections::HashSet;
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use http::StatusCode;
use tracing::{trace, warn};

use super::palette::{Color, Palette};
use super::{Middleware, Next};
use crate::capture::StatusCapturingWriter;
use crate::handler::{BoxFuture, Context, HandlerResult};
use crate::request::Request;

/// Paths that never produce a line unless [`AccessLog::skip_paths`] says
/// otherwise.
pub const DEFAULT_SKIP_PATHS: [&str; 2] = ["/health", "/status"];

// ── Sinks ─────────────────────────────────────────────────────────────────────

/// Destination for finished access log lines.
///
/// Any `Fn(&str)` closure is a sink, which is how tests collect lines.
pub trait LogSink: Send + Sync + 'static {
    fn emit(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

/// Writes each line straight to the process's standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl LogSink for Stdout {
    fn emit(&self, line: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            warn!("failed to write access log line: {e}");
        }
    }
}

// ── AccessLog ─────────────────────────────────────────────────────────────────

/// Request logging middleware. Register it first so its timing covers the
/// whole chain.
///
/// ```rust,no_run
/// use quill::{Router, health};
/// use quill::middleware::AccessLog;
///
/// let app = Router::new()
///     .middleware(AccessLog::new())
///     .get("/health", health::liveness);
/// ```
pub struct AccessLog {
    skip: HashSet<String>,
    palette: Palette,
    colors: bool,
    sink: Box<dyn LogSink>,
}

impl AccessLog {
    /// Logs to [`Stdout`], colorized when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            skip: DEFAULT_SKIP_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            palette: Palette::default(),
            colors: io::stdout().is_terminal(),
            sink: Box::new(Stdout),
        }
    }

    /// Replaces the set of paths that are never logged.
    pub fn skip_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Forces ANSI escapes on or off, e.g. for a sink that is not stdout.
    pub fn colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    pub fn sink(mut self, sink: impl LogSink) -> Self {
        self.sink = Box::new(sink);
        self
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.colors { color.paint(text) } else { text.to_owned() }
    }

    fn format_line(
        &self,
        started_at: DateTime<Local>,
        elapsed: Duration,
        request: &Request,
        status: Option<StatusCode>,
    ) -> String {
        let method = request.method();
        let method = self.paint(self.palette.method_color(method), method.as_str());

        // An unset status is not a status; never print it as one.
        let code = status.map_or_else(|| "-".to_owned(), |s| s.as_u16().to_string());
        let code = self.paint(self.palette.status_color(status), &code);

        let client_ip = request
            .client_ip()
            .map_or_else(|| "-".to_owned(), |ip| ip.to_string());

        format!(
            "{} {} {} [{}] {} {:.3}ms",
            started_at.format("%Y/%m/%d %H:%M:%S"),
            client_ip,
            method,
            code,
            request.request_uri(),
            elapsed.as_secs_f64() * 1000.0,
        )
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for AccessLog {
    fn call<'a>(&'a self, ctx: Context<'a>, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let started_at = Local::now();
            let clock = Instant::now();

            let (request, writer, renderer) = ctx.into_parts();
            let mut capture = StatusCapturingWriter::new(writer);
            let result = next.run(Context::new(request, &mut capture, renderer)).await;

            if self.skip.contains(request.path()) {
                trace!(path = request.path(), "access log skipped");
                return result;
            }

            let line = self.format_line(started_at, clock.elapsed(), request, capture.status());
            self.sink.emit(&line);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDateTime;
    use http::Method;

    use super::*;
    use crate::error::RenderError;
    use crate::handler::Handler;
    use crate::render::Renderer;
    use crate::writer::{BufferedResponse, ResponseWriter};

    type Lines = Arc<Mutex<Vec<String>>>;

    fn recording(log: AccessLog) -> (AccessLog, Lines) {
        let lines = Lines::default();
        let sink_lines = Arc::clone(&lines);
        let log = log.sink(move |line: &str| sink_lines.lock().unwrap().push(line.to_owned()));
        (log, lines)
    }

    fn not_found(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move { ctx.text(StatusCode::NOT_FOUND, "nope") })
    }

    fn ok(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move { ctx.json(StatusCode::OK, &serde_json::json!({ "a": 1 })) })
    }

    fn silent(_ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move { Ok(()) })
    }

    fn failing(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            ctx.writer().write_status(StatusCode::SERVICE_UNAVAILABLE);
            Err(RenderError::InvalidArgument("downstream failure"))
        })
    }

    fn panicking(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            ctx.writer().write_status(StatusCode::OK);
            explode()
        })
    }

    fn explode() -> HandlerResult {
        panic!("handler exploded")
    }

    async fn run(log: AccessLog, request: &Request, handler: &dyn Handler) -> (HandlerResult, BufferedResponse) {
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(log)];
        let renderer = Renderer::new();
        let mut writer = BufferedResponse::new();
        let result = Next::new(&chain, handler)
            .run(Context::new(request, &mut writer, &renderer))
            .await;
        (result, writer)
    }

    fn get(uri: &str) -> Request {
        Request::new(Method::GET, uri.parse().unwrap())
    }

    #[tokio::test]
    async fn logs_one_plain_line() {
        let (log, lines) = recording(AccessLog::new().colors(false));
        let request = get("/missing?x=1").with_header("x-forwarded-for", "10.1.2.3, 172.16.0.1");

        let (result, writer) = run(log, &request, &not_found).await;
        result.unwrap();
        assert_eq!(writer.body(), b"nope");

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);

        let line = &lines[0];
        assert!(NaiveDateTime::parse_from_str(&line[..19], "%Y/%m/%d %H:%M:%S").is_ok(), "{line}");
        assert!(line[19..].starts_with(" 10.1.2.3 GET [404] /missing?x=1 "), "{line}");

        let elapsed: f64 = line
            .rsplit(' ')
            .next()
            .and_then(|t| t.strip_suffix("ms"))
            .unwrap()
            .parse()
            .unwrap();
        assert!(elapsed >= 0.0);
    }

    #[tokio::test]
    async fn colorizes_method_and_status() {
        let (log, lines) = recording(AccessLog::new().colors(true));
        let (result, _) = run(log, &get("/users"), &ok).await;
        result.unwrap();

        let lines = lines.lock().unwrap();
        let line = &lines[0];
        assert!(line.contains(" \x1b[34mGET\x1b[0m [\x1b[32m200\x1b[0m] /users "), "{line:?}");
    }

    #[test]
    fn colors_follow_stdout_by_default() {
        assert_eq!(AccessLog::new().colors, io::stdout().is_terminal());
        assert!(AccessLog::new().colors(true).colors);
    }

    #[tokio::test]
    async fn default_skip_paths_are_silent() {
        for path in DEFAULT_SKIP_PATHS {
            let (log, lines) = recording(AccessLog::new());
            let (result, writer) = run(log, &get(path), &ok).await;
            result.unwrap();

            assert_eq!(writer.status(), Some(StatusCode::OK));
            assert!(lines.lock().unwrap().is_empty(), "{path} was logged");
        }
    }

    #[tokio::test]
    async fn custom_skip_paths_replace_defaults() {
        let (log, lines) = recording(AccessLog::new().colors(false).skip_paths(["/metrics"]));

        run(log, &get("/metrics"), &ok).await.0.unwrap();
        assert!(lines.lock().unwrap().is_empty());

        let (log, lines) = recording(AccessLog::new().colors(false).skip_paths(["/metrics"]));
        run(log, &get("/health"), &ok).await.0.unwrap();
        assert_eq!(lines.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_status_is_not_a_code() {
        let (log, lines) = recording(AccessLog::new().colors(false));
        run(log, &get("/quiet"), &silent).await.0.unwrap();

        let lines = lines.lock().unwrap();
        let line = &lines[0];
        assert!(line.contains(" GET [-] /quiet "), "{line}");
    }

    #[tokio::test]
    async fn downstream_error_is_logged_and_returned() {
        let (log, lines) = recording(AccessLog::new().colors(false));
        let request = Request::new(Method::DELETE, "/jobs/7".parse().unwrap());
        let (result, writer) = run(log, &request, &failing).await;

        assert!(matches!(result, Err(RenderError::InvalidArgument("downstream failure"))));
        assert_eq!(writer.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

        let lines = lines.lock().unwrap();
        let line = &lines[0];
        assert!(line.contains(" DELETE [503] /jobs/7 "), "{line}");
    }

    #[tokio::test]
    async fn downstream_panic_propagates_without_a_line() {
        let (log, lines) = recording(AccessLog::new().colors(false));

        let task = tokio::spawn(async move {
            let request = get("/boom");
            let _ = run(log, &request, &panicking).await;
        });

        let err = task.await.unwrap_err();
        assert!(err.is_panic());
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_client_ip_prints_dash() {
        let log = AccessLog::new().colors(false);
        let line = log.format_line(
            Local::now(),
            Duration::from_micros(1500),
            &get("/"),
            Some(StatusCode::MOVED_PERMANENTLY),
        );

        assert!(line.ends_with(" - GET [301] / 1.500ms"), "{line}");
    }
}

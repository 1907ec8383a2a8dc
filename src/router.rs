//! Radix-tree request router and middleware chain.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware is a flat list
//! run in registration order in front of whichever handler matched, including
//! the built-in 404 fallback, so unmatched requests are still logged.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Context, Handler, HandlerResult};
use crate::middleware::{Middleware, Next};
use crate::render::Renderer;
use crate::request::Request;
use crate::writer::ResponseWriter;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) renderer: Renderer,
    fallback: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middleware: Vec::new(),
            renderer: Renderer::new(),
            fallback: Arc::new(not_found),
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with an existing one.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Appends `middleware` to the chain. The first registered runs outermost.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Replaces the renderer handed to every handler through its [`Context`].
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Handler used when no route matches. Defaults to a plain-text 404.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Arc::new(handler);
        self
    }

    /// Runs `request` through the middleware chain and the matching handler,
    /// writing the response into `writer`.
    pub async fn dispatch(&self, mut request: Request, writer: &mut dyn ResponseWriter) -> HandlerResult {
        let handler = match self.lookup(&request.method, request.path()) {
            Some((handler, params)) => {
                request.params = params;
                handler
            }
            None => Arc::clone(&self.fallback),
        };

        Next::new(&self.middleware, handler.as_ref())
            .run(Context::new(&request, writer, &self.renderer))
            .await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn not_found(mut ctx: Context<'_>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move { ctx.text(StatusCode::NOT_FOUND, "404 page not found") })
}

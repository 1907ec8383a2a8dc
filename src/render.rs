//! Response rendering.
//!
//! A [`Renderer`] owns the content-type table and knows how to turn a value
//! into one complete response on a [`ResponseWriter`]: headers first, then the
//! status line, then the body in a single write.
//!
//! ```rust
//! use http::StatusCode;
//! use quill::{BufferedResponse, Renderer};
//!
//! let renderer = Renderer::with(|opts| opts.append_charset = true);
//!
//! let mut w = BufferedResponse::new();
//! renderer.json(&mut w, StatusCode::OK, &serde_json::json!({ "id": 42 })).unwrap();
//!
//! let res = w.into_response();
//! assert_eq!(res.headers()["content-type"], "application/json; charset=UTF-8");
//! ```

use http::StatusCode;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::RenderError;
use crate::writer::ResponseWriter;

// ── ContentKind ───────────────────────────────────────────────────────────────

/// The logical content types a [`Renderer`] produces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContentKind {
    Text,   // text/plain
    Html,   // text/html
    Json,   // application/json
    Jsonp,  // application/javascript
    Xml,    // application/xml
    Binary, // application/octet-stream
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        Self::Text,
        Self::Html,
        Self::Json,
        Self::Jsonp,
        Self::Xml,
        Self::Binary,
    ];

    /// The MIME type used unless overridden in [`RenderOptions`].
    pub fn default_mime(self) -> &'static str {
        match self {
            Self::Text   => "text/plain",
            Self::Html   => "text/html",
            Self::Json   => "application/json",
            Self::Jsonp  => "application/javascript",
            Self::Xml    => "application/xml",
            Self::Binary => "application/octet-stream",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ── RenderOptions ─────────────────────────────────────────────────────────────

/// Renderer configuration. Only adjustable inside the callback given to
/// [`Renderer::with`]; frozen afterwards.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub text: String,
    pub html: String,
    pub json: String,
    pub jsonp: String,
    pub xml: String,
    pub binary: String,

    /// Charset named in `; charset=` suffixes. Defaults to `UTF-8`.
    pub default_charset: String,
    /// Also suffix the JSON, JSONP and XML content types with the charset.
    /// Text and HTML always carry it; binary never does.
    pub append_charset: bool,

    /// Pretty-print JSON bodies. JSONP is always compact.
    pub indent_json: bool,
    /// Indent XML bodies by two spaces per level.
    pub indent_xml: bool,
    /// Root element name for XML bodies. Without it only structs and enums
    /// can be rendered, named after their type; with it a sequence renders
    /// as one root element per item.
    pub xml_root: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text: ContentKind::Text.default_mime().to_owned(),
            html: ContentKind::Html.default_mime().to_owned(),
            json: ContentKind::Json.default_mime().to_owned(),
            jsonp: ContentKind::Jsonp.default_mime().to_owned(),
            xml: ContentKind::Xml.default_mime().to_owned(),
            binary: ContentKind::Binary.default_mime().to_owned(),
            default_charset: "UTF-8".to_owned(),
            append_charset: false,
            indent_json: false,
            indent_xml: false,
            xml_root: None,
        }
    }
}

impl RenderOptions {
    pub fn mime(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Text   => &self.text,
            ContentKind::Html   => &self.html,
            ContentKind::Json   => &self.json,
            ContentKind::Jsonp  => &self.jsonp,
            ContentKind::Xml    => &self.xml,
            ContentKind::Binary => &self.binary,
        }
    }

    pub fn set_mime(&mut self, kind: ContentKind, mime: impl Into<String>) {
        let slot = match kind {
            ContentKind::Text   => &mut self.text,
            ContentKind::Html   => &mut self.html,
            ContentKind::Json   => &mut self.json,
            ContentKind::Jsonp  => &mut self.jsonp,
            ContentKind::Xml    => &mut self.xml,
            ContentKind::Binary => &mut self.binary,
        };
        *slot = mime.into();
    }

    /// Full `Content-Type` value for `kind`, charset included where it applies.
    pub fn content_type(&self, kind: ContentKind) -> String {
        let mime = self.mime(kind);
        let with_charset = match kind {
            ContentKind::Text | ContentKind::Html => true,
            ContentKind::Json | ContentKind::Jsonp | ContentKind::Xml => self.append_charset,
            ContentKind::Binary => false,
        };

        if with_charset && !mime.contains("charset=") {
            format!("{mime}; charset={}", self.default_charset)
        } else {
            mime.to_owned()
        }
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Writes complete responses for each supported content type.
///
/// Every method expects a writer nothing has been written to yet. Failures are
/// returned as-is and never retried: once the status line is out, a
/// serialization error can only leave a response with a missing body.
#[derive(Clone, Debug)]
pub struct Renderer {
    opts: RenderOptions,
    content_types: [HeaderValue; 6],
}

impl Renderer {
    pub fn new() -> Self {
        Self::from_options(RenderOptions::default())
    }

    /// Builds a renderer after letting `config` adjust the default options.
    ///
    /// # Panics
    ///
    /// Panics if a configured MIME type or charset produces a `Content-Type`
    /// that is not a valid header value.
    pub fn with(config: impl FnOnce(&mut RenderOptions)) -> Self {
        let mut opts = RenderOptions::default();
        config(&mut opts);
        Self::from_options(opts)
    }

    fn from_options(opts: RenderOptions) -> Self {
        let content_types = ContentKind::ALL.map(|kind| {
            HeaderValue::from_str(&opts.content_type(kind))
                .unwrap_or_else(|_| panic!("invalid content type configured for {kind:?}"))
        });
        Self { opts, content_types }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.opts
    }

    pub fn content_type(&self, kind: ContentKind) -> &HeaderValue {
        &self.content_types[kind.index()]
    }

    /// `204 No Content`, no headers, no body.
    pub fn no_content<W>(&self, w: &mut W) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
    {
        w.write_status(StatusCode::NO_CONTENT);
        Ok(())
    }

    /// Alias of [`Renderer::no_content`].
    pub fn empty<W>(&self, w: &mut W) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
    {
        self.no_content(w)
    }

    /// Plain text, always labelled with the default charset.
    pub fn text<W>(&self, w: &mut W, status: StatusCode, value: &str) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
    {
        self.send(w, ContentKind::Text, status, value.as_bytes())
    }

    /// Alias of [`Renderer::text`].
    pub fn string<W>(&self, w: &mut W, status: StatusCode, value: &str) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
    {
        self.text(w, status, value)
    }

    /// Pre-rendered HTML.
    pub fn html<W>(&self, w: &mut W, status: StatusCode, value: &str) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
    {
        self.send(w, ContentKind::Html, status, value.as_bytes())
    }

    pub fn json<W, T>(&self, w: &mut W, status: StatusCode, value: &T) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
        T: Serialize + ?Sized,
    {
        self.begin(w, ContentKind::Json, status);

        let body = if self.opts.indent_json {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        w.write(&body)?;
        Ok(())
    }

    /// `callback(<compact json>);` served as JavaScript.
    pub fn jsonp<W, T>(
        &self,
        w: &mut W,
        status: StatusCode,
        callback: &str,
        value: &T,
    ) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
        T: Serialize + ?Sized,
    {
        self.begin(w, ContentKind::Jsonp, status);

        let json = serde_json::to_vec(value)?;
        if callback.is_empty() {
            return Err(RenderError::InvalidArgument("jsonp callback must not be empty"));
        }

        let mut body = Vec::with_capacity(callback.len() + json.len() + 3);
        body.extend_from_slice(callback.as_bytes());
        body.push(b'(');
        body.extend_from_slice(&json);
        body.extend_from_slice(b");");
        w.write(&body)?;
        Ok(())
    }

    pub fn xml<W, T>(&self, w: &mut W, status: StatusCode, value: &T) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
        T: Serialize + ?Sized,
    {
        self.begin(w, ContentKind::Xml, status);

        let body = self.to_xml(value)?;
        w.write(body.as_bytes())?;
        Ok(())
    }

    /// Serves everything `source` yields as a download (`inline == false`) or
    /// for display in the browser (`inline == true`).
    ///
    /// The source is drained before anything touches the writer, so a read
    /// failure leaves the response untouched.
    pub async fn binary<W, R>(
        &self,
        w: &mut W,
        status: StatusCode,
        mut source: R,
        name: &str,
        inline: bool,
    ) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
        R: AsyncRead + Unpin,
    {
        let mut body = Vec::new();
        source.read_to_end(&mut body).await?;

        let disposition = if inline { "inline" } else { "attachment" };
        let disposition = HeaderValue::from_str(&format!("{disposition}; filename={name}"))
            .map_err(|_| RenderError::InvalidArgument("file name is not a valid header value"))?;

        let headers = w.headers_mut();
        headers.insert(CONTENT_TYPE, self.content_type(ContentKind::Binary).clone());
        headers.insert(CONTENT_DISPOSITION, disposition);
        w.write_status(status);
        w.write(&body)?;
        Ok(())
    }

    fn begin<W>(&self, w: &mut W, kind: ContentKind, status: StatusCode)
    where
        W: ResponseWriter + ?Sized,
    {
        w.headers_mut().insert(CONTENT_TYPE, self.content_type(kind).clone());
        w.write_status(status);
    }

    fn send<W>(&self, w: &mut W, kind: ContentKind, status: StatusCode, body: &[u8]) -> Result<(), RenderError>
    where
        W: ResponseWriter + ?Sized,
    {
        self.begin(w, kind, status);
        w.write(body)?;
        Ok(())
    }

    fn to_xml<T>(&self, value: &T) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let mut out = String::new();
        let mut ser = quick_xml::se::Serializer::with_root(&mut out, self.opts.xml_root.as_deref())
            .map_err(|e| RenderError::Xml(Box::new(e)))?;
        if self.opts.indent_xml {
            ser.indent(' ', 2);
        }
        value
            .serialize(ser)
            .map_err(|e| RenderError::Xml(Box::new(e)))?;
        Ok(out)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use serde::Serializer;
    use serde_json::json;
    use tokio::io::ReadBuf;

    use super::*;
    use crate::writer::BufferedResponse;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    struct Unreadable;

    impl AsyncRead for Unreadable {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::PermissionDenied, "no access")))
        }
    }

    #[derive(Serialize)]
    struct Ping {
        ok: bool,
        seq: u32,
    }

    fn content_type(w: BufferedResponse) -> String {
        w.into_response().headers()[CONTENT_TYPE].to_str().unwrap().to_owned()
    }

    #[test]
    fn no_content_has_no_body() {
        let mut w = BufferedResponse::new();
        Renderer::new().empty(&mut w).unwrap();

        assert_eq!(w.status(), Some(StatusCode::NO_CONTENT));
        assert!(w.body().is_empty());
        assert!(w.into_response().headers().is_empty());
    }

    #[test]
    fn text_is_utf8_plain() {
        let mut w = BufferedResponse::new();
        Renderer::new().text(&mut w, StatusCode::IM_A_TEAPOT, "short and stout").unwrap();

        assert_eq!(w.status(), Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(w.body(), b"short and stout");
        assert_eq!(content_type(w), "text/plain; charset=UTF-8");
    }

    #[test]
    fn html_uses_configured_charset() {
        let renderer = Renderer::with(|opts| opts.default_charset = "ISO-8859-1".to_owned());
        let mut w = BufferedResponse::new();
        renderer.html(&mut w, StatusCode::OK, "<p>hi</p>").unwrap();

        assert_eq!(content_type(w), "text/html; charset=ISO-8859-1");
    }

    #[test]
    fn json_is_canonical() {
        let mut w = BufferedResponse::new();
        Renderer::new().json(&mut w, StatusCode::OK, &json!({ "a": 1 })).unwrap();

        assert_eq!(w.status(), Some(StatusCode::OK));
        assert_eq!(w.body(), br#"{"a":1}"#);
        assert_eq!(content_type(w), "application/json");
    }

    #[test]
    fn json_indent_option() {
        let renderer = Renderer::with(|opts| opts.indent_json = true);
        let mut w = BufferedResponse::new();
        renderer.json(&mut w, StatusCode::OK, &json!({ "a": 1 })).unwrap();

        assert_eq!(w.body(), b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn json_failure_after_status() {
        let mut w = BufferedResponse::new();
        let err = Renderer::new().json(&mut w, StatusCode::OK, &Unserializable).unwrap_err();

        assert!(matches!(err, RenderError::Json(_)));
        assert_eq!(w.status(), Some(StatusCode::OK));
        assert!(w.body().is_empty());
    }

    #[test]
    fn jsonp_wraps_compact_json() {
        let renderer = Renderer::with(|opts| opts.indent_json = true);
        let mut w = BufferedResponse::new();
        renderer.jsonp(&mut w, StatusCode::OK, "cb", &json!({ "a": 1 })).unwrap();

        assert_eq!(w.body(), br#"cb({"a":1});"#);
        assert_eq!(content_type(w), "application/javascript");
    }

    #[test]
    fn jsonp_requires_callback() {
        let mut w = BufferedResponse::new();
        let err = Renderer::new().jsonp(&mut w, StatusCode::OK, "", &json!({ "a": 1 })).unwrap_err();

        assert!(matches!(err, RenderError::InvalidArgument(_)));
        assert!(w.body().is_empty());
    }

    #[test]
    fn xml_serializes_struct() {
        let mut w = BufferedResponse::new();
        Renderer::new().xml(&mut w, StatusCode::CREATED, &Ping { ok: true, seq: 7 }).unwrap();

        assert_eq!(w.status(), Some(StatusCode::CREATED));
        assert_eq!(w.body(), b"<Ping><ok>true</ok><seq>7</seq></Ping>");
        assert_eq!(content_type(w), "application/xml");
    }

    #[test]
    fn xml_sequence_needs_a_root() {
        let items = vec![Ping { ok: true, seq: 1 }, Ping { ok: false, seq: 2 }];

        let mut w = BufferedResponse::new();
        let err = Renderer::new().xml(&mut w, StatusCode::OK, &items).unwrap_err();
        assert!(matches!(err, RenderError::Xml(_)));

        let renderer = Renderer::with(|opts| opts.xml_root = Some("Ping".to_owned()));
        let mut w = BufferedResponse::new();
        renderer.xml(&mut w, StatusCode::OK, &items).unwrap();

        assert_eq!(
            w.body(),
            b"<Ping><ok>true</ok><seq>1</seq></Ping><Ping><ok>false</ok><seq>2</seq></Ping>",
        );
    }

    #[test]
    fn xml_root_renames_struct() {
        let renderer = Renderer::with(|opts| opts.xml_root = Some("pong".to_owned()));
        let mut w = BufferedResponse::new();
        renderer.xml(&mut w, StatusCode::OK, &Ping { ok: true, seq: 7 }).unwrap();

        assert_eq!(w.body(), b"<pong><ok>true</ok><seq>7</seq></pong>");
    }

    #[test]
    fn xml_failure_is_reported() {
        let mut w = BufferedResponse::new();
        let err = Renderer::new().xml(&mut w, StatusCode::OK, &Unserializable).unwrap_err();

        assert!(matches!(err, RenderError::Xml(_)));
        assert!(w.body().is_empty());
    }

    #[test]
    fn append_charset_covers_structured_types() {
        let renderer = Renderer::with(|opts| opts.append_charset = true);

        assert_eq!(renderer.content_type(ContentKind::Json), "application/json; charset=UTF-8");
        assert_eq!(renderer.content_type(ContentKind::Jsonp), "application/javascript; charset=UTF-8");
        assert_eq!(renderer.content_type(ContentKind::Xml), "application/xml; charset=UTF-8");
        assert_eq!(renderer.content_type(ContentKind::Binary), "application/octet-stream");
    }

    #[test]
    fn mime_overrides_apply() {
        let renderer = Renderer::with(|opts| {
            opts.set_mime(ContentKind::Json, "application/vnd.api+json");
            opts.set_mime(ContentKind::Text, "text/plain; charset=us-ascii");
        });

        assert_eq!(renderer.options().mime(ContentKind::Json), "application/vnd.api+json");
        assert_eq!(renderer.content_type(ContentKind::Json), "application/vnd.api+json");
        assert_eq!(renderer.content_type(ContentKind::Text), "text/plain; charset=us-ascii");
    }

    #[test]
    #[should_panic(expected = "invalid content type")]
    fn invalid_mime_panics_at_construction() {
        Renderer::with(|opts| opts.xml = "application/xml\n".to_owned());
    }

    #[tokio::test]
    async fn binary_attachment() {
        let mut w = BufferedResponse::new();
        Renderer::new()
            .binary(&mut w, StatusCode::OK, &b"\x00\x01\x02"[..], "blob.bin", false)
            .await
            .unwrap();

        let res = w.into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(res.headers()[CONTENT_DISPOSITION], "attachment; filename=blob.bin");
    }

    #[tokio::test]
    async fn binary_inline() {
        let mut w = BufferedResponse::new();
        Renderer::new()
            .binary(&mut w, StatusCode::OK, &b"# readme"[..], "readme.md", true)
            .await
            .unwrap();

        assert_eq!(w.body(), b"# readme");
        let res = w.into_response();
        assert_eq!(res.headers()[CONTENT_DISPOSITION], "inline; filename=readme.md");
    }

    #[tokio::test]
    async fn binary_read_failure_writes_nothing() {
        let mut w = BufferedResponse::new();
        let err = Renderer::new()
            .binary(&mut w, StatusCode::OK, Unreadable, "secret.bin", false)
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Io(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
        assert_eq!(w.status(), None);
        assert!(w.headers().is_empty());
    }

    #[tokio::test]
    async fn binary_rejects_header_breaking_name() {
        let mut w = BufferedResponse::new();
        let err = Renderer::new()
            .binary(&mut w, StatusCode::OK, &b"x"[..], "a\r\nb", false)
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::InvalidArgument(_)));
        assert_eq!(w.status(), None);
    }
}

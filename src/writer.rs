//! The response writer seam.
//!
//! Handlers never build a response value. They are handed a
//! [`ResponseWriter`] and push headers, a status line and body bytes into it,
//! in that order. Decorators such as
//! [`StatusCapturingWriter`](crate::StatusCapturingWriter) implement the same
//! trait and forward to the writer they wrap.
//!
//! [`BufferedResponse`] is the writer the server hands to every request. It
//! follows the usual header-then-body discipline of an HTTP/1.1 stream:
//!
//! ```text
//! headers_mut()  ──▶ mutable until the status is written
//! write_status() ──▶ freezes headers, first call wins
//! write()        ──▶ implies 200 if no status yet, appends body bytes
//! ```

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

/// A per-request sink for one HTTP response.
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the status line.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the pending headers. Changes made after
    /// [`write_status`](ResponseWriter::write_status) do not reach the wire.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Writes the status line.
    fn write_status(&mut self, status: StatusCode);

    /// Writes body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// In-memory [`ResponseWriter`] converted into a hyper response once the
/// handler chain has returned.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    headers: HeaderMap,
    // Snapshot of `headers` taken at the moment the status was written.
    sent: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The written status, or `None` if nothing has been written yet.
    pub fn status(&self) -> Option<StatusCode> {
        self.sent.as_ref().map(|(status, _)| *status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finalizes into the response hyper sends. A writer that was never
    /// written to becomes an empty `200 OK`.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let (status, headers) = self
            .sent
            .unwrap_or_else(|| (StatusCode::OK, self.headers));

        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if let Some((first, _)) = &self.sent {
            warn!(%first, ignored = %status, "superfluous write_status call");
            return;
        }
        self.sent = Some((status, self.headers.clone()));
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.sent.is_none() {
            self.write_status(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

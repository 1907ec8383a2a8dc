//! Status-capturing writer decorator.

use std::io;

use http::{HeaderMap, StatusCode};

use crate::writer::ResponseWriter;

/// What a [`StatusCapturingWriter`] has observed so far.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CapturedResponseState {
    /// `None` until a status is written or implied by the first body write.
    pub status: Option<StatusCode>,
    /// Sum of the lengths the inner writer reported as written.
    pub bytes_written: u64,
}

/// Wraps another [`ResponseWriter`] and records the status code and body
/// length that pass through it. Every call is forwarded unchanged.
pub struct StatusCapturingWriter<'w> {
    inner: &'w mut dyn ResponseWriter,
    state: CapturedResponseState,
}

impl<'w> StatusCapturingWriter<'w> {
    pub fn new(inner: &'w mut dyn ResponseWriter) -> Self {
        Self { inner, state: CapturedResponseState::default() }
    }

    /// The observed status. `None` means nothing was written yet, which is
    /// not the same thing as any real status code.
    pub fn status(&self) -> Option<StatusCode> {
        self.state.status
    }

    pub fn bytes_written(&self) -> u64 {
        self.state.bytes_written
    }

    pub fn state(&self) -> CapturedResponseState {
        self.state
    }
}

impl ResponseWriter for StatusCapturingWriter<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        // The first status is the one that reaches the wire; keep that one.
        self.state.status.get_or_insert(status);
        self.inner.write_status(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.status.get_or_insert(StatusCode::OK);
        let n = self.inner.write(buf)?;
        self.state.bytes_written += n as u64;
        Ok(n)
    }
}

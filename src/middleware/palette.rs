//! Terminal colors for access log lines.

use std::collections::HashMap;

use http::{Method, StatusCode};

/// ANSI foreground colors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Self::Default => "\x1b[39m",
            Self::Red     => "\x1b[31m",
            Self::Green   => "\x1b[32m",
            Self::Yellow  => "\x1b[33m",
            Self::Blue    => "\x1b[34m",
            Self::Magenta => "\x1b[35m",
            Self::Cyan    => "\x1b[36m",
            Self::White   => "\x1b[37m",
        }
    }

    /// Wraps `text` in this color and a reset sequence.
    pub fn paint(self, text: &str) -> String {
        format!("{}{text}\x1b[0m", self.code())
    }
}

/// Status code ranges that share a color.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusBucket {
    Success,     // 2xx
    Redirect,    // 3xx
    ClientError, // 4xx
    /// 5xx, 1xx and unknown statuses.
    Other,
}

impl StatusBucket {
    pub fn of(status: Option<StatusCode>) -> Self {
        match status.map(|s| s.as_u16()) {
            Some(200..=299) => Self::Success,
            Some(300..=399) => Self::Redirect,
            Some(400..=499) => Self::ClientError,
            _ => Self::Other,
        }
    }
}

/// Method and status colors used by [`AccessLog`](super::AccessLog).
#[derive(Clone, Debug)]
pub struct Palette {
    methods: HashMap<Method, Color>,
    fallback: Color,
    success: Color,
    redirect: Color,
    client_error: Color,
    other: Color,
}

impl Default for Palette {
    fn default() -> Self {
        let methods = HashMap::from([
            (Method::GET,     Color::Blue),
            (Method::POST,    Color::Cyan),
            (Method::PUT,     Color::Yellow),
            (Method::DELETE,  Color::Red),
            (Method::PATCH,   Color::Green),
            (Method::HEAD,    Color::Magenta),
            (Method::OPTIONS, Color::White),
        ]);
        Self {
            methods,
            fallback: Color::Default,
            success: Color::Green,
            redirect: Color::Cyan,
            client_error: Color::Yellow,
            other: Color::Red,
        }
    }
}

impl Palette {
    pub fn method(mut self, method: Method, color: Color) -> Self {
        self.methods.insert(method, color);
        self
    }

    /// Color for methods without an entry of their own.
    pub fn fallback(mut self, color: Color) -> Self {
        self.fallback = color;
        self
    }

    pub fn bucket(mut self, bucket: StatusBucket, color: Color) -> Self {
        match bucket {
            StatusBucket::Success     => self.success = color,
            StatusBucket::Redirect    => self.redirect = color,
            StatusBucket::ClientError => self.client_error = color,
            StatusBucket::Other       => self.other = color,
        }
        self
    }

    pub fn method_color(&self, method: &Method) -> Color {
        self.methods.get(method).copied().unwrap_or(self.fallback)
    }

    pub fn status_color(&self, status: Option<StatusCode>) -> Color {
        match StatusBucket::of(status) {
            StatusBucket::Success     => self.success,
            StatusBucket::Redirect    => self.redirect,
            StatusBucket::ClientError => self.client_error,
            StatusBucket::Other       => self.other,
        }
    }
}

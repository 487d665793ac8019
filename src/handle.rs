//! Trackable stream handles

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

use crate::tracking::TrackedHandle;

/// Discriminant of a [`Handle`]. On the wire this is a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum HandleKind {
    #[default]
    Unset,
    StreamUrl,
    Unknown(u32),
}

impl HandleKind {
    pub fn name(&self) -> &'static str {
        match self {
            HandleKind::StreamUrl => "StreamURL",
            HandleKind::Unset | HandleKind::Unknown(_) => "",
        }
    }
}

impl From<u32> for HandleKind {
    fn from(value: u32) -> Self {
        match value {
            0 => HandleKind::Unset,
            1 => HandleKind::StreamUrl,
            n => HandleKind::Unknown(n),
        }
    }
}

impl From<HandleKind> for u32 {
    fn from(kind: HandleKind) -> Self {
        match kind {
            HandleKind::Unset => 0,
            HandleKind::StreamUrl => 1,
            HandleKind::Unknown(n) => n,
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies one stream for the tracking engine
///
/// Equality is exact on both fields; URLs are not normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub kind: HandleKind,
    pub value: String,
}

impl Handle {
    /// Builds a stream URL handle. The URL is not validated here.
    pub fn stream_url(url: impl Into<String>) -> Self {
        Self {
            kind: HandleKind::StreamUrl,
            value: url.into(),
        }
    }

    pub fn valid(&self) -> bool {
        self.kind != HandleKind::Unset && !self.value.is_empty()
    }

    /// Engine-side deduplication: handles of any other variant never match.
    pub fn equal(&self, other: &TrackedHandle) -> bool {
        match other {
            TrackedHandle::Hls(other) => other.kind == self.kind && other.value == self.value,
            TrackedHandle::Foreign { .. } => false,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}:", self.kind)?;
        write_quoted(f, &self.value)?;
        f.write_char('}')
    }
}

/// Double-quoted form with C-style escapes, `\xNN` for ASCII control bytes
/// and `\uNNNN` for C1 controls
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{7}' => f.write_str("\\a")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{b}' => f.write_str("\\v")?,
            c if c.is_ascii_control() => write!(f, "\\x{:02x}", c as u32)?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

//! Coarse HLS manifest classification from top-level tags

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

const TAG_START: &str = "#EXTM3U";
const TAG_VERSION: &str = "#EXT-X-VERSION:";
const TAG_INDEPENDENT_SEGMENTS: &str = "#EXT-X-INDEPENDENT-SEGMENTS";
const TAG_MEDIA: &str = "#EXT-X-MEDIA:";
const TAG_STREAM_INF: &str = "#EXT-X-STREAM-INF:";
const TAG_I_FRAME_STREAM_INF: &str = "#EXT-X-I-FRAME-STREAM-INF:";

/// Tags seen while scanning a manifest. Flags only ever go from false to true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ManifestFlags {
    pub has_start_tag: bool,
    pub has_version_tag: bool,
    pub has_independent_segments: bool,
    pub has_stream_inf: bool,
    pub has_i_frame_stream_inf: bool,
    pub has_media: bool,
    /// Reserved for a tag that signals a broken stream; no tag sets it yet.
    pub has_error: bool,
}

impl ManifestFlags {
    pub fn scan(text: &str) -> Self {
        let mut flags = Self::default();
        for line in text.split('\n') {
            flags.scan_line(line);
        }
        flags
    }

    /// Unknown and malformed lines are ignored
    pub fn scan_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if line == TAG_START {
            self.has_start_tag = true;
        } else if line.starts_with(TAG_VERSION) {
            self.has_version_tag = true;
        } else if line == TAG_INDEPENDENT_SEGMENTS {
            self.has_independent_segments = true;
        } else if line.starts_with(TAG_MEDIA) {
            self.has_media = true;
        } else if line.starts_with(TAG_STREAM_INF) {
            self.has_stream_inf = true;
        } else if line.starts_with(TAG_I_FRAME_STREAM_INF) {
            self.has_i_frame_stream_inf = true;
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            has_start_tag: self.has_start_tag || other.has_start_tag,
            has_version_tag: self.has_version_tag || other.has_version_tag,
            has_independent_segments: self.has_independent_segments
                || other.has_independent_segments,
            has_stream_inf: self.has_stream_inf || other.has_stream_inf,
            has_i_frame_stream_inf: self.has_i_frame_stream_inf || other.has_i_frame_stream_inf,
            has_media: self.has_media || other.has_media,
            has_error: self.has_error || other.has_error,
        }
    }

    /// A live stream is a manifest that advertises at least one rendition
    pub fn is_live(&self) -> bool {
        self.has_start_tag
            && !self.has_error
            && (self.has_media || self.has_stream_inf || self.has_i_frame_stream_inf)
    }
}

/// Reads the whole stream, then scans it line by line
///
/// Only read failures are errors; an empty stream classifies as not live.
pub async fn classify<R>(reader: &mut R) -> io::Result<ManifestFlags>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;

    Ok(ManifestFlags::scan(&String::from_utf8_lossy(&buf)))
}

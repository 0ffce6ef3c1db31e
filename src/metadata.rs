//! Image metadata types.
//!
//! This module defines [`ImageMetadata`], the immutable header-level snapshot
//! read from a freshly constructed decoder handle. Extracting metadata does
//! not decode any pixel data: a syntactically valid bitstream header is
//! enough, even when the frame payloads are corrupt. The snapshot is
//! identical regardless of whether the handle was built from a file, a byte
//! range, or a pinned buffer.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::engine::FrameDecoder;

/// Order in which color channels appear in decoded pixel data.
///
/// Reported verbatim from the codec engine; this crate never normalizes
/// channel order. Callers (or engine-side format converters) decide whether
/// to reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red.
    Bgr,
}

/// A 16-byte pixel format GUID, as used by the codec engine to identify the
/// exact channel layout, bit depth, and color model of decoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormatId(pub [u8; 16]);

impl Display for PixelFormatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Header-level metadata for the currently selected frame of an image.
///
/// Derived once per constructed codec handle and cached; dimensions describe
/// the selected frame, which for a fresh handle is frame 0. Multi-frame
/// containers may legitimately carry frames of differing dimensions — use
/// [`JxrImage::frame_metadata`](crate::JxrImage::frame_metadata) for a
/// per-frame snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ImageMetadata {
    /// Frame width in pixels.
    pub width: u64,
    /// Frame height in pixels.
    pub height: u64,
    /// Bytes per pixel: channel count multiplied by bytes per channel.
    pub bytes_per_pixel: u64,
    /// Pixel format GUID reported by the codec engine.
    pub pixel_format: PixelFormatId,
    /// Channel order of decoded data, reported verbatim.
    pub channel_order: ChannelOrder,
    /// Number of selectable frames in the container.
    pub frame_count: u64,
}

impl ImageMetadata {
    /// Decoded size of the frame in bytes: `width * height * bytes_per_pixel`.
    ///
    /// Saturates at `usize::MAX` when an engine reports dimensions whose
    /// product overflows; allocation then fails instead of wrapping into an
    /// undersized buffer.
    pub fn frame_size(&self) -> usize {
        self.width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(self.bytes_per_pixel))
            .and_then(|bytes| usize::try_from(bytes).ok())
            .unwrap_or(usize::MAX)
    }

    /// Whether decoded channels arrive in BGR order.
    pub fn is_bgr(&self) -> bool {
        self.channel_order == ChannelOrder::Bgr
    }
}

/// Snapshot the header-level fields of a constructed decoder.
///
/// Reads dimensions, pixel format, channel order, and frame count without
/// touching pixel data.
pub(crate) fn snapshot(decoder: &dyn FrameDecoder) -> ImageMetadata {
    ImageMetadata {
        width: decoder.width(),
        height: decoder.height(),
        bytes_per_pixel: decoder.bytes_per_pixel(),
        pixel_format: decoder.pixel_format(),
        channel_order: decoder.channel_order(),
        frame_count: decoder.frame_count(),
    }
}

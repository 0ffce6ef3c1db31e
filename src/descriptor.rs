//! Source and destination descriptors.
//!
//! The original operation surface of this layer is a matrix: compressed data
//! can arrive as a file path, a borrowed byte range, or a region of a pinned
//! buffer, and decoded pixels can leave as a fresh vector, a write into a
//! pinned buffer at an offset, or a re-encoded file. Rather than one entry
//! point per combination, the matrix is closed over two small tagged unions
//! and a single orchestration path; the named convenience functions in
//! [`crate::decode`] are thin wrappers.

use std::path::Path;

use crate::{
    buffer::{self, BufferRole, FrameBuffer},
    error::JxrError,
};

/// Where compressed image data comes from.
///
/// All three variants are interchangeable at every operation accepting a
/// source: the resulting handle and metadata are identical.
#[derive(Debug)]
pub enum ImageSource<'a> {
    /// Read from a file on disk.
    File(&'a Path),
    /// A region of a borrowed byte slice. The engine may copy the region;
    /// the slice only needs to outlive handle construction.
    Bytes {
        /// Backing slice.
        data: &'a [u8],
        /// Starting offset of the compressed data within `data`.
        offset: usize,
        /// Number of compressed bytes starting at `offset`.
        length: usize,
    },
    /// A region of a pinned buffer, handed to the engine without a
    /// caller-side copy. The buffer must be pinned.
    Buffer {
        /// Backing buffer; must be [`BufferKind::Pinned`](crate::BufferKind::Pinned).
        buffer: &'a FrameBuffer,
        /// Starting offset of the compressed data within the buffer.
        offset: usize,
        /// Number of compressed bytes starting at `offset`.
        length: usize,
    },
}

impl<'a> ImageSource<'a> {
    /// Source covering an entire byte slice.
    pub fn bytes(data: &'a [u8]) -> Self {
        ImageSource::Bytes {
            data,
            offset: 0,
            length: data.len(),
        }
    }

    /// Source covering an entire pinned buffer.
    pub fn buffer(buffer: &'a FrameBuffer) -> Self {
        ImageSource::Buffer {
            buffer,
            offset: 0,
            length: buffer.len(),
        }
    }

    /// Validate the descriptor and yield the compressed bytes to hand to the
    /// engine. Fails before any engine construction when the region is out
    /// of bounds or the buffer is not pinned.
    pub(crate) fn validated_bytes(&self) -> Result<Option<&'a [u8]>, JxrError> {
        match self {
            ImageSource::File(_) => Ok(None),
            ImageSource::Bytes {
                data,
                offset,
                length,
            } => {
                buffer::check_region(data.len(), *offset, *length)?;
                Ok(Some(&data[*offset..*offset + *length]))
            }
            ImageSource::Buffer {
                buffer: frame_buffer,
                offset,
                length,
            } => {
                buffer::ensure_pinned(frame_buffer, BufferRole::Source)?;
                buffer::check_region(frame_buffer.len(), *offset, *length)?;
                Ok(Some(&frame_buffer.as_slice()[*offset..*offset + *length]))
            }
        }
    }
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        ImageSource::File(path)
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        ImageSource::bytes(data)
    }
}

impl<'a> From<&'a FrameBuffer> for ImageSource<'a> {
    fn from(buffer: &'a FrameBuffer) -> Self {
        ImageSource::buffer(buffer)
    }
}

/// Where decoded pixel data goes.
#[derive(Debug)]
pub enum ImageDestination<'a> {
    /// Allocate a fresh vector sized exactly to the frame and return it.
    Owned,
    /// Write into a caller-supplied pinned buffer starting at `offset`.
    /// The buffer must be pinned and hold at least `offset + frame size`
    /// bytes, checked before the engine writes.
    Buffer {
        /// Receiving buffer.
        buffer: &'a mut FrameBuffer,
        /// Byte offset at which the frame is written.
        offset: usize,
    },
    /// Re-encode the frame into the container format selected by this
    /// path's extension.
    File(&'a Path),
}

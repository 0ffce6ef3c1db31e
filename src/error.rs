//! Error types for the `jxrdecode` crate.
//!
//! This module defines [`JxrError`], the unified error type returned by all
//! fallible operations in the crate. Variants carry enough context (paths,
//! frame indices, buffer extents) to diagnose a failure without additional
//! logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

use crate::buffer::BufferRole;

/// The unified error type for all `jxrdecode` operations.
///
/// Every public method that can fail returns `Result<T, JxrError>`. None of
/// these errors are retried inside the crate: buffer-contract violations and
/// out-of-range indices are caller programming errors, and format errors
/// originate in the codec engine and cannot succeed on retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JxrError {
    /// The input file could not be opened by the codec engine.
    #[error("Failed to open image file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::JxrImage::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A buffer crossing the engine boundary is not pinned.
    ///
    /// The codec engine references buffers by raw address; a relocatable
    /// buffer would be corrupted if its backing storage moved mid-call.
    /// The check runs before any engine access, so a failing call performs
    /// no write.
    #[error("{role} buffer must be pinned to cross the codec engine boundary")]
    InvalidBufferKind {
        /// Whether the offending buffer was a source or a destination.
        role: BufferRole,
    },

    /// The requested frame index exceeds the handle's frame count.
    #[error("Frame {frame_index} is out of range (image has {frame_count} frames)")]
    FrameIndexOutOfRange {
        /// The frame index that was requested.
        frame_index: u64,
        /// The total number of frames in the image.
        frame_count: u64,
    },

    /// The bitstream is malformed or the requested operation is unsupported
    /// by the codec engine. Surfaced verbatim from the engine.
    #[error("Format error: {0}")]
    FormatError(String),

    /// The destination buffer cannot hold the decoded frame at the given
    /// offset. Checked proactively, before the engine writes anything.
    #[error(
        "Destination too small: need {required} bytes at offset {offset}, \
         but buffer capacity is {capacity}"
    )]
    DestinationTooSmall {
        /// Offset at which the frame would have been written.
        offset: usize,
        /// Decoded frame size in bytes.
        required: usize,
        /// Total capacity of the destination buffer.
        capacity: usize,
    },

    /// A source byte range extends past the end of its backing buffer.
    /// Checked before any engine construction.
    #[error(
        "Source region out of bounds: offset {offset} + length {length} \
         exceeds buffer capacity {capacity}"
    )]
    SourceOutOfBounds {
        /// Starting offset of the requested region.
        offset: usize,
        /// Length of the requested region.
        length: usize,
        /// Total capacity of the backing buffer.
        capacity: usize,
    },

    /// No encoder or format converter is registered for the requested output
    /// extension.
    #[error("Unsupported output extension: {0:?}")]
    UnsupportedExtension(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl From<ImageError> for JxrError {
    fn from(error: ImageError) -> Self {
        JxrError::FormatError(error.to_string())
    }
}

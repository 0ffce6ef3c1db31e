//! Pinned buffer management and the buffer-boundary validator.
//!
//! The codec engine operates on raw memory addresses, so every buffer it
//! reads from or writes into must be backed by storage that will not move for
//! the duration of the call. [`FrameBuffer`] makes that property explicit:
//! a buffer is allocated either [`BufferKind::Pinned`] (address-stable, may
//! cross the engine boundary) or [`BufferKind::Relocatable`] (models memory
//! owned by an embedding host runtime that may relocate it — the engine must
//! never see it).
//!
//! Validation is pure and runs before any engine access: a call that fails a
//! buffer check performs no native read or write.
//!
//! # Example
//!
//! ```
//! use jxrdecode::FrameBuffer;
//!
//! let mut destination = FrameBuffer::pinned(64 * 64 * 3);
//! assert!(destination.is_pinned());
//! assert_eq!(destination.len(), 12288);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::JxrError;

/// How a [`FrameBuffer`]'s backing storage behaves with respect to the codec
/// engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Backing storage has a stable address for the buffer's entire lifetime
    /// and may be referenced by the codec engine.
    Pinned,
    /// Backing storage is owned by a host runtime that may move or reclaim
    /// it; it must never be handed to the codec engine by address.
    Relocatable,
}

/// Which side of an operation a buffer was used on. Carried by
/// [`JxrError::InvalidBufferKind`] for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferRole {
    /// The buffer holds compressed input read by the decoder.
    Source,
    /// The buffer receives decoded pixel data.
    Destination,
}

impl Display for BufferRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BufferRole::Source => write!(f, "Source"),
            BufferRole::Destination => write!(f, "Destination"),
        }
    }
}

/// A heap-allocated byte buffer tagged with its [`BufferKind`].
///
/// The allocation is a fixed-size boxed slice: it never grows, so a pinned
/// buffer's address is stable from construction to drop. Relocatable buffers
/// use the same representation but declare that the bytes belong to an
/// external host and may be moved between operations — the validator rejects
/// them at the engine boundary.
#[derive(Debug)]
pub struct FrameBuffer {
    kind: BufferKind,
    data: Box<[u8]>,
}

impl FrameBuffer {
    /// Allocate a zero-filled pinned buffer of `len` bytes.
    pub fn pinned(len: usize) -> Self {
        Self {
            kind: BufferKind::Pinned,
            data: vec![0u8; len].into_boxed_slice(),
        }
    }

    /// Take ownership of `data` as a pinned buffer.
    ///
    /// The vector's storage is frozen into a boxed slice, after which its
    /// address is stable.
    pub fn pinned_from_vec(data: Vec<u8>) -> Self {
        Self {
            kind: BufferKind::Pinned,
            data: data.into_boxed_slice(),
        }
    }

    /// Allocate a zero-filled relocatable buffer of `len` bytes.
    ///
    /// Relocatable buffers cannot cross the engine boundary; they exist to
    /// represent host-managed memory in embedding scenarios and in tests of
    /// the boundary contract.
    pub fn relocatable(len: usize) -> Self {
        Self {
            kind: BufferKind::Relocatable,
            data: vec![0u8; len].into_boxed_slice(),
        }
    }

    /// Take ownership of `data` as a relocatable buffer.
    pub fn relocatable_from_vec(data: Vec<u8>) -> Self {
        Self {
            kind: BufferKind::Relocatable,
            data: data.into_boxed_slice(),
        }
    }

    /// The buffer's kind.
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Whether the buffer may cross the codec engine boundary.
    pub fn is_pinned(&self) -> bool {
        self.kind == BufferKind::Pinned
    }

    /// Total capacity in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read access to the full contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Write access to the full contents.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_vec()
    }
}

/// Reject buffers that are not pinned.
///
/// Must be invoked for every buffer that the codec engine will reference,
/// on both the source and the destination side.
pub(crate) fn ensure_pinned(buffer: &FrameBuffer, role: BufferRole) -> Result<(), JxrError> {
    if buffer.is_pinned() {
        Ok(())
    } else {
        Err(JxrError::InvalidBufferKind { role })
    }
}

/// Check that `[offset, offset + length)` lies within a buffer of
/// `capacity` bytes. Overflow-safe.
pub(crate) fn check_region(
    capacity: usize,
    offset: usize,
    length: usize,
) -> Result<(), JxrError> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(JxrError::SourceOutOfBounds {
            offset,
            length,
            capacity,
        }),
    }
}

/// Validate a destination buffer for a decode of `required` bytes at
/// `offset`: the buffer must be pinned and large enough. Runs before the
/// engine writes anything.
pub(crate) fn check_destination(
    buffer: &FrameBuffer,
    offset: usize,
    required: usize,
) -> Result<(), JxrError> {
    ensure_pinned(buffer, BufferRole::Destination)?;
    match offset.checked_add(required) {
        Some(end) if end <= buffer.len() => Ok(()),
        _ => Err(JxrError::DestinationTooSmall {
            offset,
            required,
            capacity: buffer.len(),
        }),
    }
}

//! Core [`JxrImage`] implementation: the frame decode orchestrator.
//!
//! `JxrImage` is the main entry point of the crate. Opening a source
//! validates any buffer-typed input, constructs a codec handle through the
//! process-wide engine, and caches a metadata snapshot. Frame decodes are
//! driven through one orchestration path over the
//! {source} × {destination} union; the named methods and the free functions
//! at the bottom of this module are thin wrappers over it.
//!
//! A `JxrImage` is exclusively owned by the call sequence that created it.
//! Engine resources are released deterministically when it is dropped, on
//! every exit path including early failures. Handles are never cached or
//! reused across facade calls.

use std::{path::Path, sync::Arc};

use crate::{
    buffer::{self, FrameBuffer},
    descriptor::{ImageDestination, ImageSource},
    engine::{self, CodecEngine, FrameDecoder},
    error::JxrError,
    metadata::{self, ImageMetadata},
    transcode::{self, Transcoder},
};

/// Result of [`JxrImage::decode_frame_to`].
#[derive(Debug)]
#[must_use]
pub enum DecodeOutput {
    /// The frame was decoded into a freshly allocated vector.
    Owned(Vec<u8>),
    /// The frame was written into the caller's buffer; carries the number of
    /// bytes written.
    Written(usize),
    /// The frame was re-encoded into the destination file.
    Encoded,
}

impl DecodeOutput {
    /// Unwrap the owned variant; `None` for the others.
    pub fn into_owned(self) -> Option<Vec<u8>> {
        match self {
            DecodeOutput::Owned(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// An opened multi-frame JPEG XR image.
///
/// Created from a file, a byte range, or a pinned buffer region — the three
/// source shapes are interchangeable and produce identical metadata. The
/// handle owns the engine-side decoder state, including the frame cursor:
/// methods take `&mut self` because frame selection mutates that cursor, and
/// callers must not assume the cursor persists between logical operations.
///
/// # Example
///
/// ```no_run
/// use jxrdecode::JxrImage;
///
/// let mut image = JxrImage::open("input.jxr")?;
/// println!("{} frames, {}x{}", image.frame_count(),
///          image.metadata().width, image.metadata().height);
/// let pixels = image.decode_frame(0)?;
/// # Ok::<(), jxrdecode::JxrError>(())
/// ```
pub struct JxrImage {
    engine: Arc<dyn CodecEngine>,
    decoder: Box<dyn FrameDecoder>,
    metadata: ImageMetadata,
}

impl std::fmt::Debug for JxrImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JxrImage")
            .field("engine", &self.engine.name())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl JxrImage {
    /// Open the image file at `path` with the process-wide engine.
    ///
    /// # Errors
    ///
    /// [`JxrError::FileOpen`] when the engine cannot open the file;
    /// [`JxrError::FormatError`] when the bitstream header is malformed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, JxrError> {
        Self::open_source(ImageSource::File(path.as_ref()))
    }

    /// Open an image held entirely in a byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self, JxrError> {
        Self::open_source(ImageSource::bytes(data))
    }

    /// Open an image from a region of a byte slice.
    ///
    /// # Errors
    ///
    /// [`JxrError::SourceOutOfBounds`] when `offset + length` exceeds
    /// `data.len()`; the check runs before any engine construction.
    pub fn from_byte_range(data: &[u8], offset: usize, length: usize) -> Result<Self, JxrError> {
        Self::open_source(ImageSource::Bytes {
            data,
            offset,
            length,
        })
    }

    /// Open an image from a region of a pinned buffer, without a caller-side
    /// copy.
    ///
    /// # Errors
    ///
    /// [`JxrError::InvalidBufferKind`] when the buffer is not pinned;
    /// [`JxrError::SourceOutOfBounds`] when the region exceeds its capacity.
    pub fn from_buffer(
        buffer: &FrameBuffer,
        offset: usize,
        length: usize,
    ) -> Result<Self, JxrError> {
        Self::open_source(ImageSource::Buffer {
            buffer,
            offset,
            length,
        })
    }

    /// Open any source descriptor with the process-wide engine.
    pub fn open_source(source: ImageSource<'_>) -> Result<Self, JxrError> {
        Self::open_source_with(engine::default_engine(), source)
    }

    /// Open any source descriptor with an explicit engine.
    ///
    /// Validation order: buffer-typed sources are checked (pinning, region
    /// bounds) before the engine sees anything; only then is the decoder
    /// constructed and the metadata snapshot taken.
    pub fn open_source_with(
        engine: Arc<dyn CodecEngine>,
        source: ImageSource<'_>,
    ) -> Result<Self, JxrError> {
        let decoder = match source.validated_bytes()? {
            None => {
                let ImageSource::File(path) = source else {
                    unreachable!("only file sources resolve to no bytes");
                };
                log::debug!("Opening decoder for file: {}", path.display());
                engine
                    .decoder_from_file(path)
                    .map_err(|error| match error {
                        JxrError::Io(io) => JxrError::FileOpen {
                            path: path.to_path_buf(),
                            reason: io.to_string(),
                        },
                        other => other,
                    })?
            }
            Some(data) => {
                log::debug!("Opening decoder for {} in-memory bytes", data.len());
                engine.decoder_from_bytes(data)?
            }
        };

        let metadata = metadata::snapshot(decoder.as_ref());
        log::debug!(
            "Opened image: {}x{}, {} bytes/pixel, {} frame(s), format {}",
            metadata.width,
            metadata.height,
            metadata.bytes_per_pixel,
            metadata.frame_count,
            metadata.pixel_format,
        );

        Ok(Self {
            engine,
            decoder,
            metadata,
        })
    }

    /// The metadata snapshot taken when the handle was constructed.
    ///
    /// Dimensions describe frame 0. No pixel decode is performed to produce
    /// this; it is identical across the file/bytes/buffer source shapes.
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    /// Number of selectable frames in the container.
    pub fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    /// The engine this handle was constructed with.
    pub(crate) fn engine(&self) -> &Arc<dyn CodecEngine> {
        &self.engine
    }

    /// Mutable access to the engine-side decoder, for the transcode
    /// orchestrator.
    pub(crate) fn decoder_mut(&mut self) -> &mut dyn FrameDecoder {
        self.decoder.as_mut()
    }

    /// Metadata snapshot for a specific frame.
    ///
    /// Frames of a multi-frame container may legitimately differ in
    /// dimensions; this selects the frame and reads its header fields
    /// without decoding pixels.
    pub fn frame_metadata(&mut self, frame_index: u64) -> Result<ImageMetadata, JxrError> {
        self.select(frame_index)?;
        Ok(metadata::snapshot(self.decoder.as_ref()))
    }

    /// Decoded byte size of a specific frame.
    pub fn frame_size(&mut self, frame_index: u64) -> Result<usize, JxrError> {
        Ok(self.frame_metadata(frame_index)?.frame_size())
    }

    /// Decode one frame into a freshly allocated vector sized exactly to the
    /// frame.
    pub fn decode_frame(&mut self, frame_index: u64) -> Result<Vec<u8>, JxrError> {
        match self.decode_frame_to(frame_index, ImageDestination::Owned)? {
            DecodeOutput::Owned(bytes) => Ok(bytes),
            _ => unreachable!("owned destination always yields owned output"),
        }
    }

    /// Decode one frame into `buffer` starting at `offset`; returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// [`JxrError::InvalidBufferKind`] when `buffer` is not pinned and
    /// [`JxrError::DestinationTooSmall`] when `offset + frame size` exceeds
    /// its capacity — in both cases before the engine writes anything.
    pub fn decode_frame_into(
        &mut self,
        frame_index: u64,
        buffer: &mut FrameBuffer,
        offset: usize,
    ) -> Result<usize, JxrError> {
        match self.decode_frame_to(frame_index, ImageDestination::Buffer { buffer, offset })? {
            DecodeOutput::Written(bytes) => Ok(bytes),
            _ => unreachable!("buffer destination always yields written output"),
        }
    }

    /// The single orchestration path over the destination union.
    ///
    /// Sequence: bounds-check the frame index, select the frame (a cursor
    /// mutation), size the frame from the selected frame's own dimensions,
    /// validate the destination, then let the engine produce pixels.
    pub fn decode_frame_to(
        &mut self,
        frame_index: u64,
        destination: ImageDestination<'_>,
    ) -> Result<DecodeOutput, JxrError> {
        self.select(frame_index)?;
        let frame_size = metadata::snapshot(self.decoder.as_ref()).frame_size();

        match destination {
            ImageDestination::Owned => {
                let mut pixels = vec![0u8; frame_size];
                self.decoder.raw_bytes(&mut pixels)?;
                log::debug!("Decoded frame {frame_index} into {frame_size} owned bytes");
                Ok(DecodeOutput::Owned(pixels))
            }
            ImageDestination::Buffer { buffer, offset } => {
                buffer::check_destination(buffer, offset, frame_size)?;
                self.decoder
                    .raw_bytes(&mut buffer.as_mut_slice()[offset..offset + frame_size])?;
                log::debug!(
                    "Decoded frame {frame_index} into caller buffer at offset {offset} \
                     ({frame_size} bytes)"
                );
                Ok(DecodeOutput::Written(frame_size))
            }
            ImageDestination::File(path) => {
                let extension = transcode::extension_of(path)?;
                transcode::encode_selected_frame(
                    self.engine.as_ref(),
                    self.decoder.as_mut(),
                    path,
                    extension,
                )?;
                log::debug!(
                    "Encoded frame {frame_index} to {} as {extension}",
                    path.display()
                );
                Ok(DecodeOutput::Encoded)
            }
        }
    }

    /// Decode every frame, concatenated in frame order into one vector.
    ///
    /// Frames are appended back to back with no interleaving; a container of
    /// differently sized frames yields the sum of the per-frame sizes.
    pub fn decode_all(&mut self) -> Result<Vec<u8>, JxrError> {
        let mut decoded = Vec::new();
        for frame_index in 0..self.frame_count() {
            self.select(frame_index)?;
            let frame_size = metadata::snapshot(self.decoder.as_ref()).frame_size();
            let start = decoded.len();
            decoded.resize(start + frame_size, 0);
            self.decoder.raw_bytes(&mut decoded[start..])?;
        }
        log::debug!(
            "Decoded {} frame(s) into {} concatenated bytes",
            self.frame_count(),
            decoded.len()
        );
        Ok(decoded)
    }

    /// Transcode every frame into the container format selected by `path`'s
    /// extension. See [`Transcoder`] for the loop semantics.
    pub fn transcode_to<P: AsRef<Path>>(&mut self, path: P) -> Result<(), JxrError> {
        Transcoder::new(self).run(path)
    }

    /// Bounds-check and select a frame. Fails fast with
    /// [`JxrError::FrameIndexOutOfRange`] before any engine mutation.
    fn select(&mut self, frame_index: u64) -> Result<(), JxrError> {
        let frame_count = self.metadata.frame_count;
        if frame_index >= frame_count {
            return Err(JxrError::FrameIndexOutOfRange {
                frame_index,
                frame_count,
            });
        }
        self.decoder.select_frame(frame_index)
    }
}

/// Decode every frame of the file at `path`, concatenated in frame order.
///
/// Convenience wrapper: constructs a transient handle, decodes, and releases
/// it before returning.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, JxrError> {
    JxrImage::open(path)?.decode_all()
}

/// Decode the first frame from a region of a byte slice.
pub fn decode_first_frame(data: &[u8], offset: usize, length: usize) -> Result<Vec<u8>, JxrError> {
    JxrImage::from_byte_range(data, offset, length)?.decode_frame(0)
}

/// Decode the first frame from a region of a byte slice into a pinned
/// buffer at `destination_offset`; returns the number of bytes written.
pub fn decode_first_frame_into(
    data: &[u8],
    offset: usize,
    length: usize,
    destination: &mut FrameBuffer,
    destination_offset: usize,
) -> Result<usize, JxrError> {
    JxrImage::from_byte_range(data, offset, length)?.decode_frame_into(
        0,
        destination,
        destination_offset,
    )
}

/// Read the metadata snapshot for any source without decoding pixel data.
pub fn metadata_of(source: ImageSource<'_>) -> Result<ImageMetadata, JxrError> {
    Ok(JxrImage::open_source(source)?.metadata().clone())
}

/// Transcode any source into the container format selected by the output
/// path's extension.
pub fn transcode<P: AsRef<Path>>(source: ImageSource<'_>, output: P) -> Result<(), JxrError> {
    JxrImage::open_source(source)?.transcode_to(output)
}

//! The codec engine seam.
//!
//! The JPEG XR bitstream decoder, pixel-format converters, and container
//! encoders are external collaborators: this crate orchestrates them but
//! never implements them. [`CodecEngine`] and the associated traits define
//! exactly the surface the orchestration layer consumes — every method is
//! opaque, fallible, and blocking.
//!
//! A process carries one default engine, installed once and never unloaded
//! (mirroring a one-time native library load). [`install_engine`] sets it on
//! the first call; later calls are no-ops. When nothing has been installed,
//! [`default_engine`] falls back to the built-in
//! [`RawCodec`](crate::raw::RawCodec) reference engine, which the test-suite
//! and the CLI use.
//!
//! # Binding a native engine
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! # struct MyJxrEngine;
//! # impl jxrdecode::CodecEngine for MyJxrEngine {
//! #     fn name(&self) -> &str { unimplemented!() }
//! #     fn decoder_from_file(&self, _: &std::path::Path) -> Result<Box<dyn jxrdecode::FrameDecoder>, jxrdecode::JxrError> { unimplemented!() }
//! #     fn decoder_from_bytes(&self, _: &[u8]) -> Result<Box<dyn jxrdecode::FrameDecoder>, jxrdecode::JxrError> { unimplemented!() }
//! #     fn format_converter(&self, _: &mut dyn jxrdecode::FrameDecoder, _: &str) -> Result<Box<dyn jxrdecode::FormatConverter>, jxrdecode::JxrError> { unimplemented!() }
//! #     fn output_stream(&self, _: &std::path::Path) -> Result<Box<dyn jxrdecode::OutputStream>, jxrdecode::JxrError> { unimplemented!() }
//! #     fn encoder(&self, _: Box<dyn jxrdecode::OutputStream>, _: &str) -> Result<Box<dyn jxrdecode::FrameEncoder>, jxrdecode::JxrError> { unimplemented!() }
//! # }
//! jxrdecode::install_engine(Arc::new(MyJxrEngine));
//! ```

use std::{
    io::{Seek, Write},
    path::Path,
    sync::{Arc, OnceLock},
};

use crate::{
    error::JxrError,
    metadata::{ChannelOrder, PixelFormatId},
};

/// A decoder handle for one opened image.
///
/// Owns the engine-side decode state, including the frame cursor set by
/// [`select_frame`](FrameDecoder::select_frame). The cursor is plain mutable
/// state: it is not safe for concurrent use, and callers must not assume it
/// persists between logical operations. Dimension accessors describe the
/// currently selected frame.
pub trait FrameDecoder: Send {
    /// Number of selectable frames in the container.
    fn frame_count(&self) -> u64;

    /// Move the decode cursor to the given zero-based frame.
    ///
    /// The orchestration layer bounds-checks the index before calling; an
    /// engine may still fail for bitstream-level reasons.
    fn select_frame(&mut self, index: u64) -> Result<(), JxrError>;

    /// Width in pixels of the selected frame.
    fn width(&self) -> u64;

    /// Height in pixels of the selected frame.
    fn height(&self) -> u64;

    /// Bytes per pixel of the selected frame.
    fn bytes_per_pixel(&self) -> u64;

    /// Pixel format GUID of the selected frame.
    fn pixel_format(&self) -> PixelFormatId;

    /// Channel order of decoded data.
    fn channel_order(&self) -> ChannelOrder;

    /// Decode the selected frame's raw pixel data into `destination`.
    ///
    /// `destination` is exactly `width * height * bytes_per_pixel` bytes; the
    /// orchestration layer sizes and validates it before the call.
    fn raw_bytes(&mut self, destination: &mut [u8]) -> Result<(), JxrError>;
}

/// Decoded pixel data adapted to the channel layout a target container
/// expects. Built per frame by [`CodecEngine::format_converter`].
pub trait FormatConverter {
    /// Width in pixels of the converted frame.
    fn width(&self) -> u64;

    /// Height in pixels of the converted frame.
    fn height(&self) -> u64;

    /// Bytes per pixel of the converted data.
    fn bytes_per_pixel(&self) -> u64;

    /// The converted pixel bytes.
    fn pixels(&self) -> &[u8];
}

/// A writable, seekable byte sink for encoded output. Container encoders
/// require seeking to patch headers after the payload is written.
pub trait OutputStream: Write + Seek + Send {}

impl<T: Write + Seek + Send> OutputStream for T {}

/// An encoder bound to an output stream and a container format.
///
/// Driven strictly in sequence: initialize from the decoder's per-frame
/// state, write the converted source, close.
pub trait FrameEncoder {
    /// Adopt dimensions and pixel format from the decoder's selected frame.
    fn initialize_from_decoder(&mut self, decoder: &dyn FrameDecoder) -> Result<(), JxrError>;

    /// Encode the converted frame into the output stream.
    fn write_source(&mut self, converter: &dyn FormatConverter) -> Result<(), JxrError>;

    /// Flush and finalize the output. The encoder is unusable afterwards.
    fn close(&mut self) -> Result<(), JxrError>;
}

/// The external codec collaborator: constructs decoders, converters,
/// streams, and encoders. Implementations are shared across threads via
/// `Arc`; each constructed handle is exclusively owned by one operation.
pub trait CodecEngine: Send + Sync {
    /// Human-readable engine name, used in diagnostics.
    fn name(&self) -> &str;

    /// Construct a decoder for the image at `path`.
    fn decoder_from_file(&self, path: &Path) -> Result<Box<dyn FrameDecoder>, JxrError>;

    /// Construct a decoder over compressed bytes.
    ///
    /// `data` has already passed region and pinning validation. Whether the
    /// engine retains it by address (FFI engines) or by copy is the engine's
    /// business.
    fn decoder_from_bytes(&self, data: &[u8]) -> Result<Box<dyn FrameDecoder>, JxrError>;

    /// Build a converter adapting the decoder's selected frame to the layout
    /// required by the output format named by `extension`.
    fn format_converter(
        &self,
        decoder: &mut dyn FrameDecoder,
        extension: &str,
    ) -> Result<Box<dyn FormatConverter>, JxrError>;

    /// Open (create or truncate) an output stream for `path`.
    fn output_stream(&self, path: &Path) -> Result<Box<dyn OutputStream>, JxrError>;

    /// Construct an encoder writing the format named by `extension` into
    /// `stream`.
    fn encoder(
        &self,
        stream: Box<dyn OutputStream>,
        extension: &str,
    ) -> Result<Box<dyn FrameEncoder>, JxrError>;
}

static ENGINE: OnceLock<Arc<dyn CodecEngine>> = OnceLock::new();

/// Install the process-wide codec engine.
///
/// The first call installs and returns `true`; every later call is a no-op
/// returning `false`. The engine is never unloaded for the lifetime of the
/// process.
pub fn install_engine(engine: Arc<dyn CodecEngine>) -> bool {
    let name = engine.name().to_string();
    let installed = ENGINE.set(engine).is_ok();
    if installed {
        log::info!("Installed codec engine: {name}");
    } else {
        log::debug!("Codec engine already installed; ignoring {name}");
    }
    installed
}

/// The process-wide codec engine.
///
/// Returns the installed engine, or lazily installs the built-in
/// [`RawCodec`](crate::raw::RawCodec) reference engine when none was bound.
pub fn default_engine() -> Arc<dyn CodecEngine> {
    ENGINE
        .get_or_init(|| {
            log::debug!("No codec engine installed; using built-in raw reference engine");
            Arc::new(crate::raw::RawCodec)
        })
        .clone()
}

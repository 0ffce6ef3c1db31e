//! # jxrdecode
//!
//! Decode and transcode multi-frame JPEG XR images through a pluggable
//! codec engine.
//!
//! `jxrdecode` is the orchestration layer in front of a native JPEG XR
//! codec: it validates the memory regions that cross the engine boundary,
//! drives the per-frame decode cycle, and delivers pixels into whichever
//! destination shape the caller needs — a fresh vector, a pinned buffer at
//! an offset, or a re-encoded output file keyed by extension. The bitstream
//! decoding itself lives behind the [`CodecEngine`] trait; bind a native
//! engine with [`install_engine`], or rely on the built-in
//! [`raw`](crate::raw) reference engine used by the test-suite and the CLI.
//!
//! ## Quick Start
//!
//! ### Decode a frame
//!
//! ```no_run
//! use jxrdecode::JxrImage;
//!
//! let mut image = JxrImage::open("input.jxr")?;
//! let metadata = image.metadata().clone();
//! println!("{}x{}, {} frame(s)", metadata.width, metadata.height, image.frame_count());
//!
//! let pixels = image.decode_frame(0)?;
//! assert_eq!(pixels.len(), metadata.frame_size());
//! # Ok::<(), jxrdecode::JxrError>(())
//! ```
//!
//! ### Decode into a caller-supplied pinned buffer
//!
//! ```no_run
//! use jxrdecode::{FrameBuffer, JxrImage};
//!
//! let mut image = JxrImage::open("input.jxr")?;
//! let mut destination = FrameBuffer::pinned(image.metadata().frame_size());
//! image.decode_frame_into(0, &mut destination, 0)?;
//! # Ok::<(), jxrdecode::JxrError>(())
//! ```
//!
//! ### Transcode to another container
//!
//! ```no_run
//! use jxrdecode::JxrImage;
//!
//! let mut image = JxrImage::open("input.jxr")?;
//! image.transcode_to("output.bmp")?;
//! # Ok::<(), jxrdecode::JxrError>(())
//! ```
//!
//! ## The buffer contract
//!
//! The codec engine references buffers by raw address, so every buffer it
//! reads or writes must be pinned — backed by storage that cannot move for
//! the duration of the call. [`FrameBuffer`] carries that property as a
//! type-level tag, and every operation validates it (along with region
//! bounds and destination capacity) **before** the engine touches memory. A
//! failing check is a typed error and guarantees no native read or write
//! happened.
//!
//! ## Concurrency
//!
//! Every operation is synchronous and blocking. A [`JxrImage`]'s frame
//! cursor is plain mutable state: serialize access to a handle, or open a
//! fresh handle per concurrent operation — handles are cheap relative to
//! decode cost.

pub mod buffer;
pub mod decode;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod raw;
pub mod transcode;

pub use buffer::{BufferKind, BufferRole, FrameBuffer};
pub use decode::{
    DecodeOutput, JxrImage, decode_file, decode_first_frame, decode_first_frame_into,
    metadata_of, transcode,
};
pub use descriptor::{ImageDestination, ImageSource};
pub use engine::{
    CodecEngine, FormatConverter, FrameDecoder, FrameEncoder, OutputStream, default_engine,
    install_engine,
};
pub use error::JxrError;
pub use metadata::{ChannelOrder, ImageMetadata, PixelFormatId};
pub use transcode::Transcoder;

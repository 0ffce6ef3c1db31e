//! Built-in reference codec engine.
//!
//! [`RawCodec`] implements the [`CodecEngine`](crate::CodecEngine) seam over
//! a trivial uncompressed multi-frame container. It exists so the
//! orchestration layer has a complete, deterministic engine to run against:
//! the test-suite, the benchmarks, and the CLI all use it when no native
//! JPEG XR engine has been installed via
//! [`install_engine`](crate::install_engine).
//!
//! The container is deliberately minimal: a fixed header followed by
//! per-frame dimension records and raw pixel payloads. Frames may differ in
//! dimensions. The header is parsed eagerly at construction, so malformed
//! input surfaces [`JxrError::FormatError`] when the decoder is built, never
//! later at metadata reads.
//!
//! Encoded output goes through the [`image`] crate, keyed by the output
//! extension (`bmp`, `png`, `tiff`, `jpeg`, ...). The format converter
//! reorders BGR payloads to the RGB layout those encoders expect.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use image::{ExtendedColorType, ImageFormat};

use crate::{
    engine::{CodecEngine, FormatConverter, FrameDecoder, FrameEncoder, OutputStream},
    error::JxrError,
    metadata::{ChannelOrder, PixelFormatId},
};

/// Container magic, followed by a single version byte.
const MAGIC: &[u8; 4] = b"RAWC";
const VERSION: u8 = 1;

/// Fixed header: magic, version, frame count (u32 LE), pixel format GUID,
/// channel order byte.
const HEADER_LEN: usize = 4 + 1 + 4 + 16 + 1;
/// Per-frame record: width, height, bytes per pixel (u32 LE each).
const FRAME_HEADER_LEN: usize = 12;

/// Pixel format GUID for 24-bit RGB data, as fixtures typically use.
pub const FORMAT_24BPP_RGB: PixelFormatId = PixelFormatId([
    0x24, 0xc3, 0xdd, 0x6f, 0x03, 0x4e, 0xfe, 0x4b, 0xb1, 0x85, 0x3d, 0x77, 0x76, 0x8d, 0xc9,
    0x0d,
]);

/// Pixel format GUID for 8-bit grayscale data.
pub const FORMAT_8BPP_GRAY: PixelFormatId = PixelFormatId([
    0x25, 0xc3, 0xdd, 0x6f, 0x03, 0x4e, 0xfe, 0x4b, 0xb1, 0x85, 0x3d, 0x77, 0x76, 0x8d, 0xc9,
    0x0d,
]);

/// One frame of a raw container: dimensions plus its pixel payload.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per pixel.
    pub bytes_per_pixel: u32,
    /// Exactly `width * height * bytes_per_pixel` bytes.
    pub pixels: Vec<u8>,
}

impl RawFrame {
    /// `None` when `width * height * bytes_per_pixel` overflows `usize`.
    fn payload_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_pixel as usize)
    }
}

/// Serialize frames into raw-container bytes.
///
/// Used by tests and tools to fabricate fixtures.
///
/// # Errors
///
/// [`JxrError::FormatError`] when a frame's payload length does not match
/// its dimensions.
pub fn write_container(
    pixel_format: PixelFormatId,
    channel_order: ChannelOrder,
    frames: &[RawFrame],
) -> Result<Vec<u8>, JxrError> {
    let payload: usize = frames.iter().map(|frame| frame.pixels.len()).sum();
    let mut out = Vec::with_capacity(HEADER_LEN + frames.len() * FRAME_HEADER_LEN + payload);
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    out.extend_from_slice(&pixel_format.0);
    out.push(match channel_order {
        ChannelOrder::Rgb => 0,
        ChannelOrder::Bgr => 1,
    });
    for frame in frames {
        let expected = frame.payload_len().ok_or_else(|| {
            JxrError::FormatError(format!(
                "frame dimensions {}x{}x{} overflow the addressable payload size",
                frame.width, frame.height, frame.bytes_per_pixel
            ))
        })?;
        if frame.pixels.len() != expected {
            return Err(JxrError::FormatError(format!(
                "frame payload is {} bytes but dimensions {}x{}x{} require {expected}",
                frame.pixels.len(),
                frame.width,
                frame.height,
                frame.bytes_per_pixel,
            )));
        }
        out.extend_from_slice(&frame.width.to_le_bytes());
        out.extend_from_slice(&frame.height.to_le_bytes());
        out.extend_from_slice(&frame.bytes_per_pixel.to_le_bytes());
        out.extend_from_slice(&frame.pixels);
    }
    Ok(out)
}

/// The reference engine. Stateless; all state lives in the handles it
/// constructs.
#[derive(Debug, Default)]
pub struct RawCodec;

impl CodecEngine for RawCodec {
    fn name(&self) -> &str {
        "raw"
    }

    fn decoder_from_file(&self, path: &Path) -> Result<Box<dyn FrameDecoder>, JxrError> {
        let data = std::fs::read(path)?;
        Ok(Box::new(RawDecoder::parse(&data)?))
    }

    fn decoder_from_bytes(&self, data: &[u8]) -> Result<Box<dyn FrameDecoder>, JxrError> {
        Ok(Box::new(RawDecoder::parse(data)?))
    }

    fn format_converter(
        &self,
        decoder: &mut dyn FrameDecoder,
        extension: &str,
    ) -> Result<Box<dyn FormatConverter>, JxrError> {
        if ImageFormat::from_extension(extension).is_none() {
            return Err(JxrError::UnsupportedExtension(extension.to_string()));
        }
        let width = decoder.width();
        let height = decoder.height();
        let bytes_per_pixel = decoder.bytes_per_pixel();
        let mut pixels = vec![0u8; (width * height * bytes_per_pixel) as usize];
        decoder.raw_bytes(&mut pixels)?;

        // Output encoders expect RGB channel order.
        if decoder.channel_order() == ChannelOrder::Bgr && bytes_per_pixel >= 3 {
            for pixel in pixels.chunks_exact_mut(bytes_per_pixel as usize) {
                pixel.swap(0, 2);
            }
        }

        Ok(Box::new(RawConverter {
            width,
            height,
            bytes_per_pixel,
            pixels,
        }))
    }

    fn output_stream(&self, path: &Path) -> Result<Box<dyn OutputStream>, JxrError> {
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn encoder(
        &self,
        stream: Box<dyn OutputStream>,
        extension: &str,
    ) -> Result<Box<dyn FrameEncoder>, JxrError> {
        let format = ImageFormat::from_extension(extension)
            .ok_or_else(|| JxrError::UnsupportedExtension(extension.to_string()))?;
        Ok(Box::new(RawEncoder {
            stream: Some(stream),
            format,
            dimensions: None,
        }))
    }
}

/// Decoder over an eagerly parsed raw container.
struct RawDecoder {
    frames: Vec<RawFrame>,
    pixel_format: PixelFormatId,
    channel_order: ChannelOrder,
    cursor: usize,
}

impl RawDecoder {
    fn parse(data: &[u8]) -> Result<Self, JxrError> {
        if data.len() < HEADER_LEN {
            return Err(JxrError::FormatError(format!(
                "container truncated: {} bytes is shorter than the {HEADER_LEN}-byte header",
                data.len()
            )));
        }
        if &data[0..4] != MAGIC {
            return Err(JxrError::FormatError(
                "bad container magic".to_string(),
            ));
        }
        if data[4] != VERSION {
            return Err(JxrError::FormatError(format!(
                "unsupported container version {}",
                data[4]
            )));
        }
        let frame_count = u32::from_le_bytes([data[5], data[6], data[7], data[8]]) as usize;
        let mut pixel_format = [0u8; 16];
        pixel_format.copy_from_slice(&data[9..25]);
        let channel_order = match data[25] {
            0 => ChannelOrder::Rgb,
            1 => ChannelOrder::Bgr,
            other => {
                return Err(JxrError::FormatError(format!(
                    "unknown channel order tag {other}"
                )));
            }
        };

        // A frame costs at least its header, which bounds how many a
        // container of this size can actually hold.
        let mut frames = Vec::with_capacity(frame_count.min(data.len() / FRAME_HEADER_LEN));
        let mut position = HEADER_LEN;
        for index in 0..frame_count {
            if position + FRAME_HEADER_LEN > data.len() {
                return Err(JxrError::FormatError(format!(
                    "container truncated in header of frame {index}"
                )));
            }
            let read_u32 = |at: usize| {
                u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
            };
            let width = read_u32(position);
            let height = read_u32(position + 4);
            let bytes_per_pixel = read_u32(position + 8);
            position += FRAME_HEADER_LEN;

            let payload = (width as usize)
                .checked_mul(height as usize)
                .and_then(|rows| rows.checked_mul(bytes_per_pixel as usize))
                .ok_or_else(|| {
                    JxrError::FormatError(format!(
                        "frame {index} dimensions {width}x{height}x{bytes_per_pixel} \
                         overflow the addressable payload size"
                    ))
                })?;
            if payload > data.len() - position {
                return Err(JxrError::FormatError(format!(
                    "container truncated in payload of frame {index}: \
                     need {payload} bytes at offset {position}"
                )));
            }
            frames.push(RawFrame {
                width,
                height,
                bytes_per_pixel,
                pixels: data[position..position + payload].to_vec(),
            });
            position += payload;
        }

        Ok(Self {
            frames,
            pixel_format: PixelFormatId(pixel_format),
            channel_order,
            cursor: 0,
        })
    }

    fn selected(&self) -> &RawFrame {
        &self.frames[self.cursor]
    }
}

impl FrameDecoder for RawDecoder {
    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn select_frame(&mut self, index: u64) -> Result<(), JxrError> {
        if index >= self.frames.len() as u64 {
            return Err(JxrError::FrameIndexOutOfRange {
                frame_index: index,
                frame_count: self.frames.len() as u64,
            });
        }
        self.cursor = index as usize;
        Ok(())
    }

    fn width(&self) -> u64 {
        self.selected().width as u64
    }

    fn height(&self) -> u64 {
        self.selected().height as u64
    }

    fn bytes_per_pixel(&self) -> u64 {
        self.selected().bytes_per_pixel as u64
    }

    fn pixel_format(&self) -> PixelFormatId {
        self.pixel_format
    }

    fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    fn raw_bytes(&mut self, destination: &mut [u8]) -> Result<(), JxrError> {
        let frame = self.selected();
        if destination.len() != frame.pixels.len() {
            return Err(JxrError::FormatError(format!(
                "destination slice is {} bytes but frame holds {}",
                destination.len(),
                frame.pixels.len()
            )));
        }
        destination.copy_from_slice(&frame.pixels);
        Ok(())
    }
}

/// Converted pixel data for one frame, always in RGB channel order.
struct RawConverter {
    width: u64,
    height: u64,
    bytes_per_pixel: u64,
    pixels: Vec<u8>,
}

impl FormatConverter for RawConverter {
    fn width(&self) -> u64 {
        self.width
    }

    fn height(&self) -> u64 {
        self.height
    }

    fn bytes_per_pixel(&self) -> u64 {
        self.bytes_per_pixel
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Encoder writing one frame through the `image` crate.
struct RawEncoder {
    stream: Option<Box<dyn OutputStream>>,
    format: ImageFormat,
    dimensions: Option<(u64, u64)>,
}

impl FrameEncoder for RawEncoder {
    fn initialize_from_decoder(&mut self, decoder: &dyn FrameDecoder) -> Result<(), JxrError> {
        self.dimensions = Some((decoder.width(), decoder.height()));
        Ok(())
    }

    fn write_source(&mut self, converter: &dyn FormatConverter) -> Result<(), JxrError> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            JxrError::FormatError("encoder already closed".to_string())
        })?;
        if self.dimensions.is_none() {
            return Err(JxrError::FormatError(
                "encoder not initialized from a decoder".to_string(),
            ));
        }

        let color = match converter.bytes_per_pixel() {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            4 => ExtendedColorType::Rgba8,
            other => {
                return Err(JxrError::FormatError(format!(
                    "no encoder color type for {other} bytes per pixel"
                )));
            }
        };
        image::write_buffer_with_format(
            stream,
            converter.pixels(),
            converter.width() as u32,
            converter.height() as u32,
            color,
            self.format,
        )?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), JxrError> {
        if let Some(mut stream) = self.stream.take() {
            stream.flush()?;
        }
        Ok(())
    }
}

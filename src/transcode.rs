//! Frame transcoding (re-encoding into another container format).
//!
//! This module provides [`Transcoder`] for re-encoding every frame of an
//! opened image into an output container selected by the destination file's
//! extension. For each frame the orchestrator builds a format converter,
//! opens an output stream, constructs an encoder, initializes it from the
//! decoder's per-frame state, writes the converted frame, and closes the
//! encoder.
//!
//! Multi-frame inputs keep the **last-frame-wins** behavior of the
//! per-frame loop: each iteration reopens and truncates the same destination
//! path, so earlier frames are overwritten and only the final frame remains
//! in the output file. This is preserved deliberately (and logged as a
//! warning) rather than silently changed; supporting multi-image output
//! containers would require an encoder that appends frames instead of
//! reopening the stream.
//!
//! On a mid-loop failure a partially written destination file may remain.
//! Callers that need atomicity should write to a temporary path and rename
//! on success.
//!
//! # Example
//!
//! ```no_run
//! use jxrdecode::{JxrImage, Transcoder};
//!
//! let mut image = JxrImage::open("input.jxr")?;
//! Transcoder::new(&mut image).run("output.bmp")?;
//! # Ok::<(), jxrdecode::JxrError>(())
//! ```

use std::path::Path;

use crate::{
    decode::JxrImage,
    engine::{CodecEngine, FrameDecoder},
    error::JxrError,
};

/// Per-frame transcode orchestrator.
///
/// Obtained via [`Transcoder::new`]; call [`run`](Transcoder::run) with the
/// destination path. The output format is keyed by the path's extension —
/// the case-sensitive suffix after the final `.` of the file name.
pub struct Transcoder<'a> {
    image: &'a mut JxrImage,
}

impl<'a> Transcoder<'a> {
    /// Create a transcoder over an opened image.
    pub fn new(image: &'a mut JxrImage) -> Self {
        Self { image }
    }

    /// Re-encode every frame into the container selected by `path`'s
    /// extension.
    ///
    /// # Errors
    ///
    /// - [`JxrError::UnsupportedExtension`] when the path has no extension
    ///   or no encoder is registered for it.
    /// - [`JxrError::FormatError`] when conversion or encoding fails.
    /// - [`JxrError::Io`] on stream open/write failures.
    pub fn run<P: AsRef<Path>>(self, path: P) -> Result<(), JxrError> {
        let path = path.as_ref();
        let extension = extension_of(path)?;
        let frame_count = self.image.frame_count();

        log::info!(
            "Transcoding {} frame(s) to {} (extension {extension:?})",
            frame_count,
            path.display()
        );

        if frame_count > 1 {
            log::warn!(
                "Transcoding {frame_count} frames to one {extension:?} destination: \
                 each frame reopens and truncates the file, only the last will remain"
            );
        }

        let engine = self.image.engine().clone();
        for frame_index in 0..frame_count {
            self.image.decoder_mut().select_frame(frame_index)?;
            encode_selected_frame(engine.as_ref(), self.image.decoder_mut(), path, extension)?;
            log::debug!("Wrote frame {frame_index} to {}", path.display());
        }
        Ok(())
    }
}

/// Encode the decoder's currently selected frame to `path`.
///
/// One full converter → stream → encoder cycle; the stream truncates any
/// existing file at `path`.
pub(crate) fn encode_selected_frame(
    engine: &dyn CodecEngine,
    decoder: &mut dyn FrameDecoder,
    path: &Path,
    extension: &str,
) -> Result<(), JxrError> {
    let converter = engine.format_converter(decoder, extension)?;
    let stream = engine.output_stream(path)?;
    let mut encoder = engine.encoder(stream, extension)?;
    encoder.initialize_from_decoder(decoder)?;
    encoder.write_source(converter.as_ref())?;
    encoder.close()
}

/// Extract the output-format extension from a destination path: the
/// case-sensitive suffix after the final `.` of the file name.
///
/// # Errors
///
/// [`JxrError::UnsupportedExtension`] carrying the file name when there is
/// no `.`-separated suffix to key a format on.
pub(crate) fn extension_of(path: &Path) -> Result<&str, JxrError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| JxrError::UnsupportedExtension(path.display().to_string()))?;
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => Ok(&name[dot + 1..]),
        _ => Err(JxrError::UnsupportedExtension(name.to_string())),
    }
}

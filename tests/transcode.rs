//! Transcode integration tests.
//!
//! Output files are re-opened with the `image` crate to verify they are
//! valid containers with the expected dimensions and content.

use std::io::Write;

use image::GenericImageView;
use jxrdecode::{
    ChannelOrder, ImageSource, JxrError, JxrImage, Transcoder,
    raw::{self, RawFrame},
};

fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RawFrame {
    let pixels = rgb
        .iter()
        .copied()
        .cycle()
        .take((width * height * 3) as usize)
        .collect();
    RawFrame {
        width,
        height,
        bytes_per_pixel: 3,
        pixels,
    }
}

fn container(frames: &[RawFrame]) -> Vec<u8> {
    raw::write_container(raw::FORMAT_24BPP_RGB, ChannelOrder::Rgb, frames)
        .expect("fixture container")
}

#[test]
fn single_frame_bmp_is_reopenable_with_same_dimensions() {
    let data = container(&[solid_frame(32, 16, [200, 10, 10])]);
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("frame.bmp");
    Transcoder::new(&mut image).run(&output).expect("transcode");

    let reopened = image::open(&output).expect("output must be a valid BMP");
    assert_eq!(reopened.dimensions(), (32, 16));
    assert_eq!(reopened.to_rgb8().get_pixel(0, 0).0, [200, 10, 10]);
}

#[test]
fn png_output_preserves_pixel_content() {
    let data = container(&[solid_frame(8, 8, [1, 2, 3])]);

    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("frame.png");
    jxrdecode::transcode(ImageSource::bytes(&data), &output).expect("transcode");

    let reopened = image::open(&output).expect("output must be a valid PNG");
    for (_, _, pixel) in reopened.to_rgb8().enumerate_pixels() {
        assert_eq!(pixel.0, [1, 2, 3]);
    }
}

#[test]
fn bgr_source_is_reordered_in_the_output() {
    let frame = RawFrame {
        width: 2,
        height: 1,
        bytes_per_pixel: 3,
        pixels: vec![255, 0, 0, 255, 0, 0], // blue in BGR order
    };
    let data = raw::write_container(raw::FORMAT_24BPP_RGB, ChannelOrder::Bgr, &[frame])
        .expect("fixture container");

    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("frame.png");
    jxrdecode::transcode(ImageSource::bytes(&data), &output).expect("transcode");

    let reopened = image::open(&output).expect("valid PNG");
    assert_eq!(
        reopened.to_rgb8().get_pixel(0, 0).0,
        [0, 0, 255],
        "BGR payload must come out as blue in the RGB output"
    );
}

/// The per-frame loop reopens and truncates the destination for every
/// frame, so a multi-frame input leaves only the final frame in the output.
/// This pins the historical behavior; do not "fix" it silently.
#[test]
fn multi_frame_transcode_keeps_only_the_last_frame() {
    let data = container(&[
        solid_frame(8, 8, [255, 0, 0]),
        solid_frame(8, 8, [0, 255, 0]),
        solid_frame(8, 8, [0, 0, 255]),
    ]);
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("frames.bmp");
    image.transcode_to(&output).expect("transcode");

    let reopened = image::open(&output).expect("valid BMP");
    assert_eq!(reopened.dimensions(), (8, 8));
    assert_eq!(
        reopened.to_rgb8().get_pixel(0, 0).0,
        [0, 0, 255],
        "Last frame wins: the file must hold frame 2's content"
    );
}

#[test]
fn unsupported_extension_is_rejected() {
    let data = container(&[solid_frame(4, 4, [9, 9, 9])]);
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let dir = tempfile::tempdir().expect("temp dir");
    let error = Transcoder::new(&mut image)
        .run(dir.path().join("frame.nonsense"))
        .unwrap_err();
    match error {
        JxrError::UnsupportedExtension(extension) => assert_eq!(extension, "nonsense"),
        other => panic!("Expected UnsupportedExtension, got {other:?}"),
    }
}

#[test]
fn missing_extension_is_rejected() {
    let data = container(&[solid_frame(4, 4, [9, 9, 9])]);
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let dir = tempfile::tempdir().expect("temp dir");
    let error = image.transcode_to(dir.path().join("frame")).unwrap_err();
    assert!(matches!(error, JxrError::UnsupportedExtension(_)));
}

#[test]
fn transcode_from_file_source() {
    let data = container(&[solid_frame(5, 5, [42, 43, 44])]);
    let mut input = tempfile::NamedTempFile::new().expect("temp file");
    input.write_all(&data).expect("write fixture");

    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("out.png");
    jxrdecode::transcode(ImageSource::File(input.path()), &output).expect("transcode");

    let reopened = image::open(&output).expect("valid PNG");
    assert_eq!(reopened.dimensions(), (5, 5));
}

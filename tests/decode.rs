//! Decode integration tests.
//!
//! Fixtures are fabricated in memory with the raw reference engine's
//! container writer, so every source shape (file, byte range, pinned
//! buffer) can be exercised against known pixel data.

use std::io::Write;

use jxrdecode::{
    ChannelOrder, FrameBuffer, ImageSource, JxrImage,
    raw::{self, RawFrame},
};

/// Deterministic pixel pattern so decoded output can be checked
/// byte-for-byte.
fn patterned_frame(width: u32, height: u32, bytes_per_pixel: u32, seed: u8) -> RawFrame {
    let len = (width * height * bytes_per_pixel) as usize;
    let pixels: Vec<u8> = (0..len)
        .map(|i| seed.wrapping_add((i % 251) as u8))
        .collect();
    RawFrame {
        width,
        height,
        bytes_per_pixel,
        pixels,
    }
}

fn single_frame_container() -> (Vec<u8>, RawFrame) {
    let frame = patterned_frame(64, 64, 3, 7);
    let data = raw::write_container(raw::FORMAT_24BPP_RGB, ChannelOrder::Rgb, &[frame.clone()])
        .expect("fixture container");
    (data, frame)
}

fn three_frame_container() -> (Vec<u8>, Vec<RawFrame>) {
    let frames = vec![
        patterned_frame(16, 8, 3, 1),
        patterned_frame(8, 8, 3, 2),
        patterned_frame(4, 4, 3, 3),
    ];
    let data = raw::write_container(raw::FORMAT_24BPP_RGB, ChannelOrder::Rgb, &frames)
        .expect("fixture container");
    (data, frames)
}

#[test]
fn metadata_matches_decoded_length() {
    let (data, _) = single_frame_container();
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let metadata = image.metadata().clone();
    let decoded = image.decode_frame(0).expect("decode");

    assert_eq!(decoded.len() as u64 / metadata.bytes_per_pixel, 64 * 64);
    assert_eq!(decoded.len(), metadata.frame_size());
    assert_eq!(metadata.width, 64);
    assert_eq!(metadata.height, 64);
    assert_eq!(metadata.bytes_per_pixel, 3);
}

#[test]
fn known_fixture_decodes_to_12288_known_bytes() {
    let (data, frame) = single_frame_container();
    let decoded = jxrdecode::decode_first_frame(&data, 0, data.len()).expect("decode");

    assert_eq!(decoded.len(), 12288);
    assert_eq!(decoded, frame.pixels, "Decoded bytes must match the fixture pattern");
}

#[test]
fn decoding_the_same_frame_twice_is_deterministic() {
    let (data, _) = single_frame_container();

    // Two independent operations, two independent handles.
    let first = JxrImage::from_bytes(&data)
        .expect("open")
        .decode_frame(0)
        .expect("decode");
    let second = JxrImage::from_bytes(&data)
        .expect("open")
        .decode_frame(0)
        .expect("decode");

    assert_eq!(first, second);
}

#[test]
fn buffer_destination_matches_owned_destination() {
    let (data, _) = single_frame_container();
    let mut image = JxrImage::from_bytes(&data).expect("open");
    let frame_size = image.metadata().frame_size();

    let owned = image.decode_frame(0).expect("owned decode");

    let offset = 32;
    let mut destination = FrameBuffer::pinned(offset + frame_size);
    let written = image
        .decode_frame_into(0, &mut destination, offset)
        .expect("buffer decode");

    assert_eq!(written, frame_size);
    assert_eq!(&destination.as_slice()[offset..offset + frame_size], &owned[..]);
    // Bytes before the offset stay untouched.
    assert!(destination.as_slice()[..offset].iter().all(|&b| b == 0));
}

#[test]
fn metadata_is_identical_across_source_shapes() {
    let (data, _) = single_frame_container();

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&data).expect("write fixture");

    let from_file = jxrdecode::metadata_of(ImageSource::File(file.path())).expect("file source");
    let from_bytes = jxrdecode::metadata_of(ImageSource::bytes(&data)).expect("bytes source");

    let buffer = FrameBuffer::pinned_from_vec(data.clone());
    let from_buffer = jxrdecode::metadata_of(ImageSource::buffer(&buffer)).expect("buffer source");

    assert_eq!(from_file, from_bytes);
    assert_eq!(from_bytes, from_buffer);
}

#[test]
fn byte_range_source_skips_leading_garbage() {
    let (data, frame) = single_frame_container();
    let mut padded = vec![0xffu8; 11];
    padded.extend_from_slice(&data);

    let decoded = jxrdecode::decode_first_frame(&padded, 11, data.len()).expect("decode");
    assert_eq!(decoded, frame.pixels);
}

#[test]
fn decode_all_concatenates_frames_in_order() {
    let (data, frames) = three_frame_container();
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let decoded = image.decode_all().expect("decode all");

    let mut expected = Vec::new();
    for frame in &frames {
        expected.extend_from_slice(&frame.pixels);
    }
    assert_eq!(decoded, expected, "Frames must be concatenated in frame order");
}

#[test]
fn frame_counts_agree_between_metadata_and_iteration() {
    let (data, frames) = three_frame_container();
    let mut image = JxrImage::from_bytes(&data).expect("open");

    assert_eq!(image.frame_count(), 3);
    assert_eq!(image.metadata().frame_count, 3);
    for frame_index in 0..3 {
        let metadata = image.frame_metadata(frame_index).expect("frame metadata");
        assert_eq!(metadata.width, frames[frame_index as usize].width as u64);
        assert_eq!(metadata.height, frames[frame_index as usize].height as u64);
    }
}

#[test]
fn per_frame_dimensions_may_differ() {
    let (data, _) = three_frame_container();
    let mut image = JxrImage::from_bytes(&data).expect("open");

    assert_eq!(image.frame_size(0).expect("size"), 16 * 8 * 3);
    assert_eq!(image.frame_size(1).expect("size"), 8 * 8 * 3);
    assert_eq!(image.frame_size(2).expect("size"), 4 * 4 * 3);
}

#[test]
fn later_frame_decodes_do_not_alias_earlier_output() {
    let (data, frames) = three_frame_container();
    let mut image = JxrImage::from_bytes(&data).expect("open");

    let frame_zero = image.decode_frame(0).expect("frame 0");
    let snapshot = frame_zero.clone();

    let _frame_two = image.decode_frame(2).expect("frame 2");

    assert_eq!(frame_zero, snapshot, "Frame 0 bytes must not change");
    assert_eq!(frame_zero, frames[0].pixels);
}

#[test]
fn decode_file_reads_all_frames_from_disk() {
    let (data, frames) = three_frame_container();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&data).expect("write fixture");

    let decoded = jxrdecode::decode_file(file.path()).expect("decode file");
    let expected: usize = frames.iter().map(|f| f.pixels.len()).sum();
    assert_eq!(decoded.len(), expected);
}

#[test]
fn channel_order_is_reported_verbatim() {
    let frame = patterned_frame(2, 2, 3, 9);
    let data = raw::write_container(raw::FORMAT_24BPP_RGB, ChannelOrder::Bgr, &[frame.clone()])
        .expect("fixture container");

    let mut image = JxrImage::from_bytes(&data).expect("open");
    assert!(image.metadata().is_bgr());

    // Decoded bytes come back in container order, never normalized.
    let decoded = image.decode_frame(0).expect("decode");
    assert_eq!(decoded, frame.pixels);
}

#[test]
fn decode_first_frame_into_writes_at_offset() {
    let (data, frame) = single_frame_container();
    let mut destination = FrameBuffer::pinned(12288 + 5);

    let written =
        jxrdecode::decode_first_frame_into(&data, 0, data.len(), &mut destination, 5)
            .expect("decode into");

    assert_eq!(written, 12288);
    assert_eq!(&destination.as_slice()[5..], &frame.pixels[..]);
}

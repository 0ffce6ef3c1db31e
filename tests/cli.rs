//! CLI output-routing tests.
//!
//! The binary keeps stdout machine-readable: the hex dump and status lines
//! are diagnostics on stderr, while `--checksum` and `--json` print to
//! stdout.

use std::{io::Write, process::Command};

use jxrdecode::{ChannelOrder, raw::{self, RawFrame}};

fn fixture_file() -> tempfile::NamedTempFile {
    let frame = RawFrame {
        width: 4,
        height: 4,
        bytes_per_pixel: 3,
        pixels: vec![0xab; 48],
    };
    let data = raw::write_container(raw::FORMAT_24BPP_RGB, ChannelOrder::Rgb, &[frame])
        .expect("fixture container");
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&data).expect("write fixture");
    file
}

#[test]
fn hex_dump_goes_to_stderr() {
    let input = fixture_file();
    let output = Command::new(env!("CARGO_BIN_EXE_jxrdecode"))
        .arg(input.path())
        .output()
        .expect("run binary");

    assert!(output.status.success());
    assert!(
        output.stdout.is_empty(),
        "stdout must stay empty for a plain decode"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("0xabababab"), "hex dump must be on stderr");
}

#[test]
fn checksum_goes_to_stdout() {
    let input = fixture_file();
    let output = Command::new(env!("CARGO_BIN_EXE_jxrdecode"))
        .arg("--checksum")
        .arg(input.path())
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // A lone 16-digit hex checksum.
    assert_eq!(stdout.trim().len(), 16);
    assert!(stdout.trim().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn json_metadata_goes_to_stdout() {
    let input = fixture_file();
    let output = Command::new(env!("CARGO_BIN_EXE_jxrdecode"))
        .arg("--json")
        .arg(input.path())
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout must be valid JSON");
    assert_eq!(value["width"], 4);
    assert_eq!(value["frameCount"], 1);
}

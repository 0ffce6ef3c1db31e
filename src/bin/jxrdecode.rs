use std::{
    io::Read,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jxrdecode::{ImageDestination, JxrError, JxrImage};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  jxrdecode input.jxr\n  jxrdecode --in-memory input.jxr output.bmp\n  jxrdecode --json input.jxr\n  cat input.jxr | jxrdecode --checksum";

#[derive(Debug, Parser)]
#[command(
    name = "jxrdecode",
    version,
    about = "Decode JPEG XR images to raw bytes or transcode them to another container",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Read the input file fully into memory and decode from bytes.
    #[arg(long)]
    in_memory: bool,

    /// Print extra diagnostics (metadata, frame sizes) to stderr.
    #[arg(long)]
    debug: bool,

    /// Print image metadata as JSON instead of decoding.
    #[arg(long)]
    json: bool,

    /// Print a content checksum of the decoded bytes instead of a hex dump.
    #[arg(long)]
    checksum: bool,

    /// Show a progress bar while transcoding multi-frame images.
    #[arg(long)]
    progress: bool,

    /// Input image path. Reads from standard input when omitted.
    input: Option<PathBuf>,

    /// Output path; the extension selects the container format.
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), JxrError> {
    let mut image = match &cli.input {
        None => {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data)?;
            eprintln!("Opened decoder for {} bytes from stdin", data.len());
            JxrImage::from_bytes(&data)?
        }
        Some(path) if cli.in_memory => {
            let data = std::fs::read(path)?;
            let image = JxrImage::from_bytes(&data)?;
            eprintln!(
                "Opened in-memory decoder for file: {}",
                path.display().to_string().cyan()
            );
            image
        }
        Some(path) => {
            let image = JxrImage::open(path)?;
            eprintln!(
                "Opened decoder for file: {}",
                path.display().to_string().cyan()
            );
            image
        }
    };

    if cli.debug {
        print_diagnostics(&mut image)?;
    }

    finish(cli, image, cli.output.as_deref())
}

/// Decode-and-dump or transcode, depending on whether an output was given.
fn finish(cli: &Cli, mut image: JxrImage, output: Option<&Path>) -> Result<(), JxrError> {
    if cli.json {
        print_metadata_json(&image);
        return Ok(());
    }

    match output {
        Some(path) => transcode_with_progress(cli, &mut image, path),
        None => {
            let decoded = image.decode_all()?;
            if cli.checksum {
                println!("{:016x}", fnv1a64(&decoded));
            } else {
                eprintln!("Decoded bytes:");
                print_bytes(&decoded);
            }
            Ok(())
        }
    }
}

fn transcode_with_progress(cli: &Cli, image: &mut JxrImage, path: &Path) -> Result<(), JxrError> {
    let frame_count = image.frame_count();
    if cli.progress && frame_count > 1 {
        let bar = ProgressBar::new(frame_count);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} frames")
                .expect("static progress template is valid"),
        );
        for frame_index in 0..frame_count {
            let _ = image.decode_frame_to(frame_index, ImageDestination::File(path))?;
            bar.inc(1);
        }
        bar.finish();
    } else {
        image.transcode_to(path)?;
    }
    eprintln!(
        "{} {}",
        "Wrote".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn print_diagnostics(image: &mut JxrImage) -> Result<(), JxrError> {
    let metadata = image.metadata().clone();
    eprintln!(
        "{} {}x{} pixels, {} bytes/pixel, channel order {:?}, pixel format {}",
        "Metadata:".bold(),
        metadata.width,
        metadata.height,
        metadata.bytes_per_pixel,
        metadata.channel_order,
        metadata.pixel_format,
    );
    for frame_index in 0..image.frame_count() {
        let size = image.frame_size(frame_index)?;
        eprintln!("  frame {frame_index}: {size} bytes");
    }
    Ok(())
}

fn print_metadata_json(image: &JxrImage) {
    let metadata = image.metadata();
    let channel_order = match metadata.channel_order {
        jxrdecode::ChannelOrder::Rgb => "rgb",
        jxrdecode::ChannelOrder::Bgr => "bgr",
    };
    let value = json!({
        "width": metadata.width,
        "height": metadata.height,
        "bytesPerPixel": metadata.bytes_per_pixel,
        "pixelFormat": metadata.pixel_format.to_string(),
        "channelOrder": channel_order,
        "frameCount": metadata.frame_count,
    });
    println!("{value:#}");
}

/// Hex dump in the historical format: 4-byte groups, 10 groups per line,
/// zero-padded tail. Diagnostic output, so it goes to stderr; stdout is
/// reserved for machine-readable output (`--json`, `--checksum`).
fn print_bytes(bytes: &[u8]) {
    let mut line = String::new();
    for (group_index, group) in bytes.chunks(4).enumerate() {
        let mut word = [0u8; 4];
        word[..group.len()].copy_from_slice(group);
        line.push_str(&format!(
            "0x{:02x}{:02x}{:02x}{:02x}",
            word[0], word[1], word[2], word[3]
        ));
        if (group_index + 1) % 10 == 0 {
            eprintln!("{line}");
            line.clear();
        } else {
            line.push(' ');
        }
    }
    if !line.is_empty() {
        eprintln!("{}", line.trim_end());
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

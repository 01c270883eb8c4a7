//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Encode
//!
//! ```text
//! 001 dawn.jpg
//!     Header: rgb8; jpeg compressed bgr8
//!     640x480, 900.0 KiB → 48.1 KiB (1:18.71)
//!     Payload: out/dawn.jpeg
//! 002 broken.png
//!     Error: Image error: ...
//!
//! Encoded 1 frame, 1 failed: 900.0 KiB → 48.1 KiB (1:18.71)
//! ```
//!
//! ## Inspect
//!
//! ```text
//! Tagged header
//!     Original: rgb8 (8-bit, 3 channels, color)
//!     Codec: jpeg
//!     Target: bgr8 (8-bit, 3 channels, color)
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchSummary, EncodeEvent};
use crate::descriptor::FormatDescriptor;
use crate::encoder::compression_ratio;
use crate::encoding;
use crate::types::RawImage;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn format_sizes(raw: usize, compressed: usize) -> String {
    format!(
        "{} \u{2192} {} (1:{:.2})",
        format_bytes(raw),
        format_bytes(compressed),
        compression_ratio(raw, compressed)
    )
}

/// Describe an encoding name: `rgb8 (8-bit, 3 channels, color)`.
fn describe_encoding(name: &str) -> String {
    match (encoding::bit_depth(name), encoding::num_channels(name)) {
        (Some(bits), Some(channels)) => {
            let kind = if encoding::is_color(name) { "color" } else { "no color semantics" };
            let plural = if channels == 1 { "" } else { "s" };
            format!("{name} ({bits}-bit, {channels} channel{plural}, {kind})")
        }
        _ => format!("{name} (unknown encoding)"),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Encode
// ============================================================================

/// Format a single encode progress event as display lines.
pub fn format_encode_event(event: &EncodeEvent) -> Vec<String> {
    match event {
        EncodeEvent::Encoded(file) => vec![
            format!("{} {}", format_index(file.index), file_name(&file.source)),
            format!("{}Header: {}", indent(1), file.header),
            format!(
                "{}{}x{}, {}",
                indent(1),
                file.width,
                file.height,
                format_sizes(file.raw_bytes, file.compressed_bytes)
            ),
            format!("{}Payload: {}", indent(1), file.payload_path.display()),
        ],
        EncodeEvent::Failed {
            index,
            source,
            error,
        } => vec![
            format!("{} {}", format_index(*index), file_name(source)),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let frames = if summary.encoded == 1 { "frame" } else { "frames" };
    let mut line = format!("Encoded {} {frames}", summary.encoded);
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    if summary.encoded > 0 {
        line.push_str(&format!(
            ": {}",
            format_sizes(summary.raw_bytes, summary.compressed_bytes)
        ));
    }
    vec![String::new(), line]
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Decode / inspect
// ============================================================================

pub fn format_descriptor(descriptor: &FormatDescriptor) -> Vec<String> {
    match descriptor {
        FormatDescriptor::Tagged(d) => {
            let mut lines = vec![
                "Tagged header".to_string(),
                format!("{}Original: {}", indent(1), describe_encoding(&d.original_encoding)),
                format!("{}Codec: {}", indent(1), d.codec.token()),
            ];
            if let Some(target) = &d.target_encoding {
                lines.push(format!("{}Target: {}", indent(1), describe_encoding(target)));
            }
            lines
        }
        FormatDescriptor::Legacy { header } => vec![
            "Legacy header".to_string(),
            format!("{}Text: {:?}", indent(1), header),
            format!("{}Layout inferred from decoded data (mono or bgr)", indent(1)),
        ],
    }
}

pub fn print_descriptor(descriptor: &FormatDescriptor) {
    for line in format_descriptor(descriptor) {
        println!("{}", line);
    }
}

pub fn format_decoded_frame(frame: &RawImage, output: &Path) -> Vec<String> {
    vec![format!(
        "Decoded {}x{} {} \u{2192} {}",
        frame.width(),
        frame.height(),
        describe_encoding(frame.encoding()),
        output.display()
    )]
}

pub fn print_decoded_frame(frame: &RawImage, output: &Path) {
    for line in format_decoded_frame(frame, output) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::EncodedFile;
    use crate::descriptor::{self, CodecTag};
    use std::path::PathBuf;

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_is_four_spaces_per_level() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn describe_known_and_unknown_encodings() {
        assert_eq!(describe_encoding("rgb8"), "rgb8 (8-bit, 3 channels, color)");
        assert_eq!(
            describe_encoding("16UC1"),
            "16UC1 (16-bit, 1 channel, no color semantics)"
        );
        assert_eq!(describe_encoding("yuv422"), "yuv422 (unknown encoding)");
    }

    #[test]
    fn format_encoded_event() {
        let event = EncodeEvent::Encoded(EncodedFile {
            index: 1,
            source: PathBuf::from("in/dawn.jpg"),
            payload_path: PathBuf::from("out/dawn.jpeg"),
            width: 4,
            height: 2,
            header: "rgb8; jpeg compressed bgr8".into(),
            raw_bytes: 24,
            compressed_bytes: 12,
        });
        let lines = format_encode_event(&event);
        assert_eq!(lines[0], "001 dawn.jpg");
        assert_eq!(lines[1], "    Header: rgb8; jpeg compressed bgr8");
        assert_eq!(lines[2], "    4x2, 24 B \u{2192} 12 B (1:2.00)");
        assert_eq!(lines[3], "    Payload: out/dawn.jpeg");
    }

    #[test]
    fn format_failed_event() {
        let event = EncodeEvent::Failed {
            index: 3,
            source: PathBuf::from("broken.png"),
            error: "boom".into(),
        };
        assert_eq!(format_encode_event(&event), vec!["003 broken.png", "    Error: boom"]);
    }

    #[test]
    fn batch_summary_mentions_failures() {
        let summary = BatchSummary {
            encoded: 1,
            failed: 2,
            raw_bytes: 100,
            compressed_bytes: 50,
        };
        assert_eq!(
            format_batch_summary(&summary)[1],
            "Encoded 1 frame, 2 failed: 100 B \u{2192} 50 B (1:2.00)"
        );
    }

    #[test]
    fn batch_summary_with_nothing_encoded() {
        let summary = BatchSummary {
            failed: 1,
            ..BatchSummary::default()
        };
        assert_eq!(format_batch_summary(&summary)[1], "Encoded 0 frames, 1 failed");
    }

    #[test]
    fn format_tagged_descriptor() {
        let parsed = descriptor::parse(&descriptor::serialize("rgba16", CodecTag::Png, Some("bgr16"))).unwrap();
        let lines = format_descriptor(&parsed);
        assert_eq!(lines[0], "Tagged header");
        assert_eq!(lines[1], "    Original: rgba16 (16-bit, 4 channels, color)");
        assert_eq!(lines[2], "    Codec: png");
        assert_eq!(lines[3], "    Target: bgr16 (16-bit, 3 channels, color)");
    }

    #[test]
    fn format_legacy_descriptor() {
        let lines = format_descriptor(&FormatDescriptor::Legacy {
            header: "bgr8".into(),
        });
        assert_eq!(lines[0], "Legacy header");
        assert_eq!(lines[1], "    Text: \"bgr8\"");
    }

    #[test]
    fn format_decoded_frame_line() {
        let frame = RawImage::new(2, 1, "mono8", vec![0, 0]).unwrap();
        assert_eq!(
            format_decoded_frame(&frame, Path::new("x.png")),
            vec!["Decoded 2x1 mono8 (8-bit, 1 channel, no color semantics) \u{2192} x.png"]
        );
    }
}

//! Batch encoding and decoding of image files for the CLI.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── dawn.jpeg     # codec payload (extension = codec name)
//! ├── dawn.format   # format header, e.g. "rgb8; jpeg compressed bgr8"
//! └── ...
//! ```
//!
//! A `.format` file next to a payload is all a decoder needs. A payload
//! without one is treated as a legacy payload.
//!
//! Inputs sharing a file stem (`x/dawn.png`, `y/dawn.tiff`) get their
//! 1-based input position appended: `dawn-001.jpeg`, `dawn-002.jpeg`.
//!
//! ## Parallel Processing
//!
//! Files are encoded in parallel using [rayon](https://docs.rs/rayon).
//! Progress is reported through an optional channel so the CLI can print
//! while workers run.

use crate::codecs::CodecId;
use crate::decoder::Subscriber;
use crate::encoder::Publisher;
use crate::error::TransportError;
use crate::frames::{self, FrameFileError};
use crate::types::{EncodedPayload, RawImage};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Extension of the header file written next to each payload.
pub const HEADER_EXTENSION: &str = "format";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    File(#[from] FrameFileError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// One encoded input file.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFile {
    /// 1-based position in the input list.
    pub index: usize,
    pub source: PathBuf,
    pub payload_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub header: String,
    pub raw_bytes: usize,
    pub compressed_bytes: usize,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeEvent {
    Encoded(EncodedFile),
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub encoded: usize,
    pub failed: usize,
    pub raw_bytes: usize,
    pub compressed_bytes: usize,
}

/// Encode every input as a frame of `encoding` with the publisher's codec.
///
/// Per-file failures are reported as [`EncodeEvent::Failed`] and counted,
/// not returned; only failing to create `out_dir` aborts the batch.
pub fn encode_files(
    inputs: &[PathBuf],
    encoding: &str,
    out_dir: &Path,
    publisher: &Publisher,
    events: Option<Sender<EncodeEvent>>,
) -> Result<BatchSummary, BatchError> {
    fs::create_dir_all(out_dir)?;
    let extension = CodecId::from_name(&publisher.config().format).name();
    let stems = payload_stems(inputs);

    let results: Vec<Result<EncodedFile, ()>> = inputs
        .par_iter()
        .zip(stems.par_iter())
        .enumerate()
        .map(|(i, (source, stem))| {
            let index = i + 1;
            let payload_path = out_dir.join(format!("{stem}.{extension}"));
            let event = match encode_file(index, source, encoding, payload_path, publisher) {
                Ok(file) => EncodeEvent::Encoded(file),
                Err(err) => EncodeEvent::Failed {
                    index,
                    source: source.clone(),
                    error: err.to_string(),
                },
            };
            if let Some(tx) = &events {
                // Receiver gone just means nobody is listening.
                let _ = tx.send(event.clone());
            }
            match event {
                EncodeEvent::Encoded(file) => Ok(file),
                EncodeEvent::Failed { .. } => Err(()),
            }
        })
        .collect();

    let mut summary = BatchSummary::default();
    for result in results {
        match result {
            Ok(file) => {
                summary.encoded += 1;
                summary.raw_bytes += file.raw_bytes;
                summary.compressed_bytes += file.compressed_bytes;
            }
            Err(()) => summary.failed += 1,
        }
    }
    Ok(summary)
}

/// Output file stem for every input, unique within the batch.
fn payload_stems(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<Option<String>> = inputs
        .iter()
        .map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in stems.iter().flatten() {
        *counts.entry(stem.as_str()).or_default() += 1;
    }
    let mut taken: HashSet<String> = stems
        .iter()
        .flatten()
        .filter(|stem| counts[stem.as_str()] == 1)
        .cloned()
        .collect();

    stems
        .iter()
        .enumerate()
        .map(|(i, stem)| match stem {
            Some(stem) if counts[stem.as_str()] == 1 => stem.clone(),
            other => {
                let base = other.as_deref().unwrap_or("frame");
                let mut name = format!("{base}-{}", format_index(i + 1));
                while taken.contains(&name) {
                    name = format!("{name}-{}", format_index(i + 1));
                }
                taken.insert(name.clone());
                name
            }
        })
        .collect()
}

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn encode_file(
    index: usize,
    source: &Path,
    encoding: &str,
    payload_path: PathBuf,
    publisher: &Publisher,
) -> Result<EncodedFile, BatchError> {
    let frame = frames::load_frame(source, encoding)?;
    let payload = publisher.encode(&frame)?;
    write_payload(&payload, &payload_path)?;

    Ok(EncodedFile {
        index,
        source: source.to_path_buf(),
        payload_path,
        width: frame.width(),
        height: frame.height(),
        header: payload.format,
        raw_bytes: frame.row_bytes() * frame.height() as usize,
        compressed_bytes: payload.data.len(),
    })
}

/// Write payload bytes to `path` and the header next to it.
pub fn write_payload(payload: &EncodedPayload, path: &Path) -> Result<(), BatchError> {
    fs::write(path, &payload.data)?;
    fs::write(path.with_extension(HEADER_EXTENSION), &payload.format)?;
    Ok(())
}

/// Read a payload, taking the header from `header` or the sibling `.format`
/// file. Without either, the header is empty and the payload is legacy.
pub fn read_payload(path: &Path, header: Option<&str>) -> Result<EncodedPayload, BatchError> {
    let data = fs::read(path)?;
    let format = match header {
        Some(header) => header.to_string(),
        None => {
            let header_path = path.with_extension(HEADER_EXTENSION);
            if header_path.exists() {
                fs::read_to_string(header_path)?.trim_end_matches(['\r', '\n']).to_string()
            } else {
                String::new()
            }
        }
    };
    Ok(EncodedPayload::new(format, data))
}

/// Decode a payload file and save the frame as an image.
pub fn decode_file(
    payload_path: &Path,
    header: Option<&str>,
    output: &Path,
    subscriber: &Subscriber,
) -> Result<RawImage, BatchError> {
    let payload = read_payload(payload_path, header)?;
    let frame = subscriber.decode(&payload)?;
    frames::save_frame(&frame, output)?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;
    use crate::encoding::ColorLayout;
    use crate::test_helpers::{assert_same_frame, gradient_image};
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn write_source(dir: &Path, name: &str, layout: ColorLayout) -> (PathBuf, RawImage) {
        let frame = gradient_image(layout, 6, 4);
        let path = dir.join(name);
        frames::save_frame(&frame, &path).unwrap();
        (path, frame)
    }

    #[test]
    fn encode_files_writes_payload_and_header() {
        let tmp = TempDir::new().unwrap();
        let (source, _) = write_source(tmp.path(), "a.png", ColorLayout::RGB8);
        let out = tmp.path().join("out");
        let publisher = Publisher::new(TransportConfig::with_format("png"));

        let summary = encode_files(&[source], "rgb8", &out, &publisher, None).unwrap();

        assert_eq!(summary.encoded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.raw_bytes, 6 * 4 * 3);
        assert!(out.join("a.png").exists());
        assert_eq!(
            fs::read_to_string(out.join("a.format")).unwrap(),
            "rgb8; png compressed bgr8"
        );
    }

    #[test]
    fn failures_are_counted_and_reported() {
        let tmp = TempDir::new().unwrap();
        let (good, _) = write_source(tmp.path(), "good.png", ColorLayout::RGB8);
        let missing = tmp.path().join("missing.png");
        let publisher = Publisher::new(TransportConfig::with_format("qoi"));
        let (tx, rx) = mpsc::channel();

        let summary =
            encode_files(&[good, missing], "rgb8", &tmp.path().join("out"), &publisher, Some(tx))
                .unwrap();

        assert_eq!((summary.encoded, summary.failed), (1, 1));
        let events: Vec<EncodeEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| matches!(e, EncodeEvent::Failed { index: 2, .. })));
    }

    #[test]
    fn encoded_files_decode_back() {
        let tmp = TempDir::new().unwrap();
        let (source, original) = write_source(tmp.path(), "frame.png", ColorLayout::BGRA8);
        let out = tmp.path().join("out");
        let publisher = Publisher::new(TransportConfig::with_format("qoi"));
        encode_files(&[source], "bgra8", &out, &publisher, None).unwrap();

        let decoded_path = tmp.path().join("decoded.png");
        let frame = decode_file(
            &out.join("frame.qoi"),
            None,
            &decoded_path,
            &Subscriber::default(),
        )
        .unwrap();

        assert_same_frame(&frame, &original);
        assert!(decoded_path.exists());
    }

    #[test]
    fn same_stem_inputs_get_distinct_payloads() {
        let tmp = TempDir::new().unwrap();
        let (x, y) = (tmp.path().join("x"), tmp.path().join("y"));
        fs::create_dir_all(&x).unwrap();
        fs::create_dir_all(&y).unwrap();
        let small = gradient_image(ColorLayout::RGB8, 2, 2);
        let large = gradient_image(ColorLayout::RGB8, 3, 3);
        frames::save_frame(&small, &x.join("dawn.png")).unwrap();
        frames::save_frame(&large, &y.join("dawn.png")).unwrap();
        let out = tmp.path().join("out");
        let publisher = Publisher::new(TransportConfig::with_format("png"));

        let summary = encode_files(
            &[x.join("dawn.png"), y.join("dawn.png")],
            "rgb8",
            &out,
            &publisher,
            None,
        )
        .unwrap();

        assert_eq!(summary.encoded, 2);
        assert!(!out.join("dawn.png").exists());
        let subscriber = Subscriber::default();
        for (name, expected) in [("dawn-001", &small), ("dawn-002", &large)] {
            let payload_path = out.join(format!("{name}.png"));
            let decoded =
                decode_file(&payload_path, None, &tmp.path().join(format!("{name}.out.png")), &subscriber)
                    .unwrap();
            assert_same_frame(&decoded, expected);
        }
    }

    #[test]
    fn payload_stems_suffix_only_collisions() {
        let inputs = [
            PathBuf::from("a/dawn.png"),
            PathBuf::from("dusk.jpg"),
            PathBuf::from("b/dawn.tiff"),
        ];
        assert_eq!(payload_stems(&inputs), vec!["dawn-001", "dusk", "dawn-003"]);
    }

    #[test]
    fn payload_stems_avoid_existing_names() {
        let inputs = [
            PathBuf::from("dawn-001.png"),
            PathBuf::from("a/dawn.png"),
            PathBuf::from("b/dawn.png"),
        ];
        assert_eq!(
            payload_stems(&inputs),
            vec!["dawn-001", "dawn-002", "dawn-003"]
        );
    }

    #[test]
    fn read_payload_without_header_file_is_legacy() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("old.bin");
        fs::write(&path, [1, 2, 3]).unwrap();

        let payload = read_payload(&path, None).unwrap();
        assert_eq!(payload.format, "");
        assert_eq!(payload.data, vec![1, 2, 3]);
    }

    #[test]
    fn explicit_header_overrides_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("p.png");
        write_payload(&EncodedPayload::new("mono8; png compressed", vec![9]), &path).unwrap();

        assert_eq!(read_payload(&path, None).unwrap().format, "mono8; png compressed");
        assert_eq!(read_payload(&path, Some("bgr8")).unwrap().format, "bgr8");
    }
}

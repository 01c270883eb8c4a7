//! Shared test utilities for the transport test suite.
//!
//! Provides deterministic frame fixtures for every color layout and
//! assertions that explain what differs when they fail.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let image = gradient_image(ColorLayout::RGBA16, 8, 4);
//! let payload = encode(&image, &TransportConfig::with_format("png")).unwrap();
//! let decoded = decode(&payload, &TransportConfig::default()).unwrap();
//! assert_same_frame(&decoded, &image);
//! ```

use crate::encoding::{BitDepth, ColorLayout};
use crate::types::RawImage;
use std::io;
use std::sync::{Arc, Mutex};

// =========================================================================
// Fixtures
// =========================================================================

/// Every layout the encoding registry names.
pub const ALL_LAYOUTS: [ColorLayout; 10] = [
    ColorLayout::MONO8,
    ColorLayout::MONO16,
    ColorLayout::RGB8,
    ColorLayout::RGB16,
    ColorLayout::RGBA8,
    ColorLayout::RGBA16,
    ColorLayout::BGR8,
    ColorLayout::BGR16,
    ColorLayout::BGRA8,
    ColorLayout::BGRA16,
];

/// A tightly packed frame whose samples vary with position and channel,
/// so channel swaps and row mix-ups show up as differences.
pub fn gradient_image(layout: ColorLayout, width: u32, height: u32) -> RawImage {
    let channels = layout.channels();
    let mut data = Vec::with_capacity(width as usize * height as usize * layout.bytes_per_pixel());
    for y in 0..height as usize {
        for x in 0..width as usize {
            for c in 0..channels {
                let value = (x * 31 + y * 17 + c * 67) % 256;
                match layout.depth {
                    BitDepth::Eight => data.push(value as u8),
                    BitDepth::Sixteen => {
                        data.extend_from_slice(&((value as u16) * 256 + c as u16 * 13).to_le_bytes())
                    }
                }
            }
        }
    }
    RawImage::new(width, height, layout.name(), data).unwrap()
}

/// A frame filled with one pixel value (samples given at the layout depth).
pub fn solid_image(layout: ColorLayout, width: u32, height: u32, pixel: &[u16]) -> RawImage {
    assert_eq!(pixel.len(), layout.channels(), "pixel does not match {layout}");
    let mut one = Vec::new();
    for &v in pixel {
        match layout.depth {
            BitDepth::Eight => one.push(v as u8),
            BitDepth::Sixteen => one.extend_from_slice(&v.to_le_bytes()),
        }
    }
    RawImage::new(width, height, layout.name(), one.repeat((width * height) as usize)).unwrap()
}

/// Re-lay `image` with `padding` extra bytes at the end of every row.
pub fn with_row_padding(image: &RawImage, padding: usize) -> RawImage {
    let row_bytes = image.row_bytes();
    let stride = row_bytes + padding;
    let mut data = Vec::with_capacity(stride * image.height() as usize);
    for row in image.packed().chunks_exact(row_bytes) {
        data.extend_from_slice(row);
        data.extend(std::iter::repeat_n(0xEE, padding));
    }
    RawImage::from_frame(
        data,
        image.width(),
        image.height(),
        stride,
        image.encoding(),
        image.bit_depth(),
        image.channels(),
    )
    .unwrap()
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert two frames agree on geometry and encoding.
pub fn assert_same_shape(actual: &RawImage, expected: &RawImage) {
    assert_eq!(
        (actual.width(), actual.height()),
        (expected.width(), expected.height()),
        "dimensions differ"
    );
    assert_eq!(actual.encoding(), expected.encoding(), "encoding differs");
    assert_eq!(actual.channels(), expected.channels(), "channel count differs");
    assert_eq!(actual.bit_depth(), expected.bit_depth(), "bit depth differs");
}

/// Assert two frames are identical pixel for pixel (ignoring row padding).
pub fn assert_same_frame(actual: &RawImage, expected: &RawImage) {
    assert_same_shape(actual, expected);
    let (a, e) = (actual.packed(), expected.packed());
    if let Some(i) = a.iter().zip(e.iter()).position(|(x, y)| x != y) {
        panic!(
            "{} frame differs at byte {i} (pixel {}): got {}, expected {}",
            expected.encoding(),
            i / expected.bytes_per_pixel().max(1),
            a[i],
            e[i]
        );
    }
}

/// Assert every 8-bit-scaled sample is within `tolerance` of the expected
/// frame. Sixteen-bit samples are compared by their high byte.
pub fn assert_close_frame(actual: &RawImage, expected: &RawImage, tolerance: u8) {
    assert_same_shape(actual, expected);
    let high_bytes = |image: &RawImage| -> Vec<u8> {
        let packed = image.packed();
        if image.bit_depth() == 16 {
            packed.chunks_exact(2).map(|s| s[1]).collect()
        } else {
            packed.into_owned()
        }
    };
    let (a, e) = (high_bytes(actual), high_bytes(expected));
    let worst = a
        .iter()
        .zip(&e)
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0);
    assert!(
        worst <= tolerance,
        "{} frame off by up to {worst} (tolerance {tolerance})",
        expected.encoding()
    );
}

// =========================================================================
// Logs
// =========================================================================

#[derive(Clone)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber installed on this thread and
/// return its result along with everything it logged.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer(Arc::new(Mutex::new(Vec::new())));
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_has_layout_geometry() {
        for layout in ALL_LAYOUTS {
            let image = gradient_image(layout, 5, 3);
            assert_eq!(image.layout(), Some(layout));
            assert_eq!(image.data().len(), 15 * layout.bytes_per_pixel());
        }
    }

    #[test]
    fn padding_is_invisible_to_packed() {
        let image = gradient_image(ColorLayout::BGR8, 3, 2);
        let padded = with_row_padding(&image, 5);
        assert_eq!(padded.stride(), 14);
        assert_same_frame(&padded, &image);
    }

    #[test]
    fn capture_logs_collects_events() {
        let (value, logs) = capture_logs(|| {
            tracing::warn!(frames = 3, "Slow receiver");
            7
        });
        assert_eq!(value, 7);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Slow receiver frames=3"), "{logs}");
    }

    #[test]
    #[should_panic(expected = "differs at byte")]
    fn same_frame_reports_first_difference() {
        let a = solid_image(ColorLayout::MONO8, 2, 1, &[1]);
        let b = solid_image(ColorLayout::MONO8, 2, 1, &[2]);
        assert_same_frame(&a, &b);
    }
}

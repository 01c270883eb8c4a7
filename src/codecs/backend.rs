//! Codec trait and the pixel types codecs exchange.
//!
//! Every adapter implements [`Codec`]: encode a tightly packed
//! [`PixelBuffer`] into a codec-native stream, decode such a stream back
//! into pixels plus the [`ColorLayout`] those pixels are in. What layout an
//! adapter expects on input is declared in the
//! [registry table](super::registry), not here.
//!
//! JPEG and PNG follow the convention of the classic imaging stacks: color
//! pixels cross this trait blue-first (BGR/BGRA), and the adapters swap to
//! the stream's RGB order internally. QOI exchanges RGB/RGBA.

use super::registry::CodecId;
use crate::color;
use crate::encoding::{BitDepth, ColorLayout};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{codec} requires 8 or 16-bit samples, got {bit_depth}-bit")]
    UnsupportedBitDepth { codec: &'static str, bit_depth: u8 },
    #[error("{codec} cannot handle {channels}-channel pixels")]
    UnsupportedChannelCount {
        codec: &'static str,
        channels: usize,
    },
    #[error("{codec} encode failed: {reason}")]
    EncodeFailed { codec: &'static str, reason: String },
    #[error("{codec} decode failed: {reason}")]
    DecodeFailed { codec: &'static str, reason: String },
}

/// Tightly packed interleaved pixels (no row padding). Sixteen-bit samples
/// are little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub bit_depth: u8,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels * usize::from(self.bit_depth).div_ceil(8)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sample depth as a [`BitDepth`], if it is one the layouts know.
    pub fn depth(&self) -> Option<BitDepth> {
        BitDepth::from_bits(self.bit_depth)
    }
}

/// Output of [`Codec::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub pixels: PixelBuffer,
    /// The codec's native layout for these pixels. `None` for channel
    /// counts without color semantics (gray + alpha).
    pub layout: Option<ColorLayout>,
}

/// A codec the transport can dispatch to.
///
/// Adapters carry their own parameters (built from one configuration
/// snapshot), so `encode` and `decode` take only pixels and bytes.
pub trait Codec: Send + Sync {
    fn id(&self) -> CodecId;

    /// Encode packed pixels into a codec-native stream.
    fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError>;

    /// Decode a codec-native stream.
    fn decode(&self, data: &[u8]) -> Result<Decoded, CodecError>;
}

/// Reject sample depths other than 8 and 16.
pub(crate) fn check_depth(codec: &'static str, bit_depth: u8) -> Result<BitDepth, CodecError> {
    BitDepth::from_bits(bit_depth).ok_or(CodecError::UnsupportedBitDepth { codec, bit_depth })
}

/// Decode a self-describing image container into BGR-first pixels.
///
/// With `format = None` the container is recognized by its signature bytes
/// (JPEG, PNG or QOI), which is how legacy payloads without a descriptor are
/// read.
pub(crate) fn decode_container(
    codec: &'static str,
    data: &[u8],
    format: Option<ImageFormat>,
) -> Result<PixelBuffer, CodecError> {
    let decoded = match format {
        Some(format) => image::load_from_memory_with_format(data, format),
        None => image::load_from_memory(data),
    }
    .map_err(|e| CodecError::DecodeFailed {
        codec,
        reason: e.to_string(),
    })?;
    Ok(bgr_pixels_from_dynamic(decoded))
}

/// Unpack a decoded image, swapping color pixels to blue-first order.
fn bgr_pixels_from_dynamic(image: DynamicImage) -> PixelBuffer {
    let (width, height) = (image.width(), image.height());
    let (channels, bit_depth, data) = match image {
        DynamicImage::ImageLuma8(buf) => (1, 8, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (2, 8, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, 8, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, 8, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => (1, 16, color::samples_to_le(&buf.into_raw())),
        DynamicImage::ImageLumaA16(buf) => (2, 16, color::samples_to_le(&buf.into_raw())),
        DynamicImage::ImageRgb16(buf) => (3, 16, color::samples_to_le(&buf.into_raw())),
        DynamicImage::ImageRgba16(buf) => (4, 16, color::samples_to_le(&buf.into_raw())),
        // Float and future variants
        other => (4, 16, color::samples_to_le(&other.to_rgba16().into_raw())),
    };
    let mut pixels = PixelBuffer {
        width,
        height,
        channels,
        bit_depth,
        data,
    };
    if channels >= 3 {
        color::swap_red_blue(&mut pixels);
    }
    pixels
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock codec that records what it was handed and replays canned output.
    ///
    /// `encode` stores the pixels and returns their bytes verbatim; `decode`
    /// pops the next queued result.
    pub struct MockCodec {
        pub id: CodecId,
        pub encoded: Mutex<Vec<PixelBuffer>>,
        pub decode_results: Mutex<Vec<Result<Decoded, CodecError>>>,
    }

    impl MockCodec {
        pub fn new(id: CodecId) -> Self {
            Self {
                id,
                encoded: Mutex::new(Vec::new()),
                decode_results: Mutex::new(Vec::new()),
            }
        }

        pub fn with_decoded(id: CodecId, decoded: Decoded) -> Self {
            let mock = Self::new(id);
            mock.decode_results.lock().unwrap().push(Ok(decoded));
            mock
        }

        pub fn encoded_pixels(&self) -> Vec<PixelBuffer> {
            self.encoded.lock().unwrap().clone()
        }
    }

    impl Codec for MockCodec {
        fn id(&self) -> CodecId {
            self.id
        }

        fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
            self.encoded.lock().unwrap().push(pixels.clone());
            Ok(pixels.data.clone())
        }

        fn decode(&self, _data: &[u8]) -> Result<Decoded, CodecError> {
            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| {
                    Err(CodecError::DecodeFailed {
                        codec: "mock",
                        reason: "no queued result".into(),
                    })
                })
        }
    }

    #[test]
    fn mock_records_encoded_pixels() {
        let mock = MockCodec::new(CodecId::Png);
        let pixels = PixelBuffer {
            width: 1,
            height: 1,
            channels: 3,
            bit_depth: 8,
            data: vec![1, 2, 3],
        };

        let bytes = mock.encode(&pixels).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(mock.encoded_pixels(), vec![pixels]);
    }

    #[test]
    fn mock_decode_without_queue_fails() {
        let mock = MockCodec::new(CodecId::Jpeg);
        assert!(matches!(
            mock.decode(&[]),
            Err(CodecError::DecodeFailed { .. })
        ));
    }

    #[test]
    fn check_depth_accepts_8_and_16_only() {
        assert_eq!(check_depth("png", 8), Ok(BitDepth::Eight));
        assert_eq!(check_depth("png", 16), Ok(BitDepth::Sixteen));
        assert_eq!(
            check_depth("png", 32),
            Err(CodecError::UnsupportedBitDepth {
                codec: "png",
                bit_depth: 32
            })
        );
    }

    #[test]
    fn container_decode_swaps_to_bgr() {
        let rgb = image::RgbImage::from_raw(1, 1, vec![10, 20, 30]).unwrap();
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let pixels = decode_container("png", &png, None).unwrap();
        assert_eq!(pixels.channels, 3);
        assert_eq!(pixels.data, vec![30, 20, 10]);
    }

    #[test]
    fn container_decode_rejects_garbage() {
        let result = decode_container("image", b"not an image", None);
        assert!(matches!(result, Err(CodecError::DecodeFailed { .. })));
    }
}

//! PNG adapter, on top of the `image` crate's PNG codec.
//!
//! Lossless at 8 and 16 bits with one to four channels. Color pixels arrive
//! blue-first and are swapped to PNG's red-first order here; decoding swaps
//! them back.

use super::backend::{self, Codec, CodecError, Decoded, PixelBuffer};
use super::params::PngParams;
use super::registry::{self, CodecId};
use crate::color;
use crate::encoding::BitDepth;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use std::borrow::Cow;

const NAME: &str = "png";

#[derive(Debug, Clone, Default)]
pub struct PngCodec {
    params: PngParams,
}

impl PngCodec {
    pub fn new(params: PngParams) -> Self {
        Self { params }
    }

    /// Map the 0–9 level onto the encoder's compression presets.
    fn compression(&self) -> CompressionType {
        match self.params.level.value() {
            0..=3 => CompressionType::Fast,
            4..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }
}

impl Codec for PngCodec {
    fn id(&self) -> CodecId {
        CodecId::Png
    }

    fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let depth = backend::check_depth(NAME, pixels.bit_depth)?;
        let color_type = match (pixels.channels, depth) {
            (1, BitDepth::Eight) => ExtendedColorType::L8,
            (2, BitDepth::Eight) => ExtendedColorType::La8,
            (3, BitDepth::Eight) => ExtendedColorType::Rgb8,
            (4, BitDepth::Eight) => ExtendedColorType::Rgba8,
            (1, BitDepth::Sixteen) => ExtendedColorType::L16,
            (2, BitDepth::Sixteen) => ExtendedColorType::La16,
            (3, BitDepth::Sixteen) => ExtendedColorType::Rgb16,
            (4, BitDepth::Sixteen) => ExtendedColorType::Rgba16,
            (channels, _) => {
                return Err(CodecError::UnsupportedChannelCount {
                    codec: NAME,
                    channels,
                });
            }
        };

        let mut rgb = Cow::Borrowed(pixels);
        if pixels.channels >= 3 {
            color::swap_red_blue(rgb.to_mut());
        }
        let samples = match depth {
            BitDepth::Eight => Cow::Borrowed(rgb.data.as_slice()),
            BitDepth::Sixteen => Cow::Owned(color::le_to_native(&rgb.data)),
        };

        let mut out = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut out, self.compression(), FilterType::Adaptive);
        encoder
            .write_image(&samples, pixels.width, pixels.height, color_type)
            .map_err(|e| CodecError::EncodeFailed {
                codec: NAME,
                reason: e.to_string(),
            })?;
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Decoded, CodecError> {
        let pixels = backend::decode_container(NAME, data, Some(ImageFormat::Png))?;
        let layout = registry::rule(CodecId::Png)
            .zip(pixels.depth())
            .and_then(|(rule, depth)| rule.native_layout(pixels.channels, depth));
        Ok(Decoded { pixels, layout })
    }
}

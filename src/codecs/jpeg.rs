//! JPEG adapter.
//!
//! Encoding goes through `jpeg-encoder`, which exposes the knobs the
//! transport configures: quality, progressive scans, optimized Huffman
//! tables and restart markers. It reads blue-first input directly, so
//! no channel swap happens on the way in.
//!
//! JPEG has no 16-bit baseline mode. Sixteen-bit input is reduced to its
//! high byte; the decoder widens it back when the original encoding asks
//! for 16 bits.

use super::backend::{self, Codec, CodecError, Decoded, PixelBuffer};
use super::params::JpegParams;
use super::registry::{self, CodecId};
use crate::color;
use crate::encoding::BitDepth;
use image::ImageFormat;
use jpeg_encoder::{ColorType, Encoder};
use std::borrow::Cow;

const NAME: &str = "jpeg";

#[derive(Debug, Clone, Default)]
pub struct JpegCodec {
    params: JpegParams,
}

impl JpegCodec {
    pub fn new(params: JpegParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &JpegParams {
        &self.params
    }
}

impl Codec for JpegCodec {
    fn id(&self) -> CodecId {
        CodecId::Jpeg
    }

    fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let depth = backend::check_depth(NAME, pixels.bit_depth)?;
        let color_type = match pixels.channels {
            1 => ColorType::Luma,
            3 => ColorType::Bgr,
            4 => ColorType::Bgra,
            channels => {
                return Err(CodecError::UnsupportedChannelCount {
                    codec: NAME,
                    channels,
                });
            }
        };
        let (Ok(width), Ok(height)) = (u16::try_from(pixels.width), u16::try_from(pixels.height))
        else {
            return Err(CodecError::EncodeFailed {
                codec: NAME,
                reason: format!(
                    "{}x{} exceeds the 65535 px JPEG limit",
                    pixels.width, pixels.height
                ),
            });
        };

        let samples = match depth {
            BitDepth::Eight => Cow::Borrowed(pixels.data.as_slice()),
            BitDepth::Sixteen => Cow::Owned(color::narrow_samples(&pixels.data)),
        };

        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, self.params.quality.value());
        encoder.set_progressive(self.params.progressive);
        encoder.set_optimized_huffman_tables(self.params.optimize);
        if self.params.restart_interval > 0 {
            encoder.set_restart_interval(self.params.restart_interval);
        }
        encoder
            .encode(&samples, width, height, color_type)
            .map_err(|e| CodecError::EncodeFailed {
                codec: NAME,
                reason: e.to_string(),
            })?;
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Decoded, CodecError> {
        let pixels = backend::decode_container(NAME, data, Some(ImageFormat::Jpeg))?;
        let layout = registry::rule(CodecId::Jpeg)
            .zip(pixels.depth())
            .and_then(|(rule, depth)| rule.native_layout(pixels.channels, depth));
        Ok(Decoded { pixels, layout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::params::Quality;
    use crate::encoding::ColorLayout;

    fn solid(width: u32, height: u32, pixel: &[u8], bit_depth: u8) -> PixelBuffer {
        let channels = if bit_depth == 16 {
            pixel.len() / 2
        } else {
            pixel.len()
        };
        PixelBuffer {
            width,
            height,
            channels,
            bit_depth,
            data: pixel.repeat((width * height) as usize),
        }
    }

    fn close(a: u8, b: u8) -> bool {
        a.abs_diff(b) <= 8
    }

    #[test]
    fn bgr_roundtrip_keeps_channel_order() {
        let codec = JpegCodec::default();
        let input = solid(16, 16, &[200, 100, 50], 8);

        let decoded = codec.decode(&codec.encode(&input).unwrap()).unwrap();

        assert_eq!(decoded.layout, Some(ColorLayout::BGR8));
        assert_eq!((decoded.pixels.width, decoded.pixels.height), (16, 16));
        let px = &decoded.pixels.data[..3];
        assert!(close(px[0], 200) && close(px[1], 100) && close(px[2], 50), "{px:?}");
    }

    #[test]
    fn mono_roundtrip_stays_single_channel() {
        let codec = JpegCodec::default();
        let decoded = codec
            .decode(&codec.encode(&solid(8, 8, &[128], 8)).unwrap())
            .unwrap();
        assert_eq!(decoded.layout, Some(ColorLayout::MONO8));
        assert!(decoded.pixels.data.iter().all(|&v| close(v, 128)));
    }

    #[test]
    fn sixteen_bit_input_is_reduced_to_high_byte() {
        let codec = JpegCodec::default();
        // 0x80FF little-endian
        let decoded = codec
            .decode(&codec.encode(&solid(8, 8, &[0xFF, 0x80], 16)).unwrap())
            .unwrap();
        assert_eq!(decoded.pixels.bit_depth, 8);
        assert!(decoded.pixels.data.iter().all(|&v| close(v, 0x80)));
    }

    #[test]
    fn bgra_input_drops_alpha() {
        let codec = JpegCodec::default();
        let decoded = codec
            .decode(&codec.encode(&solid(8, 8, &[10, 20, 30, 40], 8)).unwrap())
            .unwrap();
        assert_eq!(decoded.pixels.channels, 3);
    }

    #[test]
    fn unsupported_inputs_rejected() {
        let codec = JpegCodec::default();
        assert!(matches!(
            codec.encode(&solid(2, 2, &[0, 0, 0, 0], 32)),
            Err(CodecError::UnsupportedBitDepth { bit_depth: 32, .. })
        ));
        assert!(matches!(
            codec.encode(&solid(2, 2, &[0, 0], 8)),
            Err(CodecError::UnsupportedChannelCount { channels: 2, .. })
        ));
    }

    #[test]
    fn oversized_frames_fail_to_encode() {
        let codec = JpegCodec::default();
        let wide = PixelBuffer {
            width: 70_000,
            height: 1,
            channels: 1,
            bit_depth: 8,
            data: vec![0; 70_000],
        };
        assert!(matches!(
            codec.encode(&wide),
            Err(CodecError::EncodeFailed { .. })
        ));
    }

    #[test]
    fn restart_interval_writes_dri_marker() {
        let codec = JpegCodec::new(JpegParams {
            restart_interval: 4,
            ..JpegParams::default()
        });
        let stream = codec.encode(&solid(32, 32, &[1, 2, 3], 8)).unwrap();
        assert!(stream.windows(2).any(|w| w == [0xFF, 0xDD]));
        assert!(codec.decode(&stream).is_ok());
    }

    #[test]
    fn progressive_and_optimized_streams_decode() {
        let codec = JpegCodec::new(JpegParams {
            quality: Quality::new(60),
            progressive: true,
            optimize: true,
            restart_interval: 0,
        });
        let stream = codec.encode(&solid(24, 24, &[90, 60, 30], 8)).unwrap();
        assert_eq!(codec.decode(&stream).unwrap().pixels.width, 24);
    }

    #[test]
    fn lower_quality_produces_smaller_stream() {
        let noisy = PixelBuffer {
            width: 64,
            height: 64,
            channels: 3,
            bit_depth: 8,
            data: (0..64 * 64 * 3).map(|i| ((i * 7919) % 251) as u8).collect(),
        };
        let high = JpegCodec::new(JpegParams {
            quality: Quality::new(95),
            ..JpegParams::default()
        });
        let low = JpegCodec::new(JpegParams {
            quality: Quality::new(20),
            ..JpegParams::default()
        });
        assert!(low.encode(&noisy).unwrap().len() < high.encode(&noisy).unwrap().len());
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            JpegCodec::default().decode(b"\xFF\xD8 definitely not jpeg"),
            Err(CodecError::DecodeFailed { codec: "jpeg", .. })
        ));
    }
}

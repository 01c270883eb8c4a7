//! QOI adapter.
//!
//! QOI stores 8-bit RGB or RGBA and nothing else. The channel count is
//! taken from the buffer (bytes per pixel), and on decode the stream's own
//! header decides the layout; whatever a format descriptor claims is
//! secondary.

use super::backend::{Codec, CodecError, Decoded, PixelBuffer};
use super::registry::CodecId;
use crate::encoding::ColorLayout;
use qoi::{Channels, ColorSpace};

const NAME: &str = "qoi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoiColorspace {
    Srgb,
    Linear,
}

/// The fields of a QOI stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QoiHeader {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub colorspace: QoiColorspace,
}

impl QoiHeader {
    /// Layout of the pixels this header describes.
    pub fn layout(&self) -> ColorLayout {
        if self.channels == 4 {
            ColorLayout::RGBA8
        } else {
            ColorLayout::RGB8
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QoiCodec;

impl QoiCodec {
    /// Decode, also returning the stream header.
    pub fn decode_with_header(&self, data: &[u8]) -> Result<(QoiHeader, PixelBuffer), CodecError> {
        let (header, pixels) = qoi::decode_to_vec(data).map_err(|e| CodecError::DecodeFailed {
            codec: NAME,
            reason: e.to_string(),
        })?;
        let channels: u8 = match header.channels {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        };
        let colorspace = match header.colorspace {
            ColorSpace::Srgb => QoiColorspace::Srgb,
            ColorSpace::Linear => QoiColorspace::Linear,
        };
        let header = QoiHeader {
            width: header.width,
            height: header.height,
            channels,
            colorspace,
        };
        let pixels = PixelBuffer {
            width: header.width,
            height: header.height,
            channels: usize::from(channels),
            bit_depth: 8,
            data: pixels,
        };
        Ok((header, pixels))
    }
}

impl Codec for QoiCodec {
    fn id(&self) -> CodecId {
        CodecId::Qoi
    }

    fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let bytes_per_pixel = pixels.bytes_per_pixel();
        if pixels.bit_depth != 8 || !matches!(bytes_per_pixel, 3 | 4) {
            return Err(CodecError::UnsupportedChannelCount {
                codec: NAME,
                channels: bytes_per_pixel,
            });
        }
        qoi::encode_to_vec(&pixels.data, pixels.width, pixels.height).map_err(|e| {
            CodecError::EncodeFailed {
                codec: NAME,
                reason: e.to_string(),
            }
        })
    }

    fn decode(&self, data: &[u8]) -> Result<Decoded, CodecError> {
        let (header, pixels) = self.decode_with_header(data)?;
        Ok(Decoded {
            pixels,
            layout: Some(header.layout()),
        })
    }
}

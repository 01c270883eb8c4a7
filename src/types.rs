//! Shared types crossing the transport boundary.
//!
//! [`RawImage`] is what the frame source hands to the encoder and what the
//! decoder hands to the delivery sink. [`EncodedPayload`] is the only thing
//! that travels between the two.

use crate::encoding::{self, ColorLayout};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("unknown image encoding `{0}`")]
    UnknownEncoding(String),
    #[error("row stride {stride} is smaller than {width} px * {bytes_per_pixel} bytes")]
    StrideTooSmall {
        stride: usize,
        width: u32,
        bytes_per_pixel: usize,
    },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// An uncompressed raster frame.
///
/// Rows are `stride` bytes apart; the first `width * bytes_per_pixel` bytes
/// of each row are pixels, the rest is padding. Sixteen-bit samples are
/// little-endian. The buffer always holds exactly `stride * height` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    stride: usize,
    bit_depth: u8,
    channels: usize,
    encoding: String,
    data: Vec<u8>,
}

impl RawImage {
    /// Build a tightly packed frame, deriving depth and channel count from
    /// the encoding name.
    pub fn new(
        width: u32,
        height: u32,
        encoding: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let encoding = encoding.into();
        let (Some(bit_depth), Some(channels)) = (
            encoding::bit_depth(&encoding),
            encoding::num_channels(&encoding),
        ) else {
            return Err(FrameError::UnknownEncoding(encoding));
        };
        let stride = width as usize * channels * usize::from(bit_depth).div_ceil(8);
        Self::from_frame(data, width, height, stride, encoding, bit_depth, channels)
    }

    /// Build a frame from everything a frame source delivers.
    ///
    /// The encoding name is kept verbatim; it does not have to be one the
    /// transport knows, which lets unsupported frames reach the codecs and be
    /// rejected there with a precise error.
    pub fn from_frame(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        encoding: impl Into<String>,
        bit_depth: u8,
        channels: usize,
    ) -> Result<Self, FrameError> {
        let bytes_per_pixel = channels * usize::from(bit_depth).div_ceil(8);
        if stride < width as usize * bytes_per_pixel {
            return Err(FrameError::StrideTooSmall {
                stride,
                width,
                bytes_per_pixel,
            });
        }
        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            bit_depth,
            channels,
            encoding: encoding.into(),
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.channels * usize::from(self.bit_depth).div_ceil(8)
    }

    /// Bytes of pixel data per row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// True when the frame has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Color layout of the frame, if its encoding names one that agrees with
    /// the declared depth and channel count.
    pub fn layout(&self) -> Option<ColorLayout> {
        ColorLayout::from_encoding(&self.encoding).filter(|layout| {
            layout.depth.bits() == self.bit_depth && layout.channels() == self.channels
        })
    }

    /// Pixel rows with the stride padding removed.
    pub fn packed(&self) -> Cow<'_, [u8]> {
        let row_bytes = self.row_bytes();
        if self.stride == row_bytes {
            return Cow::Borrowed(&self.data[..row_bytes * self.height as usize]);
        }
        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.data.chunks_exact(self.stride) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Cow::Owned(packed)
    }
}

/// Compressed bytes plus the format header describing how to undo them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Format descriptor, e.g. `"rgb8; png compressed bgr8"`.
    pub format: String,
    /// Codec-native stream (JPEG, PNG or QOI).
    pub data: Vec<u8>,
}

impl EncodedPayload {
    pub fn new(format: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            format: format.into(),
            data,
        }
    }
}

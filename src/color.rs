//! Pixel layout conversion.
//!
//! One conversion routine serves both directions of the transport: the
//! encoder uses it to bring a frame into the layout a codec wants, the
//! decoder to bring decoded pixels back into the frame's original layout.
//! Any [`ColorLayout`] converts to any other:
//!
//! - channel order is remapped through canonical red, green, blue, alpha;
//! - color to mono uses ITU-R BT.601 luma weights;
//! - 8 → 16 bits multiplies by 257 (so 0xFF becomes 0xFFFF), 16 → 8 keeps
//!   the high byte;
//! - a missing alpha channel is filled with the maximum value.
//!
//! Also home to the small byte-level helpers the codec adapters share.

use crate::codecs::PixelBuffer;
use crate::encoding::{BitDepth, ChannelOrder, ColorLayout};
use crate::types::RawImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{channels}-channel {bit_depth}-bit pixels cannot be read as {layout}")]
    UnsupportedLayout {
        layout: String,
        channels: usize,
        bit_depth: u8,
    },
    #[error("pixel buffer holds {actual} bytes, {expected} needed")]
    BufferTooSmall { expected: usize, actual: usize },
}

/// Convert pixels from layout `from` to layout `to`.
///
/// `pixels` must actually be in `from` (matching channel count and depth).
/// Converting a layout to itself returns the buffer untouched.
pub fn convert(
    pixels: PixelBuffer,
    from: ColorLayout,
    to: ColorLayout,
) -> Result<PixelBuffer, ConversionError> {
    if pixels.channels != from.channels() || pixels.bit_depth != from.depth.bits() {
        return Err(ConversionError::UnsupportedLayout {
            layout: from.name(),
            channels: pixels.channels,
            bit_depth: pixels.bit_depth,
        });
    }
    let count = pixels.width as usize * pixels.height as usize;
    let expected = count * from.bytes_per_pixel();
    if pixels.data.len() < expected {
        return Err(ConversionError::BufferTooSmall {
            expected,
            actual: pixels.data.len(),
        });
    }
    if from == to {
        return Ok(pixels);
    }

    let mut data = Vec::with_capacity(count * to.bytes_per_pixel());
    for px in pixels.data[..expected].chunks_exact(from.bytes_per_pixel()) {
        let rgba = read_rgba(px, from).map(|v| rescale(v, from.depth, to.depth));
        write_pixel(&mut data, rgba, to);
    }
    Ok(PixelBuffer {
        width: pixels.width,
        height: pixels.height,
        channels: to.channels(),
        bit_depth: to.depth.bits(),
        data,
    })
}

/// Packed pixels of `image`, converted to `target` when one is given.
pub fn normalize(
    image: &RawImage,
    target: Option<ColorLayout>,
) -> Result<PixelBuffer, ConversionError> {
    let packed = PixelBuffer {
        width: image.width(),
        height: image.height(),
        channels: image.channels(),
        bit_depth: image.bit_depth(),
        data: image.packed().into_owned(),
    };
    let Some(target) = target else {
        return Ok(packed);
    };
    let source = image
        .layout()
        .ok_or_else(|| ConversionError::UnsupportedLayout {
            layout: image.encoding().to_string(),
            channels: image.channels(),
            bit_depth: image.bit_depth(),
        })?;
    convert(packed, source, target)
}

fn max_value(depth: BitDepth) -> u16 {
    match depth {
        BitDepth::Eight => u16::from(u8::MAX),
        BitDepth::Sixteen => u16::MAX,
    }
}

fn rescale(value: u16, from: BitDepth, to: BitDepth) -> u16 {
    match (from, to) {
        (BitDepth::Eight, BitDepth::Sixteen) => value * 257,
        (BitDepth::Sixteen, BitDepth::Eight) => value >> 8,
        _ => value,
    }
}

fn luma(r: u16, g: u16, b: u16) -> u16 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((weighted + 500) / 1000) as u16
}

fn sample(px: &[u8], index: usize, depth: BitDepth) -> u16 {
    match depth {
        BitDepth::Eight => u16::from(px[index]),
        BitDepth::Sixteen => u16::from_le_bytes([px[2 * index], px[2 * index + 1]]),
    }
}

/// Canonical `[r, g, b, a]` of one pixel, at the layout's own depth.
fn read_rgba(px: &[u8], layout: ColorLayout) -> [u16; 4] {
    let s = |index| sample(px, index, layout.depth);
    let opaque = max_value(layout.depth);
    match layout.order {
        ChannelOrder::Mono => {
            let v = s(0);
            [v, v, v, opaque]
        }
        ChannelOrder::Rgb => [s(0), s(1), s(2), opaque],
        ChannelOrder::Rgba => [s(0), s(1), s(2), s(3)],
        ChannelOrder::Bgr => [s(2), s(1), s(0), opaque],
        ChannelOrder::Bgra => [s(2), s(1), s(0), s(3)],
    }
}

fn write_pixel(out: &mut Vec<u8>, [r, g, b, a]: [u16; 4], layout: ColorLayout) {
    let (samples, count) = match layout.order {
        ChannelOrder::Mono => ([luma(r, g, b), 0, 0, 0], 1),
        ChannelOrder::Rgb => ([r, g, b, 0], 3),
        ChannelOrder::Rgba => ([r, g, b, a], 4),
        ChannelOrder::Bgr => ([b, g, r, 0], 3),
        ChannelOrder::Bgra => ([b, g, r, a], 4),
    };
    for &v in &samples[..count] {
        match layout.depth {
            BitDepth::Eight => out.push(v as u8),
            BitDepth::Sixteen => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
}

// ============================================================================
// Byte-level helpers for the codec adapters
// ============================================================================

/// Swap the first and third sample of every pixel in place (RGB ↔ BGR).
/// Buffers with fewer than three channels are left alone.
pub(crate) fn swap_red_blue(pixels: &mut PixelBuffer) {
    if pixels.channels < 3 {
        return;
    }
    let sample_bytes = usize::from(pixels.bit_depth).div_ceil(8);
    for px in pixels
        .data
        .chunks_exact_mut(pixels.channels * sample_bytes)
    {
        for i in 0..sample_bytes {
            px.swap(i, 2 * sample_bytes + i);
        }
    }
}

/// Serialize 16-bit samples little-endian.
pub(crate) fn samples_to_le(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian 16-bit samples to native byte order.
pub(crate) fn le_to_native(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(2)
        .flat_map(|s| u16::from_le_bytes([s[0], s[1]]).to_ne_bytes())
        .collect()
}

/// Reduce little-endian 16-bit samples to their high byte.
pub(crate) fn narrow_samples(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(2).map(|s| s[1]).collect()
}

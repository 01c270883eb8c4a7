//! Image files ↔ raw frames, for the command-line tool.
//!
//! The transport itself never touches the filesystem. The CLI uses these
//! helpers to turn ordinary image files into [`RawImage`] frames of a
//! requested encoding, and to save decoded frames for inspection.

use crate::codecs::PixelBuffer;
use crate::color::{self, ConversionError};
use crate::encoding::{BitDepth, ChannelOrder, ColorLayout};
use crate::types::{FrameError, RawImage};
use image::{DynamicImage, ImageBuffer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions picked up when a directory is given as input.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "qoi", "tif", "tiff", "webp"];

#[derive(Error, Debug)]
pub enum FrameFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),
    #[error("`{0}` is not a color layout (mono8, rgb8, bgra16, ...)")]
    UnknownLayout(String),
}

/// Load an image file as a frame of the given encoding.
pub fn load_frame(path: &Path, encoding: &str) -> Result<RawImage, FrameFileError> {
    let layout = ColorLayout::from_encoding(encoding)
        .ok_or_else(|| FrameFileError::UnknownLayout(encoding.to_string()))?;
    let image = image::open(path)?;
    frame_from_image(&image, layout)
}

/// Convert a decoded image into a tightly packed frame of `layout`.
pub fn frame_from_image(
    image: &DynamicImage,
    layout: ColorLayout,
) -> Result<RawImage, FrameFileError> {
    let (source, data) = match layout.depth {
        BitDepth::Eight => (ColorLayout::RGBA8, image.to_rgba8().into_raw()),
        BitDepth::Sixteen => (
            ColorLayout::RGBA16,
            color::samples_to_le(&image.to_rgba16().into_raw()),
        ),
    };
    let rgba = PixelBuffer {
        width: image.width(),
        height: image.height(),
        channels: 4,
        bit_depth: layout.depth.bits(),
        data,
    };
    let pixels = color::convert(rgba, source, layout)?;
    Ok(RawImage::new(
        pixels.width,
        pixels.height,
        layout.name(),
        pixels.data,
    )?)
}

/// Convert a frame into an image the `image` crate can save.
///
/// Frames whose encoding carries no color semantics are saved as gray,
/// BGR or BGRA depending on their channel count.
pub fn image_from_frame(frame: &RawImage) -> Result<DynamicImage, FrameFileError> {
    let layout = frame.layout().or_else(|| {
        let depth = BitDepth::from_bits(frame.bit_depth())?;
        let order = match frame.channels() {
            1 => ChannelOrder::Mono,
            3 => ChannelOrder::Bgr,
            4 => ChannelOrder::Bgra,
            _ => return None,
        };
        Some(ColorLayout::new(order, depth))
    });
    let layout = layout.ok_or_else(|| FrameFileError::UnknownLayout(frame.encoding().to_string()))?;

    let order = match layout.order {
        ChannelOrder::Mono => ChannelOrder::Mono,
        ChannelOrder::Rgb | ChannelOrder::Bgr => ChannelOrder::Rgb,
        ChannelOrder::Rgba | ChannelOrder::Bgra => ChannelOrder::Rgba,
    };
    let target = ColorLayout::new(order, layout.depth);
    let packed = PixelBuffer {
        width: frame.width(),
        height: frame.height(),
        channels: frame.channels(),
        bit_depth: frame.bit_depth(),
        data: frame.packed().into_owned(),
    };
    let pixels = color::convert(packed, layout, target)?;
    let (w, h) = (pixels.width, pixels.height);

    let image = match target.depth {
        BitDepth::Eight => {
            let data = pixels.data;
            match order {
                ChannelOrder::Mono => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
                ChannelOrder::Rgb => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
                _ => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            }
        }
        BitDepth::Sixteen => {
            let data: Vec<u16> = pixels
                .data
                .chunks_exact(2)
                .map(|s| u16::from_le_bytes([s[0], s[1]]))
                .collect();
            match order {
                ChannelOrder::Mono => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageLuma16),
                ChannelOrder::Rgb => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgb16),
                _ => ImageBuffer::from_raw(w, h, data).map(DynamicImage::ImageRgba16),
            }
        }
    };
    image.ok_or_else(|| {
        FrameFileError::Frame(FrameError::BufferSize {
            expected: w as usize * h as usize * target.bytes_per_pixel(),
            actual: frame.packed().len(),
        })
    })
}

/// Save a frame as an image file; the format follows the extension.
pub fn save_frame(frame: &RawImage, path: &Path) -> Result<(), FrameFileError> {
    image_from_frame(frame)?.save(path)?;
    Ok(())
}

/// Expand inputs into image files: files are kept as given, directories
/// contribute their image files (not recursive), sorted by name.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, FrameFileError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| is_image(p))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

//! Parameter types for the codec adapters.
//!
//! These describe *how hard* to compress, not *what* to compress. They are
//! built from one configuration snapshot per message and handed to the
//! adapters by [`codec_for`](super::registry::codec_for).
//!
//! - [`Quality`]: JPEG quality (1–100, default 95). Clamped on construction, so 0 acts as 1.
//! - [`CompressionLevel`]: PNG deflate effort (0–9, default 9). Clamped.
//! - [`JpegParams`]: quality plus progressive, optimized Huffman and restart interval.
//! - [`PngParams`]: compression level.

use crate::config::{JpegConfig, PngConfig};

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// PNG compression level (0 = fastest, 9 = smallest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub fn new(value: u32) -> Self {
        Self(value.min(9) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(9)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JpegParams {
    pub quality: Quality,
    pub progressive: bool,
    /// Compute optimal Huffman tables instead of the standard ones.
    pub optimize: bool,
    /// MCUs between restart markers; 0 disables them.
    pub restart_interval: u16,
}

impl JpegParams {
    pub fn from_config(config: &JpegConfig) -> Self {
        Self {
            quality: Quality::new(config.quality),
            progressive: config.progressive,
            optimize: config.optimize,
            restart_interval: config.restart_interval.min(u32::from(u16::MAX)) as u16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PngParams {
    pub level: CompressionLevel,
}

impl PngParams {
    pub fn from_config(config: &PngConfig) -> Self {
        Self {
            level: CompressionLevel::new(config.level),
        }
    }
}

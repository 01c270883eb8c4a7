//! Codec identifiers, the per-codec layout table, and codec selection.
//!
//! Each codec states up front what it accepts and what it needs color
//! input turned into. The encoder consults the table before any pixel is
//! touched, so a bad frame is rejected with a precise error instead of
//! failing deep inside a codec library.
//!
//! | Codec | Depths | Channel domain | Mono | Color input becomes |
//! |---|---|---|---|---|
//! | JPEG | 8, 16 | any | unchanged | BGR at the source depth (alpha dropped) |
//! | PNG | 8, 16 | any | unchanged | BGR at the source depth (alpha dropped) |
//! | QOI | any | stride / width ∈ {3, 4} | rejected | RGB8, or RGBA8 for 4-channel input |
//!
//! Decoded pixels come back in the codec's native layout: blue-first for
//! JPEG and PNG, red-first for QOI.

use super::backend::{Codec, CodecError};
use super::jpeg::JpegCodec;
use super::params::{JpegParams, PngParams};
use super::png::PngCodec;
use super::qoi::QoiCodec;
use crate::config::TransportConfig;
use crate::descriptor::CodecTag;
use crate::encoding::{BitDepth, ChannelOrder, ColorLayout};
use crate::types::RawImage;
use std::fmt;

/// Codec selected by the `format` configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    Jpeg,
    Png,
    Qoi,
    /// A name that matches no codec. Selecting it fails every encode.
    Undefined,
}

impl CodecId {
    /// Resolve a configured format name. Matching is case-insensitive and
    /// ignores surrounding whitespace; anything unrecognized is `Undefined`.
    pub fn from_name(name: &str) -> CodecId {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => CodecId::Jpeg,
            "png" => CodecId::Png,
            "qoi" => CodecId::Qoi,
            _ => CodecId::Undefined,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CodecId::Jpeg => "jpeg",
            CodecId::Png => "png",
            CodecId::Qoi => "qoi",
            CodecId::Undefined => "undefined",
        }
    }

    /// Header tag written for payloads of this codec.
    pub const fn tag(self) -> Option<CodecTag> {
        match self {
            CodecId::Jpeg => Some(CodecTag::Jpeg),
            CodecId::Png => Some(CodecTag::Png),
            CodecId::Qoi => Some(CodecTag::Qoi),
            CodecId::Undefined => None,
        }
    }
}

impl From<CodecTag> for CodecId {
    fn from(tag: CodecTag) -> Self {
        match tag {
            CodecTag::Jpeg => CodecId::Jpeg,
            CodecTag::Png => CodecId::Png,
            CodecTag::Qoi => CodecId::Qoi,
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Layout table
// ============================================================================

/// Which input frames a codec can take at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDomain {
    /// Sample depth must be 8 or 16 bits; any channel count.
    EightOrSixteenBit,
    /// Bytes per pixel, derived as `stride / width`, must be one of these.
    StrideChannels(&'static [usize]),
}

/// What happens to a color frame before it reaches the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRule {
    /// Three-channel blue-first at the source depth.
    BgrAtSourceDepth,
    /// Eight-bit red-first, keeping alpha when present.
    Rgb8KeepAlpha,
}

/// Channel order of color pixels a codec decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOrder {
    BlueFirst,
    RedFirst,
}

/// One row of the layout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRule {
    pub codec: CodecId,
    pub domain: InputDomain,
    pub accepts_mono: bool,
    pub color: ColorRule,
    pub native: NativeOrder,
}

const RULES: [LayoutRule; 3] = [
    LayoutRule {
        codec: CodecId::Jpeg,
        domain: InputDomain::EightOrSixteenBit,
        accepts_mono: true,
        color: ColorRule::BgrAtSourceDepth,
        native: NativeOrder::BlueFirst,
    },
    LayoutRule {
        codec: CodecId::Png,
        domain: InputDomain::EightOrSixteenBit,
        accepts_mono: true,
        color: ColorRule::BgrAtSourceDepth,
        native: NativeOrder::BlueFirst,
    },
    LayoutRule {
        codec: CodecId::Qoi,
        domain: InputDomain::StrideChannels(&[3, 4]),
        accepts_mono: false,
        color: ColorRule::Rgb8KeepAlpha,
        native: NativeOrder::RedFirst,
    },
];

/// The table row for `codec`, or `None` for [`CodecId::Undefined`].
pub fn rule(codec: CodecId) -> Option<&'static LayoutRule> {
    RULES.iter().find(|rule| rule.codec == codec)
}

impl LayoutRule {
    /// Reject frames outside the codec's input domain.
    pub fn check_input(&self, image: &RawImage) -> Result<(), CodecError> {
        let codec = self.codec.name();
        match self.domain {
            InputDomain::EightOrSixteenBit => {
                if BitDepth::from_bits(image.bit_depth()).is_none() {
                    return Err(CodecError::UnsupportedBitDepth {
                        codec,
                        bit_depth: image.bit_depth(),
                    });
                }
            }
            InputDomain::StrideChannels(allowed) => {
                let channels = match image.width() {
                    0 => 0,
                    width => image.stride() / width as usize,
                };
                if !allowed.contains(&channels) {
                    return Err(CodecError::UnsupportedChannelCount { codec, channels });
                }
            }
        }
        Ok(())
    }

    /// Layout a frame of `source` layout is converted to before encoding.
    ///
    /// `Ok(None)` means the frame is handed over unchanged. A color frame
    /// always gets a target, even when it already matches, so the header
    /// records what the codec actually saw.
    pub fn encode_target(&self, source: ColorLayout) -> Result<Option<ColorLayout>, CodecError> {
        if !source.is_color() {
            return if self.accepts_mono {
                Ok(None)
            } else {
                Err(CodecError::UnsupportedChannelCount {
                    codec: self.codec.name(),
                    channels: source.channels(),
                })
            };
        }
        let target = match self.color {
            ColorRule::BgrAtSourceDepth => ColorLayout::new(ChannelOrder::Bgr, source.depth),
            ColorRule::Rgb8KeepAlpha if source.order.has_alpha() => ColorLayout::RGBA8,
            ColorRule::Rgb8KeepAlpha => ColorLayout::RGB8,
        };
        Ok(Some(target))
    }

    /// Layout of pixels the codec decoded with `channels` channels.
    pub fn native_layout(&self, channels: usize, depth: BitDepth) -> Option<ColorLayout> {
        let order = match (self.native, channels) {
            (_, 1) => ChannelOrder::Mono,
            (NativeOrder::BlueFirst, 3) => ChannelOrder::Bgr,
            (NativeOrder::BlueFirst, 4) => ChannelOrder::Bgra,
            (NativeOrder::RedFirst, 3) => ChannelOrder::Rgb,
            (NativeOrder::RedFirst, 4) => ChannelOrder::Rgba,
            _ => return None,
        };
        Some(ColorLayout::new(order, depth))
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Build the codec for `id`, parameterized from one configuration snapshot.
///
/// Returns `None` for [`CodecId::Undefined`].
pub fn codec_for(id: CodecId, config: &TransportConfig) -> Option<Box<dyn Codec>> {
    match id {
        CodecId::Jpeg => Some(Box::new(JpegCodec::new(JpegParams::from_config(
            &config.jpeg,
        )))),
        CodecId::Png => Some(Box::new(PngCodec::new(PngParams::from_config(&config.png)))),
        CodecId::Qoi => Some(Box::new(QoiCodec)),
        CodecId::Undefined => None,
    }
}

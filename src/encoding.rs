//! Image encoding names and color layouts.
//!
//! Raw frames are labeled with a textual encoding (`"rgb8"`, `"mono16"`,
//! `"8UC3"`, ...). This module answers the three questions every stage of
//! the transport asks about such a label:
//!
//! - how many bits per sample ([`bit_depth`]),
//! - how many channels per pixel ([`num_channels`]),
//! - whether the channels carry color semantics ([`is_color`]), and if so
//!   in which order ([`ColorLayout::from_encoding`]).
//!
//! ## Known encodings
//!
//! | Name | Depth | Channels | Layout |
//! |---|---|---|---|
//! | `mono8`, `mono16` | 8, 16 | 1 | [`ChannelOrder::Mono`] |
//! | `rgb8`, `rgb16` | 8, 16 | 3 | [`ChannelOrder::Rgb`] |
//! | `bgr8`, `bgr16` | 8, 16 | 3 | [`ChannelOrder::Bgr`] |
//! | `rgba8`, `rgba16` | 8, 16 | 4 | [`ChannelOrder::Rgba`] |
//! | `bgra8`, `bgra16` | 8, 16 | 4 | [`ChannelOrder::Bgra`] |
//! | `8UC1`..`64FC4` | 8–64 | 1–4 | none (no color semantics) |

use std::fmt;

/// Channel semantics and ordering of an interleaved pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    Mono,
    Rgb,
    Rgba,
    Bgr,
    Bgra,
}

impl ChannelOrder {
    pub const fn channels(self) -> usize {
        match self {
            ChannelOrder::Mono => 1,
            ChannelOrder::Rgb | ChannelOrder::Bgr => 3,
            ChannelOrder::Rgba | ChannelOrder::Bgra => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, ChannelOrder::Rgba | ChannelOrder::Bgra)
    }

    /// True for the blue-first orders.
    pub const fn is_bgr(self) -> bool {
        matches!(self, ChannelOrder::Bgr | ChannelOrder::Bgra)
    }

    fn prefix(self) -> &'static str {
        match self {
            ChannelOrder::Mono => "mono",
            ChannelOrder::Rgb => "rgb",
            ChannelOrder::Rgba => "rgba",
            ChannelOrder::Bgr => "bgr",
            ChannelOrder::Bgra => "bgra",
        }
    }

    /// The same color family (RGB-first or BGR-first) with `channels` channels.
    ///
    /// Returns `None` when the channel count cannot be expressed in this
    /// family (e.g. mono with three channels).
    pub const fn with_channels(self, channels: usize) -> Option<ChannelOrder> {
        match (self, channels) {
            (ChannelOrder::Mono, 1) => Some(ChannelOrder::Mono),
            (ChannelOrder::Rgb | ChannelOrder::Rgba, 3) => Some(ChannelOrder::Rgb),
            (ChannelOrder::Rgb | ChannelOrder::Rgba, 4) => Some(ChannelOrder::Rgba),
            (ChannelOrder::Bgr | ChannelOrder::Bgra, 3) => Some(ChannelOrder::Bgr),
            (ChannelOrder::Bgr | ChannelOrder::Bgra, 4) => Some(ChannelOrder::Bgra),
            _ => None,
        }
    }
}

/// Sample width of a [`ColorLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    pub const fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }

    pub const fn from_bits(bits: u8) -> Option<BitDepth> {
        match bits {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            _ => None,
        }
    }
}

/// Channel order crossed with sample depth, e.g. BGR at 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorLayout {
    pub order: ChannelOrder,
    pub depth: BitDepth,
}

impl ColorLayout {
    pub const MONO8: ColorLayout = ColorLayout::new(ChannelOrder::Mono, BitDepth::Eight);
    pub const MONO16: ColorLayout = ColorLayout::new(ChannelOrder::Mono, BitDepth::Sixteen);
    pub const RGB8: ColorLayout = ColorLayout::new(ChannelOrder::Rgb, BitDepth::Eight);
    pub const RGB16: ColorLayout = ColorLayout::new(ChannelOrder::Rgb, BitDepth::Sixteen);
    pub const RGBA8: ColorLayout = ColorLayout::new(ChannelOrder::Rgba, BitDepth::Eight);
    pub const RGBA16: ColorLayout = ColorLayout::new(ChannelOrder::Rgba, BitDepth::Sixteen);
    pub const BGR8: ColorLayout = ColorLayout::new(ChannelOrder::Bgr, BitDepth::Eight);
    pub const BGR16: ColorLayout = ColorLayout::new(ChannelOrder::Bgr, BitDepth::Sixteen);
    pub const BGRA8: ColorLayout = ColorLayout::new(ChannelOrder::Bgra, BitDepth::Eight);
    pub const BGRA16: ColorLayout = ColorLayout::new(ChannelOrder::Bgra, BitDepth::Sixteen);

    pub const fn new(order: ChannelOrder, depth: BitDepth) -> Self {
        Self { order, depth }
    }

    /// Layout of a named encoding. `None` for encodings without channel
    /// semantics (`8UC3`, `32FC1`, ...) and for unknown names.
    pub fn from_encoding(name: &str) -> Option<ColorLayout> {
        let (prefix, bits) = split_depth_suffix(name)?;
        let order = match prefix {
            "mono" => ChannelOrder::Mono,
            "rgb" => ChannelOrder::Rgb,
            "rgba" => ChannelOrder::Rgba,
            "bgr" => ChannelOrder::Bgr,
            "bgra" => ChannelOrder::Bgra,
            _ => return None,
        };
        Some(ColorLayout::new(order, BitDepth::from_bits(bits)?))
    }

    /// The layout for `channels` interleaved samples of `depth`, keeping the
    /// color family of `self`.
    pub fn reshaped(self, channels: usize, depth: BitDepth) -> Option<ColorLayout> {
        Some(ColorLayout::new(self.order.with_channels(channels)?, depth))
    }

    pub const fn channels(self) -> usize {
        self.order.channels()
    }

    pub const fn bytes_per_pixel(self) -> usize {
        self.channels() * self.depth.bytes()
    }

    pub const fn is_color(self) -> bool {
        !matches!(self.order, ChannelOrder::Mono)
    }

    /// Encoding name, e.g. `"bgr16"`.
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.order.prefix(), self.depth.bits())
    }
}

/// Split `"rgba16"` into `("rgba", 16)`.
fn split_depth_suffix(name: &str) -> Option<(&str, u8)> {
    let digits = name.find(|c: char| c.is_ascii_digit())?;
    let (prefix, bits) = name.split_at(digits);
    Some((prefix, bits.parse().ok()?))
}

/// Parse a generic `<bits><U|S|F>C<channels>` encoding such as `16UC3`.
fn parse_generic(name: &str) -> Option<(u8, usize)> {
    let (bits, rest) = name.split_at(name.find(|c: char| !c.is_ascii_digit())?);
    let bits: u8 = bits.parse().ok()?;
    let channels = rest
        .strip_prefix("UC")
        .or_else(|| rest.strip_prefix("SC"))
        .or_else(|| rest.strip_prefix("FC"))?;
    let channels: usize = channels.parse().ok()?;
    let valid_bits = match rest.as_bytes()[0] {
        b'U' => matches!(bits, 8 | 16),
        b'S' => matches!(bits, 8 | 16 | 32),
        _ => matches!(bits, 32 | 64),
    };
    (valid_bits && (1..=4).contains(&channels)).then_some((bits, channels))
}

/// Bits per sample of a named encoding, or `None` if the name is unknown.
pub fn bit_depth(name: &str) -> Option<u8> {
    ColorLayout::from_encoding(name)
        .map(|layout| layout.depth.bits())
        .or_else(|| parse_generic(name).map(|(bits, _)| bits))
}

/// Channels per pixel of a named encoding, or `None` if the name is unknown.
pub fn num_channels(name: &str) -> Option<usize> {
    ColorLayout::from_encoding(name)
        .map(ColorLayout::channels)
        .or_else(|| parse_generic(name).map(|(_, channels)| channels))
}

/// True for RGB/BGR encodings with or without alpha.
pub fn is_color(name: &str) -> bool {
    ColorLayout::from_encoding(name).is_some_and(ColorLayout::is_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_encodings_parse_to_layouts() {
        assert_eq!(ColorLayout::from_encoding("rgb8"), Some(ColorLayout::RGB8));
        assert_eq!(ColorLayout::from_encoding("bgra16"), Some(ColorLayout::BGRA16));
        assert_eq!(ColorLayout::from_encoding("mono16"), Some(ColorLayout::MONO16));
    }

    #[test]
    fn generic_encodings_have_no_layout() {
        assert_eq!(ColorLayout::from_encoding("8UC3"), None);
        assert_eq!(ColorLayout::from_encoding("32FC1"), None);
        assert_eq!(ColorLayout::from_encoding("rgb32"), None);
    }

    #[test]
    fn layout_names_roundtrip() {
        for layout in [
            ColorLayout::MONO8,
            ColorLayout::RGB16,
            ColorLayout::BGR8,
            ColorLayout::RGBA8,
            ColorLayout::BGRA16,
        ] {
            assert_eq!(ColorLayout::from_encoding(&layout.name()), Some(layout));
        }
    }

    #[test]
    fn bit_depth_of_named_and_generic_encodings() {
        assert_eq!(bit_depth("bgr8"), Some(8));
        assert_eq!(bit_depth("mono16"), Some(16));
        assert_eq!(bit_depth("16UC1"), Some(16));
        assert_eq!(bit_depth("32FC1"), Some(32));
        assert_eq!(bit_depth("64FC3"), Some(64));
        assert_eq!(bit_depth("yuv422"), None);
    }

    #[test]
    fn num_channels_of_named_and_generic_encodings() {
        assert_eq!(num_channels("rgba8"), Some(4));
        assert_eq!(num_channels("mono8"), Some(1));
        assert_eq!(num_channels("8UC2"), Some(2));
        assert_eq!(num_channels("8UC5"), None);
        assert_eq!(num_channels("bogus"), None);
    }

    #[test]
    fn invalid_generic_depths_rejected() {
        assert_eq!(bit_depth("32UC1"), None);
        assert_eq!(bit_depth("8FC1"), None);
    }

    #[test]
    fn is_color_only_for_rgb_family() {
        assert!(is_color("rgb8"));
        assert!(is_color("bgra16"));
        assert!(!is_color("mono8"));
        assert!(!is_color("8UC3"));
    }

    #[test]
    fn reshape_keeps_color_family() {
        assert_eq!(
            ColorLayout::BGRA16.reshaped(3, BitDepth::Eight),
            Some(ColorLayout::BGR8)
        );
        assert_eq!(
            ColorLayout::RGB8.reshaped(4, BitDepth::Eight),
            Some(ColorLayout::RGBA8)
        );
        assert_eq!(ColorLayout::MONO8.reshaped(3, BitDepth::Eight), None);
    }
}

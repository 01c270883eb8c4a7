//! Decode pipeline: header plus compressed bytes in, raw frame out.
//!
//! ```text
//! EncodedPayload ─▶ parse header ─┬─ Tagged ─▶ codec decode ─▶ written layout ─▶ restore original layout ─▶ RawImage
//!                                 └─ Legacy ─▶ sniff container ─▶ mono/bgr by channel count ───────────────▶ RawImage
//! ```
//!
//! ## Restoring the original layout
//!
//! The layout the codec was handed is the header's target encoding when
//! present, otherwise the original encoding. JPEG may have changed depth
//! and dropped alpha on the way, so that layout is reshaped to what was
//! actually decoded before converting back. QOI is the exception: its own
//! stream header is authoritative.
//!
//! | Decode mode | JPEG / PNG / legacy | QOI |
//! |---|---|---|
//! | `unchanged` | original encoding restored | original encoding restored |
//! | `gray` | `mono8` | original encoding restored |
//! | `color` | `rgb8` for red-first originals, else `bgr8` | original encoding restored |

use crate::codecs::{self, Codec, CodecId, Decoded, PixelBuffer, registry};
use crate::color;
use crate::config::{DecodeMode, TransportConfig};
use crate::descriptor::{self, Descriptor, FormatDescriptor};
use crate::encoding::{self, BitDepth, ChannelOrder, ColorLayout};
use crate::error::TransportError;
use crate::types::{EncodedPayload, RawImage};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Codec name used in errors about payloads without a descriptor.
const LEGACY: &str = "legacy";

/// Decode a payload, applying `config.decode.mode`.
pub fn decode(payload: &EncodedPayload, config: &TransportConfig) -> Result<RawImage, TransportError> {
    let mode = config.decode.mode;
    match descriptor::parse(&payload.format)? {
        FormatDescriptor::Legacy { header } => decode_legacy(&payload.data, &header, mode),
        FormatDescriptor::Tagged(descriptor) => {
            let id = CodecId::from(descriptor.codec);
            let codec = registry::codec_for(id, config)
                .ok_or_else(|| TransportError::UnknownCodec(id.name().to_string()))?;
            decode_with_codec(&payload.data, &descriptor, codec.as_ref(), mode)
        }
    }
}

/// Decode a tagged payload with an already constructed codec.
pub fn decode_with_codec(
    data: &[u8],
    descriptor: &Descriptor,
    codec: &dyn Codec,
    mode: DecodeMode,
) -> Result<RawImage, TransportError> {
    let id = codec.id();
    let original = descriptor.original_encoding.as_str();
    let Decoded { pixels, layout: native } = codec
        .decode(data)
        .map_err(|e| TransportError::decoding(e, original))?;
    ensure_not_empty(&pixels)?;

    let original_layout = ColorLayout::from_encoding(original);
    let source = match id {
        CodecId::Qoi => native,
        _ => written_layout(descriptor, &pixels)?.or(native),
    };
    let forced = match id {
        CodecId::Qoi => None,
        _ => forced_layout(mode, original_layout),
    };

    let (pixels, encoding) = match forced {
        Some(target) => {
            let source = source.ok_or_else(|| unlabeled(id.name(), original, &pixels))?;
            let converted = color::convert(pixels, source, target)
                .map_err(|e| TransportError::conversion(e, id.name(), original, true))?;
            (converted, target.name())
        }
        None => restore(pixels, source, original, original_layout, id.name())?,
    };
    into_image(pixels, encoding, id.name())
}

/// Layout the codec was handed, reshaped to the decoded channels and depth.
fn written_layout(
    descriptor: &Descriptor,
    pixels: &PixelBuffer,
) -> Result<Option<ColorLayout>, TransportError> {
    let declared = match &descriptor.target_encoding {
        Some(target) => Some(ColorLayout::from_encoding(target).ok_or_else(|| {
            TransportError::MalformedHeader {
                header: descriptor.to_string(),
                reason: format!("unknown target encoding `{target}`"),
            }
        })?),
        None => ColorLayout::from_encoding(&descriptor.original_encoding),
    };
    Ok(declared
        .zip(pixels.depth())
        .and_then(|(layout, depth)| layout.reshaped(pixels.channels, depth)))
}

/// Layout a decode mode forces, if any.
fn forced_layout(mode: DecodeMode, original: Option<ColorLayout>) -> Option<ColorLayout> {
    match mode {
        DecodeMode::Unchanged => None,
        DecodeMode::Gray => Some(ColorLayout::MONO8),
        DecodeMode::Color => {
            let red_first = original
                .is_some_and(|layout| matches!(layout.order, ChannelOrder::Rgb | ChannelOrder::Rgba));
            Some(if red_first {
                ColorLayout::RGB8
            } else {
                ColorLayout::BGR8
            })
        }
    }
}

/// Bring decoded pixels back to the original encoding.
fn restore(
    pixels: PixelBuffer,
    source: Option<ColorLayout>,
    original: &str,
    original_layout: Option<ColorLayout>,
    codec: &'static str,
) -> Result<(PixelBuffer, String), TransportError> {
    match (source, original_layout) {
        (Some(source), Some(target)) => {
            let restored = color::convert(pixels, source, target)
                .map_err(|e| TransportError::conversion(e, codec, original, true))?;
            Ok((restored, original.to_string()))
        }
        _ if encoding::bit_depth(original) == Some(pixels.bit_depth)
            && encoding::num_channels(original) == Some(pixels.channels) =>
        {
            Ok((pixels, original.to_string()))
        }
        (Some(source), None) => {
            warn!(
                codec,
                original,
                decoded = %source,
                "Decoded pixels do not fit the original encoding, delivering as decoded"
            );
            Ok((pixels, source.name()))
        }
        (None, _) => Err(unlabeled(codec, original, &pixels)),
    }
}

// ============================================================================
// Legacy payloads
// ============================================================================

/// Layout of a legacy payload, inferred from what decoded.
fn legacy_layout(channels: usize, depth: BitDepth) -> Option<ColorLayout> {
    let order = match channels {
        1 => ChannelOrder::Mono,
        3 => ChannelOrder::Bgr,
        4 => ChannelOrder::Bgra,
        _ => return None,
    };
    Some(ColorLayout::new(order, depth))
}

fn decode_legacy(data: &[u8], header: &str, mode: DecodeMode) -> Result<RawImage, TransportError> {
    let pixels = codecs::backend::decode_container(LEGACY, data, None)
        .map_err(|e| TransportError::decoding(e, header))?;
    ensure_not_empty(&pixels)?;

    let native = pixels
        .depth()
        .and_then(|depth| legacy_layout(pixels.channels, depth));
    let target = match forced_layout(mode, None) {
        Some(forced) => native.map(|_| forced),
        // Only gray and three-channel color have a legacy label.
        None => native.filter(|layout| layout.channels() != 4),
    };
    let (Some(source), Some(target)) = (native, target) else {
        error!(
            header,
            channels = pixels.channels,
            "Unsupported channel count in legacy payload"
        );
        return Err(unlabeled(LEGACY, header, &pixels));
    };

    let converted = color::convert(pixels, source, target)
        .map_err(|e| TransportError::conversion(e, LEGACY, header, true))?;
    into_image(converted, target.name(), LEGACY)
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_not_empty(pixels: &PixelBuffer) -> Result<(), TransportError> {
    if pixels.is_empty() {
        return Err(TransportError::EmptyDecodedFrame {
            width: pixels.width,
            height: pixels.height,
        });
    }
    Ok(())
}

fn unlabeled(codec: &'static str, encoding: &str, pixels: &PixelBuffer) -> TransportError {
    TransportError::UnsupportedChannelCount {
        codec,
        encoding: encoding.to_string(),
        channels: pixels.channels,
    }
}

fn into_image(
    pixels: PixelBuffer,
    encoding: String,
    codec: &'static str,
) -> Result<RawImage, TransportError> {
    RawImage::new(pixels.width, pixels.height, encoding.as_str(), pixels.data).map_err(|e| {
        TransportError::CodecDecodeFailure {
            codec,
            encoding,
            reason: e.to_string(),
        }
    })
}

/// Receiving side of the transport.
///
/// Mirrors [`Publisher`](crate::Publisher): one configuration snapshot per
/// payload, failures logged and dropped. Empty frames are dropped with a
/// notice only.
pub struct Subscriber {
    config: ArcSwap<TransportConfig>,
}

impl Subscriber {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn reconfigure(&self, config: TransportConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<TransportConfig> {
        self.config.load_full()
    }

    pub fn decode(&self, payload: &EncodedPayload) -> Result<RawImage, TransportError> {
        let config = self.config.load();
        decode(payload, &config)
    }

    /// Decode `payload` and hand the frame to `sink`.
    ///
    /// Returns `false` if the payload was dropped.
    pub fn receive(&self, payload: &EncodedPayload, sink: impl FnOnce(RawImage)) -> bool {
        deliver(payload, self.decode(payload), sink)
    }

    /// [`receive`](Self::receive), decoding tagged payloads with `codec`
    /// instead of the one the header names.
    pub fn receive_with_codec(
        &self,
        payload: &EncodedPayload,
        codec: &dyn Codec,
        sink: impl FnOnce(RawImage),
    ) -> bool {
        let mode = self.config.load().decode.mode;
        let result = match descriptor::parse(&payload.format) {
            Ok(FormatDescriptor::Tagged(descriptor)) => {
                decode_with_codec(&payload.data, &descriptor, codec, mode)
            }
            Ok(FormatDescriptor::Legacy { header }) => decode_legacy(&payload.data, &header, mode),
            Err(err) => Err(err.into()),
        };
        deliver(payload, result, sink)
    }
}

/// Hand a decoded frame to `sink`, or log why the payload is dropped.
fn deliver(
    payload: &EncodedPayload,
    result: Result<RawImage, TransportError>,
    sink: impl FnOnce(RawImage),
) -> bool {
    match result {
        Ok(image) => {
            sink(image);
            true
        }
        Err(err) if err.is_empty_frame() => {
            info!(format = %payload.format, "Dropping empty frame: {err}");
            false
        }
        Err(err) => {
            error!(
                format = %payload.format,
                bytes = payload.data.len(),
                "Dropping payload: {err}"
            );
            false
        }
    }
}

impl Default for Subscriber {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

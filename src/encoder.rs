//! Encode pipeline: raw frame in, header plus compressed bytes out.
//!
//! ```text
//! RawImage ─▶ select codec ─▶ check input domain ─▶ normalize layout ─▶ encode ─▶ EncodedPayload
//!             (config.format)  (layout table)        (color::normalize)          header: "<orig>; <codec> compressed[ <target>]"
//! ```
//!
//! Each call reads one configuration snapshot, so a concurrent
//! [`Publisher::reconfigure`] never mixes settings within a frame.

use crate::codecs::{self, Codec, CodecError, registry};
use crate::color;
use crate::config::TransportConfig;
use crate::descriptor;
use crate::error::TransportError;
use crate::types::{EncodedPayload, RawImage};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{debug, error};

/// Encode a frame with the codec named by `config.format`.
pub fn encode(image: &RawImage, config: &TransportConfig) -> Result<EncodedPayload, TransportError> {
    let id = codecs::CodecId::from_name(&config.format);
    let codec = registry::codec_for(id, config)
        .ok_or_else(|| TransportError::UnknownCodec(config.format.clone()))?;
    encode_with_codec(image, codec.as_ref())
}

/// Encode a frame with an already constructed codec.
pub fn encode_with_codec(
    image: &RawImage,
    codec: &dyn Codec,
) -> Result<EncodedPayload, TransportError> {
    let id = codec.id();
    let (Some(rule), Some(tag)) = (registry::rule(id), id.tag()) else {
        return Err(TransportError::UnknownCodec(id.name().to_string()));
    };
    let encoding = image.encoding();
    let fail = |err: CodecError| TransportError::encoding(err, encoding);

    rule.check_input(image).map_err(fail)?;
    let target = match image.layout() {
        Some(layout) => rule.encode_target(layout).map_err(fail)?,
        None => None,
    };
    let pixels = color::normalize(image, target)
        .map_err(|e| TransportError::conversion(e, id.name(), encoding, false))?;
    let raw_bytes = pixels.data.len();
    let data = codec.encode(&pixels).map_err(fail)?;

    debug!(
        codec = id.name(),
        encoding,
        bytes = data.len(),
        ratio = %format!("1:{:.2}", compression_ratio(raw_bytes, data.len())),
        "Compressed frame"
    );

    let target_name = target.map(|layout| layout.name());
    Ok(EncodedPayload::new(
        descriptor::serialize(encoding, tag, target_name.as_deref()),
        data,
    ))
}

/// Raw size over compressed size.
pub fn compression_ratio(raw_bytes: usize, compressed_bytes: usize) -> f64 {
    if compressed_bytes == 0 {
        return 0.0;
    }
    raw_bytes as f64 / compressed_bytes as f64
}

/// Sending side of the transport.
///
/// Holds the live configuration; every frame is encoded against one
/// snapshot of it. Failures are logged and the frame is dropped.
pub struct Publisher {
    config: ArcSwap<TransportConfig>,
}

impl Publisher {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Replace the configuration. Frames already being encoded keep the
    /// snapshot they started with.
    pub fn reconfigure(&self, config: TransportConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<TransportConfig> {
        self.config.load_full()
    }

    pub fn encode(&self, image: &RawImage) -> Result<EncodedPayload, TransportError> {
        let config = self.config.load();
        encode(image, &config)
    }

    /// Encode `image` and hand the payload to `sink`.
    ///
    /// Returns `false` if the frame was dropped.
    pub fn publish(&self, image: &RawImage, sink: impl FnOnce(EncodedPayload)) -> bool {
        let config = self.config.load();
        match encode(image, &config) {
            Ok(payload) => {
                sink(payload);
                true
            }
            Err(err) => {
                error!(
                    codec = %config.format,
                    encoding = image.encoding(),
                    channels = image.channels(),
                    "Dropping frame: {err}"
                );
                false
            }
        }
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

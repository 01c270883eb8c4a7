//! Transport-level error taxonomy.
//!
//! Every failure of the encode or decode pipeline is reported as a
//! [`TransportError`] carrying the codec and encoding involved. The
//! pipelines never retry; [`Publisher`](crate::Publisher) and
//! [`Subscriber`](crate::Subscriber) log the error and drop the message.

use crate::codecs::CodecError;
use crate::color::ConversionError;
use crate::descriptor::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("{codec} compression requires 8/16-bit samples (input format is: {encoding}, {bit_depth}-bit)")]
    UnsupportedBitDepth {
        codec: &'static str,
        encoding: String,
        bit_depth: u8,
    },
    #[error("{codec} compression cannot handle {channels} channels (input format is: {encoding})")]
    UnsupportedChannelCount {
        codec: &'static str,
        encoding: String,
        channels: usize,
    },
    #[error("unknown codec `{0}`")]
    UnknownCodec(String),
    #[error("{codec} encoding failed (input format is: {encoding}): {reason}")]
    CodecEncodeFailure {
        codec: &'static str,
        encoding: String,
        reason: String,
    },
    #[error("{codec} decoding failed (format is: {encoding}): {reason}")]
    CodecDecodeFailure {
        codec: &'static str,
        encoding: String,
        reason: String,
    },
    #[error("malformed format header `{header}`: {reason}")]
    MalformedHeader { header: String, reason: String },
    #[error("decoded frame is empty ({width}x{height})")]
    EmptyDecodedFrame { width: u32, height: u32 },
}

impl From<ParseError> for TransportError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownCodec(token) => TransportError::UnknownCodec(token),
            ParseError::MalformedHeader { header, reason } => TransportError::MalformedHeader {
                header,
                reason: reason.to_string(),
            },
        }
    }
}

impl TransportError {
    /// Attach the frame encoding to a codec failure raised while encoding.
    pub(crate) fn encoding(err: CodecError, encoding: &str) -> Self {
        match err {
            CodecError::DecodeFailed { codec, reason } | CodecError::EncodeFailed { codec, reason } => {
                TransportError::CodecEncodeFailure {
                    codec,
                    encoding: encoding.to_string(),
                    reason,
                }
            }
            other => Self::unsupported(other, encoding),
        }
    }

    /// Attach the payload encoding to a codec failure raised while decoding.
    pub(crate) fn decoding(err: CodecError, encoding: &str) -> Self {
        match err {
            CodecError::DecodeFailed { codec, reason } | CodecError::EncodeFailed { codec, reason } => {
                TransportError::CodecDecodeFailure {
                    codec,
                    encoding: encoding.to_string(),
                    reason,
                }
            }
            other => Self::unsupported(other, encoding),
        }
    }

    /// A layout conversion failure inside the `codec` pipeline.
    pub(crate) fn conversion(
        err: ConversionError,
        codec: &'static str,
        encoding: &str,
        decoding: bool,
    ) -> Self {
        let encoding = encoding.to_string();
        let reason = err.to_string();
        if decoding {
            TransportError::CodecDecodeFailure {
                codec,
                encoding,
                reason,
            }
        } else {
            TransportError::CodecEncodeFailure {
                codec,
                encoding,
                reason,
            }
        }
    }

    fn unsupported(err: CodecError, encoding: &str) -> Self {
        let encoding = encoding.to_string();
        match err {
            CodecError::UnsupportedBitDepth { codec, bit_depth } => {
                TransportError::UnsupportedBitDepth {
                    codec,
                    encoding,
                    bit_depth,
                }
            }
            CodecError::UnsupportedChannelCount { codec, channels } => {
                TransportError::UnsupportedChannelCount {
                    codec,
                    encoding,
                    channels,
                }
            }
            CodecError::EncodeFailed { codec, reason } => TransportError::CodecEncodeFailure {
                codec,
                encoding,
                reason,
            },
            CodecError::DecodeFailed { codec, reason } => TransportError::CodecDecodeFailure {
                codec,
                encoding,
                reason,
            },
        }
    }

    /// Empty decoded frames are an expected condition, not a failure.
    pub fn is_empty_frame(&self) -> bool {
        matches!(self, TransportError::EmptyDecodedFrame { .. })
    }
}

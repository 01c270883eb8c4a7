//! Format descriptor: the header string that travels with every payload.
//!
//! ```text
//! <original_encoding>; <codec> compressed[ <target_encoding>]
//!
//! rgb8; jpeg compressed bgr8     color frame, converted to BGR before JPEG
//! mono16; png compressed         mono frame, handed to PNG unchanged
//! bgra8; qoi compressed rgba8    BGRA frame, swapped to QOI's native RGBA
//! bgr8                           legacy sender: no descriptor at all
//! ```
//!
//! `"; "` is the only delimiter between the original encoding and the rest.
//! Everything after it is split into whitespace-separated words; the first
//! word must be one of the known codec tokens (`jpeg`, `png`, `qoi`), an
//! optional `compressed` follows, and the next word, if any, is the target
//! encoding. Positions inside the string are never relied upon.

use std::fmt;
use thiserror::Error;

/// Separator between the original encoding and the codec tag.
pub const SEPARATOR: &str = "; ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown codec `{0}` in format header")]
    UnknownCodec(String),
    #[error("malformed format header `{header}`: {reason}")]
    MalformedHeader { header: String, reason: &'static str },
}

/// Codec families a header can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecTag {
    Jpeg,
    Png,
    Qoi,
}

impl CodecTag {
    pub const ALL: [CodecTag; 3] = [CodecTag::Jpeg, CodecTag::Png, CodecTag::Qoi];

    /// The word identifying the codec in a header.
    pub const fn token(self) -> &'static str {
        match self {
            CodecTag::Jpeg => "jpeg",
            CodecTag::Png => "png",
            CodecTag::Qoi => "qoi",
        }
    }

    pub fn from_token(token: &str) -> Option<CodecTag> {
        Self::ALL.into_iter().find(|tag| tag.token() == token)
    }
}

impl fmt::Display for CodecTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} compressed", self.token())
    }
}

/// A fully specified header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub original_encoding: String,
    pub codec: CodecTag,
    /// Layout handed to the codec, present whenever the codec's color rule
    /// ran before encoding.
    pub target_encoding: Option<String>,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.original_encoding, self.codec)?;
        if let Some(target) = &self.target_encoding {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// What a receiver learns from a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatDescriptor {
    Tagged(Descriptor),
    /// Header without a separator, as written by senders that predate the
    /// descriptor. Only the raw text is known; the pixel layout has to be
    /// inferred from the decoded data.
    Legacy { header: String },
}

/// Build the header for a payload.
pub fn serialize(original_encoding: &str, codec: CodecTag, target_encoding: Option<&str>) -> String {
    Descriptor {
        original_encoding: original_encoding.to_string(),
        codec,
        target_encoding: target_encoding.map(str::to_string),
    }
    .to_string()
}

/// Parse a header into a [`FormatDescriptor`].
pub fn parse(header: &str) -> Result<FormatDescriptor, ParseError> {
    let Some((original, rest)) = header.split_once(SEPARATOR) else {
        return Ok(FormatDescriptor::Legacy {
            header: header.to_string(),
        });
    };
    let malformed = |reason| ParseError::MalformedHeader {
        header: header.to_string(),
        reason,
    };

    let original = original.trim();
    if original.is_empty() {
        return Err(malformed("missing original encoding"));
    }

    let mut words = rest.split_whitespace().peekable();
    let token = words.next().ok_or_else(|| malformed("missing codec"))?;
    let codec = CodecTag::from_token(token).ok_or_else(|| ParseError::UnknownCodec(token.into()))?;
    let _ = words.next_if_eq(&"compressed");
    let target_encoding = words.next().map(str::to_string);
    if words.next().is_some() {
        return Err(malformed("trailing words after target encoding"));
    }

    Ok(FormatDescriptor::Tagged(Descriptor {
        original_encoding: original.to_string(),
        codec,
        target_encoding,
    }))
}

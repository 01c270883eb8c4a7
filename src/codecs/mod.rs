//! Codec adapters: JPEG, PNG and QOI behind one trait.
//!
//! | Codec | Encoder | Decoder | Accepts |
//! |---|---|---|---|
//! | **JPEG** | `jpeg-encoder` (quality, progressive, optimized Huffman, restart interval) | `image` crate | mono or BGR/BGRA, 8 or 16-bit (16-bit reduced to 8) |
//! | **PNG** | `image::codecs::png::PngEncoder` | `image` crate | 1–4 channels, 8 or 16-bit, color in BGR order |
//! | **QOI** | `qoi` crate | `qoi` crate (header is authoritative) | RGB8 or RGBA8 only |
//!
//! The module is split into:
//! - **Backend**: the [`Codec`] trait, [`PixelBuffer`], [`CodecError`] and the
//!   shared container decoder
//! - **Parameters**: quality and compression settings
//! - **Registry**: [`CodecId`], the per-codec layout table and codec selection
//! - **Adapters**: [`JpegCodec`], [`PngCodec`], [`QoiCodec`]

pub mod backend;
pub mod jpeg;
mod params;
pub mod png;
pub mod qoi;
pub mod registry;

pub use backend::{Codec, CodecError, Decoded, PixelBuffer};
pub use jpeg::JpegCodec;
pub use params::{CompressionLevel, JpegParams, PngParams, Quality};
pub use png::PngCodec;
pub use qoi::{QoiCodec, QoiColorspace, QoiHeader};
pub use registry::{CodecId, LayoutRule, codec_for};

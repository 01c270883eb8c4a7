//! # Compressed Transport
//!
//! Compresses raw image frames into self-describing payloads and restores
//! them. A payload is the compressed bytes plus a short text header naming
//! the original encoding, the codec, and the layout that was handed to the
//! codec:
//!
//! ```text
//! rgb8; jpeg compressed bgr8
//! ```
//!
//! # Architecture: Two Pipelines Around a Header
//!
//! ```text
//! encode   RawImage ─▶ layout rule ─▶ color::normalize ─▶ Codec::encode ─▶ EncodedPayload
//! decode   EncodedPayload ─▶ descriptor::parse ─▶ Codec::decode ─▶ restore layout ─▶ RawImage
//! ```
//!
//! The header is the only state shared between the two sides. Everything a
//! decoder needs to put the frame back (channel order, bit depth, alpha) is
//! either in the header or in the compressed stream itself.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`encoding`] | Encoding names (`rgb8`, `16UC1`, ...) and the color layouts they describe |
//! | [`types`] | `RawImage` frames and `EncodedPayload` messages |
//! | [`descriptor`] | Format header grammar: serialize and parse |
//! | [`codecs`] | The `Codec` trait, JPEG/PNG/QOI adapters and the layout table |
//! | [`color`] | Channel order and bit depth conversion |
//! | [`encoder`] | Encode pipeline and the reconfigurable [`Publisher`] |
//! | [`decoder`] | Decode pipeline and the reconfigurable [`Subscriber`] |
//! | [`config`] | Layered `transport.toml` loading and validation |
//! | [`error`] | `TransportError`, the error every pipeline call returns |
//! | [`frames`] | Image files ↔ frames for the command-line tool |
//! | [`batch`] | Parallel batch encode and file decode for the command-line tool |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Codecs Work in Their Own Channel Order
//!
//! JPEG and PNG adapters are fed blue-first data at the frame's depth, QOI is
//! fed red-first 8-bit data. The encoder converts to that layout and records
//! it as the header's target, so the decoder never has to guess what the
//! codec saw.
//!
//! ## Failures Drop One Frame
//!
//! [`Publisher::publish`] and [`Subscriber::receive`] log and drop a frame
//! that cannot be processed. Nothing is retried, and the next frame is
//! processed normally. The plain [`encode`] and [`decode`] functions return
//! the error instead.
//!
//! ## Live Reconfiguration
//!
//! Publishers and subscribers hold their configuration behind an
//! `arc_swap::ArcSwap`. Each frame loads one snapshot, so swapping the codec
//! mid-stream never mixes settings within a frame.

pub mod batch;
pub mod codecs;
pub mod color;
pub mod config;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod frames;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::TransportConfig;
pub use decoder::{Subscriber, decode};
pub use encoder::{Publisher, encode};
pub use error::TransportError;
pub use types::{EncodedPayload, RawImage};

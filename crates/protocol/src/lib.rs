//! # Weight Map Protocol Library
//!
//! Wire format for talking to a weight map / path planning server.
//!
//! ## Architecture
//!
//! ### 1. Call Headers ([`packets`])
//! [`Opcode`] values for requests and [`ResponseStatus`] values for responses.
//!
//! ### 2. Frames ([`frame`])
//! Every transmission is a fixed [`FRAME_SIZE`] buffer:
//! `{i32 header}{payload}{zero padding}`. Oversized requests fail with
//! `ProtocolOverflow` rather than being truncated.
//!
//! ### 3. Codecs ([`codecs`])
//! Little-endian argument writers and bounds-checked payload readers.
//!
//! ### 4. Method Registry ([`registry`])
//! Opcode to (encoder, decoder) table.
//!
//! ### 5. Geometry payloads ([`path`], [`grid`], [`compression`])
//! Path decoding and decompression, zlib grid decoding.
//!
//! ## Multi-frame responses
//!
//! A response longer than one frame is sent as a run of `CONTINUE` frames
//! followed by one terminal frame. The client acknowledges each `CONTINUE`
//! with [`ack_frame`]. Assembly lives in the network crate's session.

pub mod codecs;
pub mod compression;
pub mod frame;
pub mod grid;
pub mod packets;
pub mod path;
pub mod registry;

// Re-export commonly used items
pub use codecs::Arg;
pub use frame::*;
pub use grid::{decode_grid, WeightGrid};
pub use packets::*;
pub use path::{decode_path, decompress_path};
pub use registry::*;

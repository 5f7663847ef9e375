//! # blurhash-core
//!
//! BlurHash encoding and decoding in pure Rust.
//!
//! [BlurHash](https://blurha.sh/) is a compact representation of a placeholder
//! for an image. This crate provides the codec itself, the base83 symbol
//! packing it relies on, an aspect-ratio aware dimension planner and cheap
//! average colour extraction from an existing hash.
//!
//! Decoding is a pure `f64` computation: identical `(hash, width, height)`
//! inputs always produce identical bytes, which makes decoded output safe to
//! cache.
//!
//! ## Quick Start
//!
//! ```
//! use blurhash_core::{average_color, decode, encode, plan_components};
//!
//! // Encode: image pixels -> BlurHash string
//! let pixels = vec![128u8; 4 * 4 * 3]; // 4x4 gray image
//! let (cx, cy) = plan_components(12, 1.0).unwrap();
//! let hash = encode(&pixels, 4, 4, cx, cy).unwrap();
//! assert_eq!(hash.len(), 4 + 2 * (cx * cy) as usize);
//!
//! // Decode: BlurHash string -> image pixels
//! let decoded = decode(&hash, 32, 32).unwrap();
//! assert_eq!(decoded.len(), 32 * 32 * 3);
//!
//! assert_eq!(average_color(&hash).unwrap().to_hex(), "#808080");
//! ```

pub mod base83;
pub mod color;
pub mod dimensions;
pub mod error;

mod average;
mod decode_impl;
mod encode_impl;
mod grid;

// Re-export primary functions at crate root.
pub use average::{average_color, average_color_or};
pub use color::{linear_to_srgb, sign_pow, srgb_to_linear, Rgb};
pub use decode_impl::{components, decode, decode_grid, decode_with_punch, validate};
pub use dimensions::{plan, plan_components};
pub use encode_impl::{encode, encode_grid};
pub use error::BlurhashError;
pub use grid::PixelGrid;

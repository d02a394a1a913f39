//! Reusable video building blocks for an indexed-colour, tile-based console.
//!
//! The drawing engine only ever deals in 4-bit colour indices; these pieces
//! cover the two places where raw bytes meet those indices: decoding tile
//! pixels out of packed sheets, and resolving indices to displayable colours.

pub mod palette;
pub mod tile;

pub use palette::{IndexedPalette, RgbPalette};
pub use tile::{TileDecoder, TileFormat};

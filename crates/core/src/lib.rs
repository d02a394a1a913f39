//! Core fantasy-console primitives shared by the drawing engine and frontends.

pub mod config;
pub mod logging;
pub mod ppu;
pub mod types {
    use serde::{Deserialize, Serialize};

    /// A resolved, displayable frame in ARGB8888.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Flatten to tightly packed RGBA bytes (for image encoders).
        pub fn to_rgba(&self) -> Vec<u8> {
            let mut out = Vec::with_capacity(self.pixels.len() * 4);
            for &p in &self.pixels {
                out.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8]);
            }
            out
        }
    }
}

//! Per-call colour mapping.
//!
//! Every drawing call resolves its colours through the global [`ColorMap`]
//! first. Calls that take a transparency list build a [`Mapping`] for the
//! duration of that call only: the listed nominal colours resolve to
//! [`TRANSPARENT`] and are skipped by the writers.

use crate::memory::ColorMap;

/// Sentinel for "do not write this pixel". Outside the 4-bit colour range.
pub const TRANSPARENT: u8 = 255;

/// Source colour index -> framebuffer colour (or [`TRANSPARENT`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping([u8; 16]);

impl Mapping {
    /// Global remap with `keys` overlaid as transparent. Keys are masked
    /// to 4 bits; an empty list keys nothing.
    pub fn new(map: &ColorMap, keys: &[u8]) -> Self {
        let mut table = [0u8; 16];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = map.get(i as u8);
        }
        for &key in keys {
            table[(key & 0x0F) as usize] = TRANSPARENT;
        }
        Mapping(table)
    }

    /// Explicit table; unspecified entries are transparent. Used for glyph
    /// overlays where index 0 is background and 1 is ink.
    pub fn from_entries(entries: &[u8]) -> Self {
        let mut table = [TRANSPARENT; 16];
        for (slot, &value) in table.iter_mut().zip(entries) {
            *slot = value;
        }
        Mapping(table)
    }

    #[inline]
    pub fn get(&self, color: u8) -> u8 {
        self.0[(color & 0x0F) as usize]
    }

    #[inline]
    pub fn is_transparent(&self, color: u8) -> bool {
        self.get(color) == TRANSPARENT
    }
}

/// Resolve a single drawing colour through the global remap table.
#[inline]
pub fn map_color(map: &ColorMap, color: u8) -> u8 {
    map.get(color & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_without_keys() {
        let mapping = Mapping::new(&ColorMap::identity(), &[]);
        for i in 0..16 {
            assert_eq!(mapping.get(i), i);
        }
    }

    #[test]
    fn test_keys_become_transparent() {
        let mapping = Mapping::new(&ColorMap::identity(), &[0, 7]);
        assert!(mapping.is_transparent(0));
        assert!(mapping.is_transparent(7));
        assert_eq!(mapping.get(1), 1);
    }

    #[test]
    fn test_out_of_range_key_is_masked() {
        let mapping = Mapping::new(&ColorMap::identity(), &[0x13]);
        assert!(mapping.is_transparent(3));
        assert_eq!(mapping.get(0x12), 2);
    }

    #[test]
    fn test_remap_applies_before_keys() {
        let mut map = ColorMap::identity();
        map.set(2, 9);
        let mapping = Mapping::new(&map, &[4]);
        assert_eq!(mapping.get(2), 9);
        assert!(mapping.is_transparent(4));
        // Keys are nominal: 9 itself still resolves normally
        assert_eq!(mapping.get(9), 9);
    }

    #[test]
    fn test_from_entries_defaults_to_transparent() {
        let mapping = Mapping::from_entries(&[TRANSPARENT, 12]);
        assert!(mapping.is_transparent(0));
        assert_eq!(mapping.get(1), 12);
        assert!(mapping.is_transparent(2));
    }

    #[test]
    fn test_map_color_masks() {
        let mut map = ColorMap::identity();
        map.set(1, 14);
        assert_eq!(map_color(&map, 0x11), 14);
    }
}

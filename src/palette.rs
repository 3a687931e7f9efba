/*!
Fixed 64-entry master palette mapping PPU colour indices to RGBA.

The PPU writes indices (0..=63) into its screen buffer; hosts convert them
through `NES_PALETTE` (or `Rgba::from_index`) when presenting a frame.
Entries $0D-$0F, $1D-$1F, $2E-$2F and $3E-$3F are black.
*/

/// One 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Palette lookup; only the low six bits of `index` are used.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        NES_PALETTE[(index & 0x3F) as usize]
    }

    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

const fn c(r: u8, g: u8, b: u8) -> Rgba {
    Rgba::opaque(r, g, b)
}

pub const NES_PALETTE: [Rgba; 64] = [
    // $00-$0F
    c(0x7C, 0x7C, 0x7C),
    c(0x00, 0x00, 0xFC),
    c(0x00, 0x00, 0xBC),
    c(0x44, 0x28, 0xBC),
    c(0x94, 0x00, 0x84),
    c(0xA8, 0x00, 0x20),
    c(0xA8, 0x10, 0x00),
    c(0x88, 0x14, 0x00),
    c(0x50, 0x30, 0x00),
    c(0x00, 0x78, 0x00),
    c(0x00, 0x68, 0x00),
    c(0x00, 0x58, 0x00),
    c(0x00, 0x40, 0x58),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    // $10-$1F
    c(0xBC, 0xBC, 0xBC),
    c(0x00, 0x78, 0xF8),
    c(0x00, 0x58, 0xF8),
    c(0x68, 0x44, 0xFC),
    c(0xD8, 0x00, 0xCC),
    c(0xE4, 0x00, 0x58),
    c(0xF8, 0x38, 0x00),
    c(0xE4, 0x5C, 0x10),
    c(0xAC, 0x7C, 0x00),
    c(0x00, 0xB8, 0x00),
    c(0x00, 0xA8, 0x00),
    c(0x00, 0xA8, 0x44),
    c(0x00, 0x88, 0x88),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    // $20-$2F
    c(0xF8, 0xF8, 0xF8),
    c(0x3C, 0xBC, 0xFC),
    c(0x68, 0x88, 0xFC),
    c(0x98, 0x78, 0xF8),
    c(0xF8, 0x78, 0xF8),
    c(0xF8, 0x58, 0x98),
    c(0xF8, 0x78, 0x58),
    c(0xFC, 0xA0, 0x44),
    c(0xF8, 0xB8, 0x00),
    c(0xB8, 0xF8, 0x18),
    c(0x58, 0xD8, 0x54),
    c(0x58, 0xF8, 0x98),
    c(0x00, 0xE8, 0xD8),
    c(0x78, 0x78, 0x78),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
    // $30-$3F
    c(0xFC, 0xFC, 0xFC),
    c(0xA4, 0xE4, 0xFC),
    c(0xB8, 0xB8, 0xF8),
    c(0xD8, 0xB8, 0xF8),
    c(0xF8, 0xB8, 0xF8),
    c(0xF8, 0xA4, 0xC0),
    c(0xF0, 0xD0, 0xB0),
    c(0xFC, 0xE0, 0xA8),
    c(0xF8, 0xD8, 0x78),
    c(0xD8, 0xF8, 0x78),
    c(0xB8, 0xF8, 0xB8),
    c(0xB8, 0xF8, 0xD8),
    c(0x00, 0xFC, 0xFC),
    c(0xF8, 0xD8, 0xF8),
    c(0x00, 0x00, 0x00),
    c(0x00, 0x00, 0x00),
];

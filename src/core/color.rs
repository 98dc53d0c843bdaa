//! Series palette.
//!
//! Ten qualitative colours, cycled by series index.

use plotters::style::RGBColor;

pub const PALETTE: [RGBColor; 10] = [
    RGBColor(0x63, 0x6E, 0xFA),
    RGBColor(0xEF, 0x55, 0x3B),
    RGBColor(0x00, 0xCC, 0x96),
    RGBColor(0xAB, 0x63, 0xFA),
    RGBColor(0xFF, 0xA1, 0x5A),
    RGBColor(0x19, 0xD3, 0xF3),
    RGBColor(0xFF, 0x66, 0x92),
    RGBColor(0xB6, 0xE8, 0x80),
    RGBColor(0xFF, 0x97, 0xFF),
    RGBColor(0xFE, 0xCB, 0x52),
];

/// Plot background.
pub const BACKGROUND: RGBColor = RGBColor(0xE5, 0xEC, 0xF6);
/// Grid lines drawn over the background.
pub const GRID: RGBColor = RGBColor(0xFF, 0xFF, 0xFF);

/// Colour of the `i`-th series.
#[inline]
pub fn series_color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

use plotters::style::RGBColor;

// Dark theme matching the site stylesheet.
pub const BACKGROUND: RGBColor = RGBColor(0x14, 0x14, 0x14);
pub const EDGE_COLOR: RGBColor = RGBColor(0x2a, 0x2a, 0x2a);
pub const GRID_COLOR: RGBColor = RGBColor(0x2a, 0x2a, 0x2a);
pub const TEXT_COLOR: RGBColor = RGBColor(0xf5, 0xf5, 0xf5);
pub const TICK_COLOR: RGBColor = RGBColor(0xa3, 0xa3, 0xa3);
pub const LEGEND_BACKGROUND: RGBColor = RGBColor(0x1e, 0x1e, 0x1e);
pub const LEGEND_EDGE_COLOR: RGBColor = RGBColor(0x2a, 0x2a, 0x2a);

pub const PALETTE: [RGBColor; 6] = [
    RGBColor(0x63, 0x66, 0xf1), // indigo
    RGBColor(0xf5, 0x9e, 0x0b), // amber
    RGBColor(0x22, 0xc5, 0x5e), // green
    RGBColor(0x3b, 0x82, 0xf6), // blue
    RGBColor(0xfb, 0x71, 0x85), // pink
    RGBColor(0x34, 0xd3, 0x99), // emerald
];

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

//! Colours used by the chart renderers.

use plotters::style::RGBColor;

// ── Named colours ─────────────────────────────────────────────────────────────

pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const MEDIUM_SEA_GREEN: RGBColor = RGBColor(60, 179, 113);
pub const CORNFLOWER_BLUE: RGBColor = RGBColor(100, 149, 237);
pub const LIGHT_SALMON: RGBColor = RGBColor(255, 160, 122);
pub const MEDIUM_SLATE_BLUE: RGBColor = RGBColor(123, 104, 238);
pub const PLUM: RGBColor = RGBColor(221, 160, 221);
pub const SEA_GREEN: RGBColor = RGBColor(46, 139, 87);
pub const TOMATO: RGBColor = RGBColor(255, 99, 71);
pub const ROYAL_BLUE: RGBColor = RGBColor(65, 105, 225);
pub const LIGHT_GRAY: RGBColor = RGBColor(211, 211, 211);
pub const GRAY: RGBColor = RGBColor(128, 128, 128);
pub const GRID_GRAY: RGBColor = RGBColor(200, 200, 200);
pub const HEADER_FILL: RGBColor = RGBColor(232, 236, 244);

/// Twenty-colour categorical cycle (pairs of dark and light hues).
pub const TAB20: [RGBColor; 20] = [
    RGBColor(31, 119, 180),
    RGBColor(174, 199, 232),
    RGBColor(255, 127, 14),
    RGBColor(255, 187, 120),
    RGBColor(44, 160, 44),
    RGBColor(152, 223, 138),
    RGBColor(214, 39, 40),
    RGBColor(255, 152, 150),
    RGBColor(148, 103, 189),
    RGBColor(197, 176, 213),
    RGBColor(140, 86, 75),
    RGBColor(196, 156, 148),
    RGBColor(227, 119, 194),
    RGBColor(247, 182, 210),
    RGBColor(127, 127, 127),
    RGBColor(199, 199, 199),
    RGBColor(188, 189, 34),
    RGBColor(219, 219, 141),
    RGBColor(23, 190, 207),
    RGBColor(158, 218, 229),
];

/// Ten-colour cycle; the dark half of [`TAB20`].
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Colour `index` of the twenty-colour cycle, wrapping around.
pub fn categorical(index: usize) -> RGBColor {
    TAB20[index % TAB20.len()]
}

/// Colour `index` of the ten-colour cycle, wrapping around.
pub fn slice_color(index: usize) -> RGBColor {
    TAB10[index % TAB10.len()]
}

/// Relative luminance on a `0.0..=1.0` scale.
pub fn luminance(color: RGBColor) -> f64 {
    let RGBColor(r, g, b) = color;
    0.2126 * f64::from(r) / 255.0 + 0.7152 * f64::from(g) / 255.0 + 0.0722 * f64::from(b) / 255.0
}

/// White on dark fills, black on light ones.
pub fn text_color_on(fill: RGBColor) -> RGBColor {
    if luminance(fill) < 0.5 {
        RGBColor(255, 255, 255)
    } else {
        RGBColor(0, 0, 0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Envelope color parsing.

use canvashub_core::PALETTE;
use peniko::Color;

/// Parse a hex color string (`#rgb`, `#rrggbb`, `#rrggbbaa`).
///
/// Returns `None` for anything else, including stray non-hex digits.
pub fn parse_hex(color: &str) -> Option<Color> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            // #rgb -> #rrggbb
            let mut rgb = hex.chars().map(|c| c.to_digit(16).map(|d| d as u8 * 17));
            let r = rgb.next()??;
            let g = rgb.next()??;
            let b = rgb.next()??;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        6 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// The default palette entry as a color.
pub fn default_color() -> Color {
    parse_hex(PALETTE[0]).unwrap_or(Color::from_rgba8(99, 102, 241, 255))
}

/// Border color for an envelope, falling back to the default palette entry.
pub fn border_color(color: &str) -> Color {
    parse_hex(color).unwrap_or_else(|| {
        log::debug!("Unparseable envelope color {:?}, using default", color);
        default_color()
    })
}

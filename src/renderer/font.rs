//! 4x4 bitmap font
//!
//! Text is drawn as one small quad per lit glyph pixel. Units: a glyph is one
//! text unit square before scaling, origin at the top-left of the first glyph,
//! y up.

use glam::Vec2;

/// Glyph pixels per side
pub const GLYPH_PIXELS: u32 = 4;
/// Size of one glyph pixel in text units
pub const PIXEL_SIZE: f32 = 1.0 / GLYPH_PIXELS as f32;
/// Horizontal distance between glyph origins (one blank pixel column)
pub const ADVANCE: f32 = PIXEL_SIZE * (GLYPH_PIXELS + 1) as f32;

/// Rows top to bottom, bit 3 is the leftmost pixel
fn glyph(c: char) -> Option<[u8; 4]> {
    let rows = match c {
        '0' => [0b1111, 0b1001, 0b1001, 0b1111],
        '1' => [0b0010, 0b0110, 0b0010, 0b0111],
        '2' => [0b1110, 0b0001, 0b0110, 0b1111],
        '3' => [0b1111, 0b0011, 0b0001, 0b1111],
        '4' => [0b1001, 0b1001, 0b1111, 0b0001],
        '5' => [0b1111, 0b1110, 0b0001, 0b1110],
        '6' => [0b1000, 0b1111, 0b1001, 0b1111],
        '7' => [0b1111, 0b0001, 0b0010, 0b0100],
        '8' => [0b1111, 0b0110, 0b1001, 0b1111],
        '9' => [0b1111, 0b1001, 0b1111, 0b0001],
        '-' => [0b0000, 0b1111, 0b0000, 0b0000],
        ':' => [0b0100, 0b0000, 0b0100, 0b0000],
        _ => return None,
    };
    Some(rows)
}

/// Whether `c` has a glyph (anything else renders as blank space)
#[cfg(test)]
fn is_supported(c: char) -> bool {
    glyph(c).is_some()
}

/// Centers of every lit glyph pixel, in unscaled text units
pub fn layout(text: &str) -> Vec<Vec2> {
    let mut cells = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let origin_x = i as f32 * ADVANCE;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_PIXELS {
                if bits & (0b1000 >> col) != 0 {
                    cells.push(Vec2::new(
                        origin_x + (col as f32 + 0.5) * PIXEL_SIZE,
                        -(row as f32 + 0.5) * PIXEL_SIZE,
                    ));
                }
            }
        }
    }
    cells
}

/// Width of `text` in unscaled text units
#[cfg(test)]
fn text_width(text: &str) -> f32 {
    match text.chars().count() {
        0 => 0.0,
        n => n as f32 * ADVANCE - PIXEL_SIZE,
    }
}

//! A tiny 5x7 bitmap font, enough to render timestamps without depending on any font
//! files being installed.

use image::{Rgb, RgbImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal distance between the starts of two glyphs, at scale 1.
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

type Glyph = [u8; GLYPH_HEIGHT as usize];

const EMPTY: Glyph = [0; GLYPH_HEIGHT as usize];

// Each row is five bits wide, the most significant one is the leftmost pixel.
fn glyph(c: char) -> Glyph {
    match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        _ => EMPTY,
    }
}

/// Width and height in pixels of `text` rendered at `scale`.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    let width = match chars {
        0 => 0,
        n => (n * GLYPH_ADVANCE - 1) * scale,
    };
    (width, GLYPH_HEIGHT * scale)
}

/// Draws `text` with its top left corner at (`x`, `y`). Pixels outside of the image are
/// silently skipped.
pub fn draw_text(img: &mut RgbImage, text: &str, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    let scale_i = i64::from(scale);
    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i64 * i64::from(GLYPH_ADVANCE) * scale_i;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + i64::from(col) * scale_i;
                let py = y + row as i64 * scale_i;
                fill_square(img, px, py, scale, color);
            }
        }
    }
}

fn fill_square(img: &mut RgbImage, x: i64, y: i64, side: u32, color: Rgb<u8>) {
    let side = i64::from(side);
    let (width, height) = (i64::from(img.width()), i64::from(img.height()));
    for py in y.max(0)..(y + side).min(height) {
        for px in x.max(0)..(x + side).min(width) {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
}

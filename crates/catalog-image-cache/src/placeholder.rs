//! Deterministic "no image" tile
//!
//! Synthesized once per process, never touches the network or filesystem.
//! Substituted whenever a row has no usable URL or every fetch fallback
//! has been exhausted.

use image::{Rgb, RgbImage};
use std::sync::{Arc, OnceLock};

pub const PLACEHOLDER_WIDTH: u32 = 300;
pub const PLACEHOLDER_HEIGHT: u32 = 300;

const BACKGROUND: Rgb<u8> = Rgb([0xf0, 0xf0, 0xf0]);
const BORDER: Rgb<u8> = Rgb([0xcc, 0xcc, 0xcc]);
const LABEL: Rgb<u8> = Rgb([0x99, 0x99, 0x99]);

const BORDER_INSET: u32 = 10;
const BORDER_WIDTH: u32 = 2;

const LABEL_TEXT: &str = "SIN IMAGEN";

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SPACING: u32 = 1;
const GLYPH_SCALE: u32 = 3;

/// Shared placeholder tile, generated on first use.
pub fn placeholder() -> Arc<RgbImage> {
    static TILE: OnceLock<Arc<RgbImage>> = OnceLock::new();
    TILE.get_or_init(|| Arc::new(generate())).clone()
}

fn generate() -> RgbImage {
    let mut tile = RgbImage::from_pixel(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, BACKGROUND);
    draw_border(&mut tile);
    draw_label(&mut tile, LABEL_TEXT);
    tile
}

fn draw_border(tile: &mut RgbImage) {
    let (w, h) = tile.dimensions();
    for dy in 0..BORDER_WIDTH {
        for x in BORDER_INSET..(w - BORDER_INSET) {
            tile.put_pixel(x, BORDER_INSET + dy, BORDER);
            tile.put_pixel(x, h - 1 - BORDER_INSET - dy, BORDER);
        }
    }
    for dx in 0..BORDER_WIDTH {
        for y in BORDER_INSET..(h - BORDER_INSET) {
            tile.put_pixel(BORDER_INSET + dx, y, BORDER);
            tile.put_pixel(w - 1 - BORDER_INSET - dx, y, BORDER);
        }
    }
}

/// 5x7 bitmap rows for the label alphabet, most significant bit leftmost.
/// Unmapped characters (including space) render blank.
fn glyph(c: char) -> [u8; 7] {
    match c {
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        _ => [0; 7],
    }
}

fn draw_label(tile: &mut RgbImage, text: &str) {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return;
    }

    let advance = (GLYPH_WIDTH + GLYPH_SPACING) * GLYPH_SCALE;
    let text_w = advance * chars.len() as u32 - GLYPH_SPACING * GLYPH_SCALE;
    let text_h = GLYPH_HEIGHT * GLYPH_SCALE;
    let (w, h) = tile.dimensions();
    let x0 = w.saturating_sub(text_w) / 2;
    let y0 = h.saturating_sub(text_h) / 2;

    for (i, &c) in chars.iter().enumerate() {
        let rows = glyph(c);
        let gx = x0 + i as u32 * advance;
        for (ry, row) in rows.iter().enumerate() {
            for rx in 0..GLYPH_WIDTH {
                if row & (1 << (GLYPH_WIDTH - 1 - rx)) == 0 {
                    continue;
                }
                for sy in 0..GLYPH_SCALE {
                    for sx in 0..GLYPH_SCALE {
                        let px = gx + rx * GLYPH_SCALE + sx;
                        let py = y0 + ry as u32 * GLYPH_SCALE + sy;
                        if px < w && py < h {
                            tile.put_pixel(px, py, LABEL);
                        }
                    }
                }
            }
        }
    }
}

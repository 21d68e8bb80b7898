// SPDX-License-Identifier: GPL-3.0-or-later
use font8x8::{UnicodeFonts, BASIC_FONTS};
use imageproc::drawing::Canvas;

/// Size in pixels of a glyph at a scale of one.
const GLYPH_SIZE: u32 = 8;

/// Draw `text` with the built in 8x8 bitmap font.
///
/// `(x, y)` is the left end of the baseline, so the text extends upward from `y`. Each font
/// pixel is drawn as a `scale` pixel square. Characters without a glyph advance the cursor without
/// drawing anything, and pixels outside of the canvas are skipped.
pub(crate) fn draw_text<C>(canvas: &mut C, color: C::Pixel, x: i32, y: i32, scale: u32, text: &str)
where
    C: Canvas,
{
    let scale = scale.max(1) as i64;
    let glyph_size = i64::from(GLYPH_SIZE) * scale;
    let (width, height) = canvas.dimensions();
    let top = i64::from(y) - glyph_size;
    for (index, character) in text.chars().enumerate() {
        let glyph = match BASIC_FONTS.get(character) {
            Some(glyph) => glyph,
            None => continue,
        };
        let left = i64::from(x) + index as i64 * glyph_size;
        for (glyph_row, bits) in glyph.iter().enumerate() {
            for glyph_column in 0..GLYPH_SIZE as i64 {
                // The least significant bit is the leftmost pixel.
                if bits & (1 << glyph_column) == 0 {
                    continue;
                }
                let block_x = left + glyph_column * scale;
                let block_y = top + glyph_row as i64 * scale;
                for canvas_y in block_y..block_y + scale {
                    for canvas_x in block_x..block_x + scale {
                        if canvas_x < 0
                            || canvas_y < 0
                            || canvas_x >= i64::from(width)
                            || canvas_y >= i64::from(height)
                        {
                            continue;
                        }
                        canvas.draw_pixel(canvas_x as u32, canvas_y as u32, color);
                    }
                }
            }
        }
    }
}

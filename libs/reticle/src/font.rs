//! A 5x7 bitmap font for drawing label text as geometry.
//!
//! Mask writers ignore GDSII text elements, so reticle labels are drawn
//! as rectangles on the barcode layer instead.

use geometry::prelude::*;

/// Glyph width in pixels.
const WIDTH: i64 = 5;
/// Glyph height in pixels.
const HEIGHT: i64 = 7;
/// Distance between glyph origins, in pixels.
const ADVANCE: i64 = WIDTH + 1;

/// Rows of the glyph for `c`, top row first. Bit 4 is the leftmost column.
///
/// Covers every character a barcode label or date can hold.
fn glyph(c: char) -> Option<[u8; 7]> {
    Some(match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '$' => [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        ' ' => [0; 7],
        _ => return None,
    })
}

fn lit(row: u8, col: i64) -> bool {
    (row >> (WIDTH - 1 - col)) & 1 == 1
}

/// Draws `text` as rectangles `height` database units tall, centered on the origin.
///
/// Each run of lit pixels in a glyph row becomes one rectangle. Characters
/// without a glyph are left blank.
///
/// # Examples
///
/// ```
/// # use geometry::prelude::*;
/// # use reticle::font::render;
/// let rects = render("-", 70);
/// assert_eq!(rects, vec![Rect::from_sides(-25, -5, 25, 5)]);
/// ```
pub fn render(text: &str, height: i64) -> Vec<Rect> {
    let pixel = (height / HEIGHT).max(1);
    let len = text.chars().count() as i64;
    let dx = -(len * ADVANCE - 1) * pixel / 2;
    let dy = -HEIGHT * pixel / 2;

    let mut rects = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            tracing::warn!(character = ?c, "no glyph for character, leaving it blank");
            continue;
        };
        let left = i as i64 * ADVANCE;
        for (r, &row) in rows.iter().enumerate() {
            let y = HEIGHT - 1 - r as i64;
            let mut col = 0;
            while col < WIDTH {
                if !lit(row, col) {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < WIDTH && lit(row, col) {
                    col += 1;
                }
                rects.push(Rect::from_sides(
                    dx + (left + start) * pixel,
                    dy + y * pixel,
                    dx + (left + col) * pixel,
                    dy + (y + 1) * pixel,
                ));
            }
        }
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_barcode_character_has_a_glyph() {
        for c in "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-.$/+% ".chars() {
            let rows = glyph(c).unwrap();
            assert!(rows.iter().all(|&row| row < 1 << WIDTH), "glyph for {c:?}");
        }
        assert!(glyph('#').is_none());
    }

    #[test]
    fn text_is_centered_and_scaled_to_height() {
        let rects = render("LOT42", 700);
        let bbox = rects.bbox().unwrap();
        assert_eq!(bbox.height(), 700);
        // Five glyphs of five pixels with four one-pixel gaps.
        assert_eq!(bbox.width(), 29 * 100);
        assert!(bbox.center().x.abs() <= 100 && bbox.center().y.abs() <= 100);
    }

    #[test]
    fn runs_are_merged_per_row() {
        // Top row of "T" is one bar; the stem is one pixel per row.
        let rects = render("T", 7);
        assert_eq!(rects.len(), 7);
        assert_eq!(rects[0].width(), 5);
        assert!(rects[1..].iter().all(|r| r.width() == 1));
    }

    #[test]
    fn unknown_characters_leave_a_gap() {
        assert_eq!(render("#", 70), Vec::new());
        assert_eq!(render("A#A", 70).len(), 2 * render("A", 70).len());
    }
}

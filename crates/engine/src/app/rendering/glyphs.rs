pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;
pub const TEXT_SCALE: i32 = 2;
pub const GLYPH_ADVANCE_PX: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub const TEXT_HEIGHT_PX: i32 = GLYPH_HEIGHT * TEXT_SCALE;

/// Packs five 3-bit rows (top first, leftmost pixel in the high bit).
const fn pack(rows: [u16; 5]) -> u16 {
    (rows[0] << 12) | (rows[1] << 9) | (rows[2] << 6) | (rows[3] << 3) | rows[4]
}

pub(crate) fn glyph_bits(ch: char) -> Option<u16> {
    let bits = match ch.to_ascii_uppercase() {
        ' ' => 0,
        'A' => pack([0b010, 0b101, 0b111, 0b101, 0b101]),
        'B' => pack([0b110, 0b101, 0b110, 0b101, 0b110]),
        'C' => pack([0b011, 0b100, 0b100, 0b100, 0b011]),
        'D' => pack([0b110, 0b101, 0b101, 0b101, 0b110]),
        'E' => pack([0b111, 0b100, 0b110, 0b100, 0b111]),
        'F' => pack([0b111, 0b100, 0b110, 0b100, 0b100]),
        'G' => pack([0b011, 0b100, 0b101, 0b101, 0b011]),
        'H' => pack([0b101, 0b101, 0b111, 0b101, 0b101]),
        'I' => pack([0b111, 0b010, 0b010, 0b010, 0b111]),
        'J' => pack([0b001, 0b001, 0b001, 0b101, 0b010]),
        'K' => pack([0b101, 0b101, 0b110, 0b101, 0b101]),
        'L' => pack([0b100, 0b100, 0b100, 0b100, 0b111]),
        'M' => pack([0b101, 0b111, 0b111, 0b101, 0b101]),
        'N' => pack([0b110, 0b101, 0b101, 0b101, 0b101]),
        'O' => pack([0b010, 0b101, 0b101, 0b101, 0b010]),
        'P' => pack([0b110, 0b101, 0b110, 0b100, 0b100]),
        'Q' => pack([0b010, 0b101, 0b101, 0b110, 0b011]),
        'R' => pack([0b110, 0b101, 0b110, 0b101, 0b101]),
        'S' => pack([0b011, 0b100, 0b010, 0b001, 0b110]),
        'T' => pack([0b111, 0b010, 0b010, 0b010, 0b010]),
        'U' => pack([0b101, 0b101, 0b101, 0b101, 0b111]),
        'V' => pack([0b101, 0b101, 0b101, 0b101, 0b010]),
        'W' => pack([0b101, 0b101, 0b111, 0b111, 0b101]),
        'X' => pack([0b101, 0b101, 0b010, 0b101, 0b101]),
        'Y' => pack([0b101, 0b101, 0b010, 0b010, 0b010]),
        'Z' => pack([0b111, 0b001, 0b010, 0b100, 0b111]),
        '0' => pack([0b111, 0b101, 0b101, 0b101, 0b111]),
        '1' => pack([0b010, 0b110, 0b010, 0b010, 0b111]),
        '2' => pack([0b110, 0b001, 0b010, 0b100, 0b111]),
        '3' => pack([0b110, 0b001, 0b010, 0b001, 0b110]),
        '4' => pack([0b101, 0b101, 0b111, 0b001, 0b001]),
        '5' => pack([0b111, 0b100, 0b110, 0b001, 0b110]),
        '6' => pack([0b011, 0b100, 0b111, 0b101, 0b111]),
        '7' => pack([0b111, 0b001, 0b010, 0b010, 0b010]),
        '8' => pack([0b111, 0b101, 0b111, 0b101, 0b111]),
        '9' => pack([0b111, 0b101, 0b111, 0b001, 0b110]),
        '.' => pack([0b000, 0b000, 0b000, 0b000, 0b010]),
        ',' => pack([0b000, 0b000, 0b000, 0b010, 0b100]),
        '!' => pack([0b010, 0b010, 0b010, 0b000, 0b010]),
        '?' => pack([0b110, 0b001, 0b010, 0b000, 0b010]),
        ':' => pack([0b000, 0b010, 0b000, 0b010, 0b000]),
        '-' => pack([0b000, 0b000, 0b111, 0b000, 0b000]),
        '\'' => pack([0b010, 0b010, 0b000, 0b000, 0b000]),
        '(' => pack([0b001, 0b010, 0b010, 0b010, 0b001]),
        ')' => pack([0b100, 0b010, 0b010, 0b010, 0b100]),
        '/' => pack([0b001, 0b001, 0b010, 0b100, 0b100]),
        '+' => pack([0b000, 0b010, 0b111, 0b010, 0b000]),
        '%' => pack([0b101, 0b001, 0b010, 0b100, 0b101]),
        _ => return None,
    };
    Some(bits)
}

pub(crate) fn glyph_pixel_set(bits: u16, col: i32, row: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    bits & (1 << shift) != 0
}

pub fn text_width_px(text: &str) -> f32 {
    (text.chars().count() as i32 * GLYPH_ADVANCE_PX) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_letters_reuse_uppercase_glyphs() {
        assert_eq!(glyph_bits('e'), glyph_bits('E'));
        assert!(glyph_bits('e').is_some());
    }

    #[test]
    fn unknown_characters_have_no_glyph() {
        assert!(glyph_bits('~').is_none());
        assert!(glyph_bits('\u{e9}').is_none());
    }

    #[test]
    fn pixel_lookup_reads_rows_top_down_left_to_right() {
        let bits = glyph_bits('L').expect("glyph");
        assert!(glyph_pixel_set(bits, 0, 0));
        assert!(!glyph_pixel_set(bits, 2, 0));
        assert!(glyph_pixel_set(bits, 2, 4));
    }

    #[test]
    fn width_counts_characters_not_bytes() {
        assert_eq!(text_width_px("ab"), (2 * GLYPH_ADVANCE_PX) as f32);
    }
}

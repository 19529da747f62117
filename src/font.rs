//! Seven-segment glyphs.
//!
//! Bit layout per cell: `a`=0x01 (top), `b`=0x02, `c`=0x04, `d`=0x08 (bottom), `e`=0x10,
//! `f`=0x20, `g`=0x40 (middle), decimal point=0x80.

/// Decimal-point bit of a cell.
pub const DOT: u8 = 0b1000_0000;

const DIGITS: [u8; 10] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_1111, // 9
];

/// Segments for a single character. Characters with no usable shape render blank.
pub fn glyph(c: char) -> u8 {
    match c {
        '0'..='9' => DIGITS[c as usize - '0' as usize],
        // lowercase shapes that differ from their capitals
        'b' => 0x7C,
        'c' => 0x58,
        'd' => 0x5E,
        'h' => 0x74,
        'i' => 0x10,
        'n' => 0x54,
        'o' => 0x5C,
        't' => 0x78,
        'u' => 0x1C,
        'y' => 0x6E,
        'A' | 'a' => 0x77,
        'B' => 0x7F,
        'C' => 0x39,
        'D' => 0x3F,
        'E' | 'e' => 0x79,
        'F' | 'f' => 0x71,
        'G' | 'g' => 0x3D,
        'H' => 0x76,
        'I' => 0x30,
        'J' | 'j' => 0x1E,
        'K' | 'k' => 0x75,
        'L' | 'l' => 0x38,
        'M' | 'm' => 0x37,
        'N' => 0x37,
        'O' => 0x3F,
        'P' | 'p' => 0x73,
        'Q' | 'q' => 0x67,
        'R' | 'r' => 0x50,
        'S' | 's' => 0x6D,
        'T' => 0x31,
        'U' => 0x3E,
        'V' | 'v' => 0x3E,
        'W' | 'w' => 0x2A,
        'X' | 'x' => 0x76,
        'Y' => 0x6E,
        'Z' | 'z' => 0x5B,
        '-' => 0x40,
        '_' => 0x08,
        '=' => 0x48,
        '"' => 0x22,
        '\'' => 0x02,
        '[' | '(' => 0x39,
        ']' | ')' => 0x0F,
        '?' => 0x53,
        '°' => 0x63,
        _ => 0x00,
    }
}

/// Render text to cell patterns.
///
/// A `.` lights the decimal point of the preceding cell instead of taking a cell of its own,
/// unless that cell already has its point lit or there is no preceding cell.
pub fn render(text: &str) -> Vec<u8> {
    let mut cells: Vec<u8> = Vec::with_capacity(text.len());
    for c in text.chars() {
        if c == '.' {
            match cells.last_mut() {
                Some(last) if *last & DOT == 0 => *last |= DOT,
                _ => cells.push(DOT),
            }
        } else {
            cells.push(glyph(c));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert_eq!(glyph('0'), 0x3F);
        assert_eq!(glyph('8'), 0x7F);
        assert_eq!(glyph('9'), 0x6F);
    }

    #[test]
    fn test_unknown_is_blank() {
        assert_eq!(glyph(' '), 0);
        assert_eq!(glyph('~'), 0);
    }

    #[test]
    fn test_render_merges_dots() {
        assert_eq!(render("12.34"), vec![0x06, 0x5B | DOT, 0x4F, 0x66]);
        assert_eq!(render(".5"), vec![DOT, 0x6D]);
        assert_eq!(render("1.."), vec![0x06 | DOT, DOT]);
    }
}

//! ANSI escape codes and helpers that only emit them when colorizing.

/// An ANSI escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub &'static str);

impl Color {
    pub const RESET: Color = Color("\x1b[0m");
    pub const BOLD: Color = Color("\x1b[1m");
    pub const UNDERLINE: Color = Color("\x1b[4m");
    pub const REVERSE: Color = Color("\x1b[7m");
    pub const GREY: Color = Color("\x1b[38:5:240m");
    pub const LIGHT_RED: Color = Color("\x1b[91m");
    pub const LIGHT_GREEN: Color = Color("\x1b[92m");
    pub const LIGHT_YELLOW: Color = Color("\x1b[93m");
    pub const LIGHT_BLUE: Color = Color("\x1b[94m");
    pub const LIGHT_MAGENTA: Color = Color("\x1b[95m");
    pub const LIGHT_CYAN: Color = Color("\x1b[96m");
    pub const BLACK: Color = Color("\x1b[30m");
    pub const RED: Color = Color("\x1b[31m");
    pub const GREEN: Color = Color("\x1b[32m");
    pub const YELLOW: Color = Color("\x1b[33m");
    pub const BLUE: Color = Color("\x1b[34m");
    pub const MAGENTA: Color = Color("\x1b[35m");
    pub const CYAN: Color = Color("\x1b[36m");
    pub const WHITE: Color = Color("\x1b[38:5:15m");

    /// Bold light blue, used for caller locations.
    pub const BOLD_LIGHT_BLUE: Color = Color("\x1b[1m\x1b[94m");

    pub const fn code(self) -> &'static str {
        self.0
    }
}

/// Write `color` to `buf` if `colorize` is set.
#[inline]
pub fn write_code(colorize: bool, buf: &mut Vec<u8>, color: Color) {
    if colorize {
        buf.extend_from_slice(color.0.as_bytes());
    }
}

/// Write `bytes`, wrapped in `color` and a reset if `colorize` is set.
#[inline]
pub fn write_bytes(colorize: bool, buf: &mut Vec<u8>, color: Color, bytes: &[u8]) {
    write_code(colorize, buf, color);
    buf.extend_from_slice(bytes);
    write_code(colorize, buf, Color::RESET);
}

/// String flavour of [`write_bytes`].
#[inline]
pub fn write_str(colorize: bool, buf: &mut Vec<u8>, color: Color, text: &str) {
    write_bytes(colorize, buf, color, text.as_bytes());
}

/// Remove every `ESC [ ... <letter>` sequence from `bytes`.
pub fn strip_codes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();
    while let Some(b) = iter.next() {
        if b == 0x1b && iter.peek() == Some(&b'[') {
            iter.next();
            for c in iter.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(b);
        }
    }
    out
}

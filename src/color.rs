// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::stream::{ByteExt, Stream, StreamError};

/// An RGBA color representation.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    /// Constructs a new `Color` from RGB values.
    #[inline]
    pub const fn new_rgb(red: u8, green: u8, blue: u8) -> Color {
        Color {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    /// Constructs a new `Color` from RGBA values.
    #[inline]
    pub const fn new_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
        Color {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Constructs a new `Color` set to black.
    #[inline]
    pub fn black() -> Color {
        Color::new_rgb(0, 0, 0)
    }

    /// Constructs a new `Color` set to white.
    #[inline]
    pub fn white() -> Color {
        Color::new_rgb(255, 255, 255)
    }

    /// Returns the color with its alpha multiplied by `opacity`.
    ///
    /// `opacity` is clamped to the 0..=1 range.
    pub fn with_opacity(self, opacity: f64) -> Color {
        let opacity = opacity.max(0.0).min(1.0);
        let alpha = (f64::from(self.alpha) * opacity).round() as u8;
        Color { alpha, ..self }
    }
}

/// The fixed set of recognised color keywords.
///
/// The channel values match the Direct2D `ColorF` constants,
/// which in turn match the CSS keywords.
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::new_rgb(0x00, 0x00, 0x00)),
    ("blue", Color::new_rgb(0x00, 0x00, 0xFF)),
    ("brown", Color::new_rgb(0xA5, 0x2A, 0x2A)),
    ("gray", Color::new_rgb(0x80, 0x80, 0x80)),
    ("green", Color::new_rgb(0x00, 0x80, 0x00)),
    ("grey", Color::new_rgb(0x80, 0x80, 0x80)),
    ("orange", Color::new_rgb(0xFF, 0xA5, 0x00)),
    ("pink", Color::new_rgb(0xFF, 0xC0, 0xCB)),
    ("red", Color::new_rgb(0xFF, 0x00, 0x00)),
    ("teal", Color::new_rgb(0x00, 0x80, 0x80)),
    ("white", Color::new_rgb(0xFF, 0xFF, 0xFF)),
    ("yellow", Color::new_rgb(0xFF, 0xFF, 0x00)),
];

impl std::str::FromStr for Color {
    type Err = StreamError;

    /// Parses a CSS color from a string.
    ///
    /// Supports the `#RGB`, `#RGBA`, `#RRGGBB` and `#RRGGBBAA` hex notations,
    /// the `rgb()`/`rgba()` functional notation and the keyword subset above.
    /// Short hex forms expand per CSS, so `#abc` equals `#aabbcc`.
    ///
    /// An empty string and the `none` keyword are rejected.
    fn from_str(text: &str) -> Result<Self, StreamError> {
        let mut s = Stream::from(text);
        let color = s.parse_color()?;

        s.skip_spaces();
        if !s.at_end() {
            return Err(StreamError::UnexpectedData(s.calc_char_pos()));
        }

        Ok(color)
    }
}

impl<'a> Stream<'a> {
    /// Parses a color from the stream.
    pub fn parse_color(&mut self) -> Result<Color, StreamError> {
        self.skip_spaces();

        let mut color = Color::black();

        if self.curr_byte()? == b'#' {
            self.advance(1);
            let hex = self.consume_bytes(|_, c| c.is_hex_digit()).as_bytes();
            match hex.len() {
                6 => {
                    // #rrggbb
                    color.red = hex_pair(hex[0], hex[1]);
                    color.green = hex_pair(hex[2], hex[3]);
                    color.blue = hex_pair(hex[4], hex[5]);
                }
                8 => {
                    // #rrggbbaa
                    color.red = hex_pair(hex[0], hex[1]);
                    color.green = hex_pair(hex[2], hex[3]);
                    color.blue = hex_pair(hex[4], hex[5]);
                    color.alpha = hex_pair(hex[6], hex[7]);
                }
                3 => {
                    // #rgb
                    color.red = short_hex(hex[0]);
                    color.green = short_hex(hex[1]);
                    color.blue = short_hex(hex[2]);
                }
                4 => {
                    // #rgba
                    color.red = short_hex(hex[0]);
                    color.green = short_hex(hex[1]);
                    color.blue = short_hex(hex[2]);
                    color.alpha = short_hex(hex[3]);
                }
                _ => {
                    return Err(StreamError::InvalidValue);
                }
            }
        } else {
            let name = self.consume_ascii_ident().to_ascii_lowercase();
            if name == "rgb" || name == "rgba" {
                self.consume_byte(b'(')?;

                color.red = self.parse_rgb_channel()?;
                color.green = self.parse_rgb_channel()?;
                color.blue = self.parse_rgb_channel()?;

                self.skip_spaces();
                if !self.starts_with(b")") {
                    let alpha = self.parse_list_number()?;
                    color.alpha = (alpha.max(0.0).min(1.0) * 255.0).round() as u8;
                }

                self.skip_spaces();
                self.consume_byte(b')')?;
            } else {
                match NAMED_COLORS.iter().find(|(n, _)| *n == name) {
                    Some((_, c)) => color = *c,
                    None => return Err(StreamError::InvalidValue),
                }
            }
        }

        Ok(color)
    }

    /// Parses a single `rgb()` channel: a number or a percentage.
    fn parse_rgb_channel(&mut self) -> Result<u8, StreamError> {
        self.skip_spaces();
        let mut value = self.parse_number()?;
        if self.starts_with(b"%") {
            self.advance(1);
            value = value * 255.0 / 100.0;
        }
        self.skip_spaces();
        self.parse_list_separator();

        Ok(value.max(0.0).min(255.0).round() as u8)
    }
}

#[inline]
fn from_hex(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

#[inline]
fn short_hex(c: u8) -> u8 {
    let h = from_hex(c);
    (h << 4) | h
}

#[inline]
fn hex_pair(c1: u8, c2: u8) -> u8 {
    (from_hex(c1) << 4) | from_hex(c2)
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use super::*;

    macro_rules! test {
        ($name:ident, $text:expr, $color:expr) => (
            #[test]
            fn $name() {
                assert_eq!(Color::from_str($text).unwrap(), $color);
            }
        )
    }

    test!(hex_rrggbb,      "#ff0000",   Color::new_rgb(255, 0, 0));
    test!(hex_rrggbb_2,    "#Ff80C1",   Color::new_rgb(255, 128, 193));
    test!(hex_rrggbbaa,    "#ff000080", Color::new_rgba(255, 0, 0, 128));
    test!(hex_rgb,         "#abc",      Color::new_rgb(170, 187, 204));
    test!(hex_rgba,        "#abcd",     Color::new_rgba(170, 187, 204, 221));
    test!(named_black,     "black",     Color::black());
    test!(named_green,     "green",     Color::new_rgb(0, 128, 0));
    test!(named_grey,      "grey",      Color::new_rgb(128, 128, 128));
    test!(named_case,      "Teal",      Color::new_rgb(0, 128, 128));
    test!(rgb_fn,          "rgb(170, 187, 204)", Color::new_rgb(170, 187, 204));
    test!(rgb_fn_percent,  "rgb(100%, 0%, 50%)", Color::new_rgb(255, 0, 128));
    test!(rgba_fn,         "rgba(10, 20, 30, 0.5)", Color::new_rgba(10, 20, 30, 128));
    test!(spaces,          " red ",     Color::new_rgb(255, 0, 0));

    macro_rules! test_err {
        ($name:ident, $text:expr) => (
            #[test]
            fn $name() {
                assert!(Color::from_str($text).is_err());
            }
        )
    }

    test_err!(err_empty,   "");
    test_err!(err_none,    "none");
    test_err!(err_unknown, "fuchsia");
    test_err!(err_hex_len, "#ff000");
    test_err!(err_ref,     "#gradient1");
    test_err!(err_tail,    "red blue");

    // `#abc` must equal `#aabbcc` (CSS short-hex expansion).
    #[test]
    fn short_hex_expansion() {
        assert_eq!(Color::from_str("#abc").unwrap(),
                   Color::from_str("#aabbcc").unwrap());
    }
}

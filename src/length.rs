// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::stream::{Stream, StreamError};

/// List of all supported length units.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LengthUnit {
    None,
    Px,
    In,
    Cm,
    Mm,
    Pt,
    Pc,
    Percent,
}

/// A dimensional value: a number with an optional unit suffix.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Length {
    pub number: f64,
    pub unit: LengthUnit,
}

impl Length {
    /// Constructs a new length.
    #[inline]
    pub fn new(number: f64, unit: LengthUnit) -> Length {
        Length { number, unit }
    }

    /// Resolves the length into pixels.
    ///
    /// Physical units are converted using the provided DPI.
    /// A percentage is normalized into the 0..=1 range.
    pub fn to_px(&self, dpi: f64) -> f64 {
        match self.unit {
            LengthUnit::None | LengthUnit::Px => self.number,
            LengthUnit::In => self.number * dpi,
            LengthUnit::Cm => self.number * dpi / 2.54,
            LengthUnit::Mm => self.number * dpi / 25.4,
            LengthUnit::Pt => self.number * dpi / 72.0,
            LengthUnit::Pc => self.number * dpi / 6.0,
            LengthUnit::Percent => self.number / 100.0,
        }
    }
}

impl std::str::FromStr for Length {
    type Err = StreamError;

    /// Parses a length from a string.
    ///
    /// The whole string must be consumed: a number followed by nothing,
    /// or by exactly one of the supported unit suffixes.
    /// Any other trailing data is an error.
    fn from_str(text: &str) -> Result<Self, StreamError> {
        let mut s = Stream::from(text);
        let number = s.parse_number()?;

        let unit = match s.slice_tail() {
            "" => LengthUnit::None,
            "px" => LengthUnit::Px,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "pt" => LengthUnit::Pt,
            "pc" => LengthUnit::Pc,
            "%" => LengthUnit::Percent,
            _ => return Err(StreamError::UnexpectedData(s.calc_char_pos())),
        };

        Ok(Length::new(number, unit))
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use super::*;

    macro_rules! test {
        ($name:ident, $text:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(Length::from_str($text).unwrap(), $result);
            }
        )
    }

    test!(parse_1,  "1",     Length::new(1.0, LengthUnit::None));
    test!(parse_2,  "1px",   Length::new(1.0, LengthUnit::Px));
    test!(parse_3,  "1in",   Length::new(1.0, LengthUnit::In));
    test!(parse_4,  "1cm",   Length::new(1.0, LengthUnit::Cm));
    test!(parse_5,  "1mm",   Length::new(1.0, LengthUnit::Mm));
    test!(parse_6,  "1pt",   Length::new(1.0, LengthUnit::Pt));
    test!(parse_7,  "1pc",   Length::new(1.0, LengthUnit::Pc));
    test!(parse_8,  "50%",   Length::new(50.0, LengthUnit::Percent));
    test!(parse_9,  "-2.5",  Length::new(-2.5, LengthUnit::None));
    test!(parse_10, "1e1px", Length::new(10.0, LengthUnit::Px));

    macro_rules! test_err {
        ($name:ident, $text:expr) => (
            #[test]
            fn $name() {
                assert!(Length::from_str($text).is_err());
            }
        )
    }

    test_err!(err_1, "1q");
    test_err!(err_2, "1em");
    test_err!(err_3, "1 px");
    test_err!(err_4, "px");
    test_err!(err_5, "");

    #[test]
    fn to_px() {
        let dpi = 96.0;
        assert_eq!(Length::new(2.0, LengthUnit::In).to_px(dpi), 192.0);
        assert_eq!(Length::new(72.0, LengthUnit::Pt).to_px(dpi), 96.0);
        assert_eq!(Length::new(25.4, LengthUnit::Mm).to_px(dpi), 96.0);
        assert_eq!(Length::new(50.0, LengthUnit::Percent).to_px(dpi), 0.5);
        assert_eq!(Length::new(3.0, LengthUnit::None).to_px(dpi), 3.0);
    }
}

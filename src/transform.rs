// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::geom::{FuzzyEq, FuzzyZero};
use crate::stream::{Stream, StreamError};

/// A 2x3 affine transformation matrix.
///
/// A point is mapped as `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transform {
    /// Constructs a new transform.
    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Transform { a, b, c, d, e, f }
    }

    /// Constructs a new translating transform.
    #[inline]
    pub fn from_translate(tx: f64, ty: f64) -> Self {
        Transform::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Constructs a new scaling transform.
    #[inline]
    pub fn from_scale(sx: f64, sy: f64) -> Self {
        Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Constructs a new rotating transform. The angle is in degrees.
    pub fn from_rotate(angle: f64) -> Self {
        let v = angle.to_radians();
        let a = v.cos();
        let b = v.sin();
        Transform::new(a, b, -b, a, 0.0, 0.0)
    }

    /// Constructs a new skewing transform. Both angles are in degrees.
    pub fn from_skew(ax: f64, ay: f64) -> Self {
        Transform::new(1.0, ay.to_radians().tan(), ax.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    /// Checks that the transform is the identity.
    pub fn is_default(&self) -> bool {
        self.a.fuzzy_eq(&1.0)
            && self.b.is_fuzzy_zero()
            && self.c.is_fuzzy_zero()
            && self.d.fuzzy_eq(&1.0)
            && self.e.is_fuzzy_zero()
            && self.f.is_fuzzy_zero()
    }

    /// Returns `self * other`, so that `other` is applied to points first.
    pub fn pre_concat(&self, other: Transform) -> Transform {
        multiply(self, &other)
    }

    /// Applies the transform to a point.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl FuzzyEq for Transform {
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.a.fuzzy_eq(&other.a)
            && self.b.fuzzy_eq(&other.b)
            && self.c.fuzzy_eq(&other.c)
            && self.d.fuzzy_eq(&other.d)
            && self.e.fuzzy_eq(&other.e)
            && self.f.fuzzy_eq(&other.f)
    }
}

#[inline(never)]
fn multiply(ts1: &Transform, ts2: &Transform) -> Transform {
    Transform {
        a: ts1.a * ts2.a + ts1.c * ts2.b,
        b: ts1.b * ts2.a + ts1.d * ts2.b,
        c: ts1.a * ts2.c + ts1.c * ts2.d,
        d: ts1.b * ts2.c + ts1.d * ts2.d,
        e: ts1.a * ts2.e + ts1.c * ts2.f + ts1.e,
        f: ts1.b * ts2.e + ts1.d * ts2.f + ts1.f,
    }
}

impl std::str::FromStr for Transform {
    type Err = StreamError;

    /// Parses a `transform` attribute value.
    ///
    /// Functions compose left to right, so the rightmost function is
    /// applied to points first. Unrecognised function names and arities
    /// are skipped; a missing `(` or `)` fails the whole string.
    fn from_str(text: &str) -> Result<Self, StreamError> {
        let mut s = Stream::from(text);
        let mut ts = Transform::default();

        loop {
            s.skip_spaces();
            if s.at_end() {
                break;
            }

            let start = s.pos();
            let name = s.consume_ascii_ident();
            if name.is_empty() {
                return Err(StreamError::UnexpectedData(s.calc_char_pos_at(start)));
            }

            s.skip_spaces();
            s.consume_byte(b'(')?;

            let mut args = Vec::new();
            loop {
                s.skip_spaces();
                if s.at_end() {
                    // A function without a closing parenthesis.
                    return Err(StreamError::UnexpectedEndOfStream);
                }

                if s.is_curr_byte_eq(b')') {
                    break;
                }

                args.push(s.parse_list_number()?);
            }

            s.consume_byte(b')')?;
            s.skip_spaces();
            s.parse_list_separator();

            let m = match (name, args.len()) {
                ("matrix", 6) => Some(Transform::new(
                    args[0], args[1], args[2], args[3], args[4], args[5],
                )),
                ("translate", 1) => Some(Transform::from_translate(args[0], 0.0)),
                ("translate", 2) => Some(Transform::from_translate(args[0], args[1])),
                ("scale", 1) => Some(Transform::from_scale(args[0], args[0])),
                ("scale", 2) => Some(Transform::from_scale(args[0], args[1])),
                ("rotate", 1) => Some(Transform::from_rotate(args[0])),
                ("rotate", 3) => {
                    // 'translate(<cx>, <cy>) rotate(<rotate-angle>) translate(-<cx>, -<cy>)'
                    let (cx, cy) = (args[1], args[2]);
                    Some(
                        Transform::from_translate(cx, cy)
                            .pre_concat(Transform::from_rotate(args[0]))
                            .pre_concat(Transform::from_translate(-cx, -cy)),
                    )
                }
                ("skewX", 1) => Some(Transform::from_skew(args[0], 0.0)),
                ("skewY", 1) => Some(Transform::from_skew(0.0, args[0])),
                // The two-axes form is an extension; the standard defines
                // only skewX/skewY.
                ("skew", 2) => Some(Transform::from_skew(args[0], args[1])),
                _ => {
                    log::warn!("Ignoring an unsupported transform function: '{}'.", name);
                    None
                }
            };

            if let Some(m) = m {
                ts = ts.pre_concat(m);
            }
        }

        Ok(ts)
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
                let ts = Transform::from_str($text).unwrap();
                let s = format!("matrix({} {} {} {} {} {})", ts.a, ts.b, ts.c, ts.d, ts.e, ts.f);
                assert_eq!(s, $result);
            }
        )
    }

    test!(parse_1,
        "matrix(1 0 0 1 10 20)",
        "matrix(1 0 0 1 10 20)"
    );

    test!(parse_2,
        "translate(10 20)",
        "matrix(1 0 0 1 10 20)"
    );

    test!(parse_3,
        "scale(2 3)",
        "matrix(2 0 0 3 0 0)"
    );

    test!(parse_4,
        "translate(10 15) translate(0 5)",
        "matrix(1 0 0 1 10 20)"
    );

    test!(parse_5,
        "translate(10) scale(2)",
        "matrix(2 0 0 2 10 0)"
    );

    test!(parse_6,
        "translate(25 215) scale(2) skewX(45)",
        "matrix(2 0 1.9999999999999998 2 25 215)"
    );

    test!(parse_7,
        "translate(10,20), scale(2)",
        "matrix(2 0 0 2 10 20)"
    );

    // Unknown functions are skipped, the rest still applies.
    test!(parse_8,
        "unknown(1 2 3) translate(10 0)",
        "matrix(1 0 0 1 10 0)"
    );

    // Wrong arity is skipped as well.
    test!(parse_9,
        "scale(1 2 3) translate(10 0)",
        "matrix(1 0 0 1 10 0)"
    );

    test!(parse_10,
        "",
        "matrix(1 0 0 1 0 0)"
    );

    macro_rules! test_err {
        ($name:ident, $text:expr) => (
            #[test]
            fn $name() {
                assert!(Transform::from_str($text).is_err());
            }
        )
    }

    test_err!(err_no_paren,    "translate(10,0");
    test_err!(err_no_open,     "translate 10 0)");
    test_err!(err_bad_number,  "translate(a,b)");
    test_err!(err_bare_ident,  "text");

    // 'translate(10,0) rotate(90)' maps (1,0) to (10,1): rotate first.
    #[test]
    fn composition_order() {
        let ts = Transform::from_str("translate(10,0) rotate(90)").unwrap();
        let (x, y) = ts.apply(1.0, 0.0);
        assert!(x.fuzzy_eq(&10.0));
        assert!(y.fuzzy_eq(&1.0));
    }

    #[test]
    fn rotate_about_point() {
        let ts = Transform::from_str("rotate(90 10 10)").unwrap();
        let (x, y) = ts.apply(10.0, 0.0);
        assert!(x.fuzzy_eq(&20.0));
        assert!(y.fuzzy_eq(&10.0));
    }
}

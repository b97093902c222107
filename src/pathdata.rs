// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::device::{ArcSegment, Device, FigureEnd, GeometrySink};
use crate::geom::Point;
use crate::stream::{Stream, StreamError};

/// Representation of a path segment.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PathSegment {
    MoveTo {
        abs: bool,
        x: f64,
        y: f64,
    },
    LineTo {
        abs: bool,
        x: f64,
        y: f64,
    },
    HorizontalLineTo {
        abs: bool,
        x: f64,
    },
    VerticalLineTo {
        abs: bool,
        y: f64,
    },
    CurveTo {
        abs: bool,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    SmoothCurveTo {
        abs: bool,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    Quadratic {
        abs: bool,
        x1: f64,
        y1: f64,
        x: f64,
        y: f64,
    },
    SmoothQuadratic {
        abs: bool,
        x: f64,
        y: f64,
    },
    EllipticalArc {
        abs: bool,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    ClosePath,
}

/// A pull-based path data parser.
///
/// Implicit commands are resolved: a coordinate pair following a moveto
/// continues as a lineto of the matching kind, any other command repeats.
///
/// The iterator stops on the first error; the caller decides whether a
/// partial path is acceptable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PathParser<'a> {
    stream: Stream<'a>,
    prev_cmd: Option<u8>,
}

impl<'a> From<&'a str> for PathParser<'a> {
    #[inline]
    fn from(text: &'a str) -> Self {
        PathParser {
            stream: Stream::from(text),
            prev_cmd: None,
        }
    }
}

impl<'a> Iterator for PathParser<'a> {
    type Item = Result<PathSegment, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.skip_spaces();

        if self.stream.at_end() {
            return None;
        }

        let res = self.parse_segment();
        if res.is_err() {
            self.stream.jump_to_end();
        }

        Some(res)
    }
}

impl<'a> PathParser<'a> {
    fn parse_segment(&mut self) -> Result<PathSegment, StreamError> {
        let s = &mut self.stream;
        let start = s.pos();
        let first_char = s.curr_byte_unchecked();

        let cmd = if is_cmd(first_char) {
            s.advance(1);
            if self.prev_cmd.is_none() && !matches!(first_char, b'M' | b'm') {
                // The first segment must be a MoveTo.
                return Err(StreamError::UnexpectedData(s.calc_char_pos_at(start)));
            }

            first_char
        } else if is_number_start(first_char) {
            match self.prev_cmd {
                // 'If a moveto is followed by multiple pairs of coordinates,
                // the subsequent pairs are treated as implicit lineto commands.'
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                // A ClosePath cannot be followed by a number.
                Some(b'Z') | Some(b'z') | None => {
                    return Err(StreamError::UnexpectedData(s.calc_char_pos_at(start)));
                }
                Some(prev) => prev,
            }
        } else {
            return Err(StreamError::UnexpectedData(s.calc_char_pos_at(start)));
        };

        let abs = cmd.is_ascii_uppercase();
        let token = match cmd.to_ascii_lowercase() {
            b'm' => PathSegment::MoveTo {
                abs,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b'l' => PathSegment::LineTo {
                abs,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b'h' => PathSegment::HorizontalLineTo {
                abs,
                x: s.parse_list_number()?,
            },
            b'v' => PathSegment::VerticalLineTo {
                abs,
                y: s.parse_list_number()?,
            },
            b'c' => PathSegment::CurveTo {
                abs,
                x1: s.parse_list_number()?,
                y1: s.parse_list_number()?,
                x2: s.parse_list_number()?,
                y2: s.parse_list_number()?,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b's' => PathSegment::SmoothCurveTo {
                abs,
                x2: s.parse_list_number()?,
                y2: s.parse_list_number()?,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b'q' => PathSegment::Quadratic {
                abs,
                x1: s.parse_list_number()?,
                y1: s.parse_list_number()?,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b't' => PathSegment::SmoothQuadratic {
                abs,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b'a' => PathSegment::EllipticalArc {
                abs,
                rx: s.parse_list_number()?,
                ry: s.parse_list_number()?,
                x_axis_rotation: s.parse_list_number()?,
                large_arc: parse_flag(s)?,
                sweep: parse_flag(s)?,
                x: s.parse_list_number()?,
                y: s.parse_list_number()?,
            },
            b'z' => PathSegment::ClosePath,
            _ => {
                return Err(StreamError::UnexpectedData(s.calc_char_pos_at(start)));
            }
        };

        self.prev_cmd = Some(cmd);

        Ok(token)
    }
}

/// Returns `true` if the selected char is a command letter.
#[rustfmt::skip]
#[inline]
fn is_cmd(c: u8) -> bool {
    matches!(c,
          b'M' | b'm'
        | b'Z' | b'z'
        | b'L' | b'l'
        | b'H' | b'h'
        | b'V' | b'v'
        | b'C' | b'c'
        | b'S' | b's'
        | b'Q' | b'q'
        | b'T' | b't'
        | b'A' | b'a')
}

#[inline]
fn is_number_start(c: u8) -> bool {
    matches!(c, b'0'..=b'9' | b'.' | b'-' | b'+')
}

// By the SVG spec 'large-arc' and 'sweep' must contain only one char
// and can be written without any separators, e.g.: 10 20 30 01 10 20.
fn parse_flag(s: &mut Stream) -> Result<bool, StreamError> {
    s.skip_spaces();

    let c = s.curr_byte()?;
    match c {
        b'0' | b'1' => {
            s.advance(1);
            if s.is_curr_byte_eq(b',') {
                s.advance(1);
            }
            s.skip_spaces();

            Ok(c == b'1')
        }
        _ => Err(StreamError::UnexpectedData(s.calc_char_pos())),
    }
}

/// Builds a backend geometry from a path data string.
///
/// The sink is driven per the SVG path semantics: a moveto closes any open
/// figure as open, `Z` closes it as closed, smooth commands reflect the
/// previous control point only after a segment of the matching family, and
/// relative coordinates are resolved against the current point.
///
/// Returns `None` when the path grammar is invalid; partial geometry is
/// discarded.
pub(crate) fn build_geometry<D: Device>(device: &mut D, text: &str) -> Option<D::Geometry> {
    let mut sink = device.open_geometry_sink();
    let mut state = SinkState::default();

    for segment in PathParser::from(text) {
        let segment = match segment {
            Ok(segment) => segment,
            Err(e) => {
                log::warn!("Failed to parse path data '{}' cause {}.", text, e);
                return None;
            }
        };

        state.feed(&mut sink, segment);
    }

    if state.in_figure {
        sink.end_figure(FigureEnd::Open);
    }

    device.close_geometry_sink(sink)
}

/// The path-to-sink state machine.
#[derive(Default)]
struct SinkState {
    x: f64,
    y: f64,
    // Start of the current subpath; a ClosePath returns here.
    start_x: f64,
    start_y: f64,
    ctrl_x: f64,
    ctrl_y: f64,
    in_figure: bool,
    prev: Option<PathSegment>,
}

impl SinkState {
    fn feed<S: GeometrySink>(&mut self, sink: &mut S, segment: PathSegment) {
        match segment {
            PathSegment::MoveTo { abs, mut x, mut y } => {
                if !abs {
                    x += self.x;
                    y += self.y;
                }

                if self.in_figure {
                    sink.end_figure(FigureEnd::Open);
                }

                sink.begin_figure(Point::new(x, y));
                self.in_figure = true;
                self.x = x;
                self.y = y;
                self.start_x = x;
                self.start_y = y;
            }
            PathSegment::LineTo { abs, mut x, mut y } => {
                if !abs {
                    x += self.x;
                    y += self.y;
                }

                sink.add_line(Point::new(x, y));
                self.x = x;
                self.y = y;
            }
            PathSegment::HorizontalLineTo { abs, mut x } => {
                if !abs {
                    x += self.x;
                }

                sink.add_line(Point::new(x, self.y));
                self.x = x;
            }
            PathSegment::VerticalLineTo { abs, mut y } => {
                if !abs {
                    y += self.y;
                }

                sink.add_line(Point::new(self.x, y));
                self.y = y;
            }
            PathSegment::Quadratic {
                abs,
                mut x1,
                mut y1,
                mut x,
                mut y,
            } => {
                if !abs {
                    x1 += self.x;
                    y1 += self.y;
                    x += self.x;
                    y += self.y;
                }

                sink.add_quadratic_bezier(Point::new(x1, y1), Point::new(x, y));
                self.x = x;
                self.y = y;
                self.ctrl_x = x1;
                self.ctrl_y = y1;
            }
            PathSegment::SmoothQuadratic { abs, mut x, mut y } => {
                // 'The control point is assumed to be the reflection of the
                // control point on the previous command relative to the
                // current point.'
                let (x1, y1) = match self.prev {
                    Some(PathSegment::Quadratic { .. })
                    | Some(PathSegment::SmoothQuadratic { .. }) => {
                        (self.x * 2.0 - self.ctrl_x, self.y * 2.0 - self.ctrl_y)
                    }
                    _ => (self.x, self.y),
                };

                if !abs {
                    x += self.x;
                    y += self.y;
                }

                sink.add_quadratic_bezier(Point::new(x1, y1), Point::new(x, y));
                self.x = x;
                self.y = y;
                self.ctrl_x = x1;
                self.ctrl_y = y1;
            }
            PathSegment::CurveTo {
                abs,
                mut x1,
                mut y1,
                mut x2,
                mut y2,
                mut x,
                mut y,
            } => {
                if !abs {
                    x1 += self.x;
                    y1 += self.y;
                    x2 += self.x;
                    y2 += self.y;
                    x += self.x;
                    y += self.y;
                }

                sink.add_bezier(Point::new(x1, y1), Point::new(x2, y2), Point::new(x, y));
                self.x = x;
                self.y = y;
                self.ctrl_x = x2;
                self.ctrl_y = y2;
            }
            PathSegment::SmoothCurveTo {
                abs,
                mut x2,
                mut y2,
                mut x,
                mut y,
            } => {
                let (x1, y1) = match self.prev {
                    Some(PathSegment::CurveTo { .. }) | Some(PathSegment::SmoothCurveTo { .. }) => {
                        (self.x * 2.0 - self.ctrl_x, self.y * 2.0 - self.ctrl_y)
                    }
                    _ => (self.x, self.y),
                };

                if !abs {
                    x2 += self.x;
                    y2 += self.y;
                    x += self.x;
                    y += self.y;
                }

                sink.add_bezier(Point::new(x1, y1), Point::new(x2, y2), Point::new(x, y));
                self.x = x;
                self.y = y;
                self.ctrl_x = x2;
                self.ctrl_y = y2;
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                mut x,
                mut y,
            } => {
                if !abs {
                    x += self.x;
                    y += self.y;
                }

                sink.add_arc(ArcSegment {
                    point: Point::new(x, y),
                    radius_x: rx,
                    radius_y: ry,
                    rotation: x_axis_rotation,
                    large_arc,
                    sweep,
                });
                self.x = x;
                self.y = y;
            }
            PathSegment::ClosePath => {
                if self.in_figure {
                    sink.end_figure(FigureEnd::Closed);
                    self.in_figure = false;
                    // ClosePath moves us to the subpath start.
                    self.x = self.start_x;
                    self.y = self.start_y;
                }
            }
        }

        self.prev = Some(segment);
    }
}

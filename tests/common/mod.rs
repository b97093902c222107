// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A recording device used by the integration tests: every resource is a
//! plain value and every draw call is captured together with the device
//! transform it ran under.

// Each test binary uses its own subset of this module.
#![allow(dead_code)]

use svgscene::{
    ArcSegment, Color, Device, FigureEnd, FontStyle, FontWeight, GeometrySink, GradientStop,
    Point, Rect, Size, StrokeProperties, TextMetrics, Transform,
};

#[derive(Clone, PartialEq, Debug)]
pub enum Brush {
    Solid(Color),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
        transform: Option<Transform>,
    },
    Radial {
        center: Point,
        origin_offset: Point,
        radius_x: f64,
        radius_y: f64,
        stops: Vec<GradientStop>,
        transform: Option<Transform>,
    },
}

#[derive(Clone, PartialEq, Debug)]
pub enum SinkOp {
    Begin(Point),
    Line(Point),
    Quad(Point, Point),
    Cubic(Point, Point, Point),
    Arc(ArcSegment),
    End(FigureEnd),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Geometry {
    pub ops: Vec<SinkOp>,
    pub bounds: Rect,
}

#[derive(Default)]
pub struct Sink {
    ops: Vec<SinkOp>,
    min: Option<(f64, f64)>,
    max: Option<(f64, f64)>,
}

impl Sink {
    fn push_point(&mut self, p: Point) {
        let (min_x, min_y) = self.min.unwrap_or((p.x, p.y));
        let (max_x, max_y) = self.max.unwrap_or((p.x, p.y));
        self.min = Some((min_x.min(p.x), min_y.min(p.y)));
        self.max = Some((max_x.max(p.x), max_y.max(p.y)));
    }
}

impl GeometrySink for Sink {
    fn begin_figure(&mut self, start: Point) {
        self.push_point(start);
        self.ops.push(SinkOp::Begin(start));
    }

    fn add_line(&mut self, to: Point) {
        self.push_point(to);
        self.ops.push(SinkOp::Line(to));
    }

    fn add_quadratic_bezier(&mut self, ctrl: Point, to: Point) {
        self.push_point(ctrl);
        self.push_point(to);
        self.ops.push(SinkOp::Quad(ctrl, to));
    }

    fn add_bezier(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.push_point(ctrl1);
        self.push_point(ctrl2);
        self.push_point(to);
        self.ops.push(SinkOp::Cubic(ctrl1, ctrl2, to));
    }

    fn add_arc(&mut self, arc: ArcSegment) {
        self.push_point(arc.point);
        self.ops.push(SinkOp::Arc(arc));
    }

    fn end_figure(&mut self, end: FigureEnd) {
        self.ops.push(SinkOp::End(end));
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Format {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub size: f64,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Layout {
    pub text: String,
    pub size: f64,
}

#[derive(Clone, PartialEq, Debug)]
pub enum DrawCall {
    Clear(Color),
    FillRect {
        rect: Rect,
        radii: Option<(f64, f64)>,
        brush: Brush,
        transform: Transform,
    },
    StrokeRect {
        rect: Rect,
        radii: Option<(f64, f64)>,
        brush: Brush,
        width: f64,
        transform: Transform,
    },
    FillEllipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
        brush: Brush,
        transform: Transform,
    },
    StrokeEllipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
        brush: Brush,
        width: f64,
        transform: Transform,
    },
    Line {
        p1: Point,
        p2: Point,
        brush: Brush,
        width: f64,
        transform: Transform,
    },
    FillGeometry {
        bounds: Rect,
        brush: Brush,
        transform: Transform,
    },
    StrokeGeometry {
        bounds: Rect,
        brush: Brush,
        width: f64,
        transform: Transform,
    },
    Text {
        origin: Point,
        text: String,
        brush: Brush,
        transform: Transform,
    },
}

#[derive(Debug)]
pub struct RecordDevice {
    pub dpi: f64,
    pub size: Size,
    pub transform: Transform,
    pub calls: Vec<DrawCall>,
    /// When set, only these font families exist.
    pub fonts: Option<Vec<String>>,
}

impl Default for RecordDevice {
    fn default() -> Self {
        RecordDevice {
            dpi: 96.0,
            size: Size::new(400.0, 300.0),
            transform: Transform::default(),
            calls: Vec::new(),
            fonts: None,
        }
    }
}

impl Device for RecordDevice {
    type Brush = Brush;
    type StrokeStyle = StrokeProperties;
    type Geometry = Geometry;
    type GeometrySink = Sink;
    type TextFormat = Format;
    type TextLayout = Layout;

    fn create_solid_brush(&mut self, color: Color) -> Option<Brush> {
        Some(Brush::Solid(color))
    }

    fn create_linear_gradient_brush(
        &mut self,
        start: Point,
        end: Point,
        stops: &[GradientStop],
        transform: Option<Transform>,
    ) -> Option<Brush> {
        Some(Brush::Linear {
            start,
            end,
            stops: stops.to_vec(),
            transform,
        })
    }

    fn create_radial_gradient_brush(
        &mut self,
        center: Point,
        origin_offset: Point,
        radius_x: f64,
        radius_y: f64,
        stops: &[GradientStop],
        transform: Option<Transform>,
    ) -> Option<Brush> {
        Some(Brush::Radial {
            center,
            origin_offset,
            radius_x,
            radius_y,
            stops: stops.to_vec(),
            transform,
        })
    }

    fn create_stroke_style(&mut self, properties: &StrokeProperties) -> Option<StrokeProperties> {
        Some(*properties)
    }

    fn open_geometry_sink(&mut self) -> Sink {
        Sink::default()
    }

    fn close_geometry_sink(&mut self, sink: Sink) -> Option<Geometry> {
        let bounds = match (sink.min, sink.max) {
            (Some(min), Some(max)) => Rect::new(min.0, min.1, max.0, max.1),
            _ => Rect::default(),
        };

        Some(Geometry {
            ops: sink.ops,
            bounds,
        })
    }

    fn geometry_bounds(&self, geometry: &Geometry) -> Rect {
        geometry.bounds
    }

    fn create_text_format(
        &mut self,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
        size: f64,
    ) -> Option<Format> {
        if family.is_empty() {
            return None;
        }

        if let Some(ref fonts) = self.fonts {
            if !fonts.iter().any(|f| f == family) {
                return None;
            }
        }

        Some(Format {
            family: family.to_string(),
            weight,
            style,
            size,
        })
    }

    fn create_text_layout(
        &mut self,
        text: &str,
        format: &Format,
        _max_width: f64,
        _max_height: f64,
    ) -> Option<Layout> {
        Some(Layout {
            text: text.to_string(),
            size: format.size,
        })
    }

    fn text_metrics(&self, layout: &Layout) -> TextMetrics {
        TextMetrics {
            width: layout.text.chars().count() as f64 * layout.size * 0.5,
            height: layout.size * 1.2,
            baseline: layout.size * 0.8,
        }
    }

    fn begin_draw(&mut self) {}

    fn end_draw(&mut self) {}

    fn clear(&mut self, color: Color) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn dpi(&self) -> (f64, f64) {
        (self.dpi, self.dpi)
    }

    fn size(&self) -> Size {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, radii: Option<(f64, f64)>, brush: &Brush) {
        self.calls.push(DrawCall::FillRect {
            rect,
            radii,
            brush: brush.clone(),
            transform: self.transform,
        });
    }

    fn stroke_rect(
        &mut self,
        rect: Rect,
        radii: Option<(f64, f64)>,
        brush: &Brush,
        width: f64,
        _style: Option<&StrokeProperties>,
    ) {
        self.calls.push(DrawCall::StrokeRect {
            rect,
            radii,
            brush: brush.clone(),
            width,
            transform: self.transform,
        });
    }

    fn fill_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64, brush: &Brush) {
        self.calls.push(DrawCall::FillEllipse {
            center,
            radius_x,
            radius_y,
            brush: brush.clone(),
            transform: self.transform,
        });
    }

    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        brush: &Brush,
        width: f64,
        _style: Option<&StrokeProperties>,
    ) {
        self.calls.push(DrawCall::StrokeEllipse {
            center,
            radius_x,
            radius_y,
            brush: brush.clone(),
            width,
            transform: self.transform,
        });
    }

    fn draw_line(
        &mut self,
        p1: Point,
        p2: Point,
        brush: &Brush,
        width: f64,
        _style: Option<&StrokeProperties>,
    ) {
        self.calls.push(DrawCall::Line {
            p1,
            p2,
            brush: brush.clone(),
            width,
            transform: self.transform,
        });
    }

    fn fill_geometry(&mut self, geometry: &Geometry, brush: &Brush) {
        self.calls.push(DrawCall::FillGeometry {
            bounds: geometry.bounds,
            brush: brush.clone(),
            transform: self.transform,
        });
    }

    fn stroke_geometry(
        &mut self,
        geometry: &Geometry,
        brush: &Brush,
        width: f64,
        _style: Option<&StrokeProperties>,
    ) {
        self.calls.push(DrawCall::StrokeGeometry {
            bounds: geometry.bounds,
            brush: brush.clone(),
            width,
            transform: self.transform,
        });
    }

    fn draw_text_layout(&mut self, origin: Point, layout: &Layout, brush: &Brush) {
        self.calls.push(DrawCall::Text {
            origin,
            text: layout.text.clone(),
            brush: brush.clone(),
            transform: self.transform,
        });
    }
}

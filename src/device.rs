// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The backend graphics capability consumed by the scene builder,
//! the asset binder and the renderer.
//!
//! The shape of the interface mirrors a Direct2D-like device context,
//! but nothing here is specific to it. Window lifecycle operations
//! (init/resize/redraw) belong to concrete implementations and are
//! never called by this crate.

use crate::color::Color;
use crate::geom::{Point, Rect, Size};
use crate::transform::Transform;

/// How a figure is terminated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FigureEnd {
    /// The figure is left open.
    Open,
    /// The figure is closed with an implicit line to its start point.
    Closed,
}

/// An elliptical arc segment, from the current point to `point`.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ArcSegment {
    pub point: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    /// The x-axis rotation in degrees.
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

/// A line cap style.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineCap {
    /// The stroke ends flat at the endpoint.
    Butt,
    /// The stroke ends with a semicircle.
    Round,
    /// The stroke ends with a half-square.
    Square,
}

/// A line join style.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineJoin {
    /// Sharp corners, limited by the miter limit.
    Miter,
    /// Beveled corners.
    Bevel,
    /// Rounded corners.
    Round,
}

/// Properties for a backend stroke style object.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StrokeProperties {
    pub start_cap: LineCap,
    pub end_cap: LineCap,
    pub dash_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
}

impl Default for StrokeProperties {
    fn default() -> Self {
        StrokeProperties {
            start_cap: LineCap::Butt,
            end_cap: LineCap::Butt,
            dash_cap: LineCap::Round,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
        }
    }
}

/// A single gradient stop.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// A font weight in the 1..=1000 range.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// The normal (400) weight.
    pub const NORMAL: FontWeight = FontWeight(400);
    /// The bold (700) weight.
    pub const BOLD: FontWeight = FontWeight(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        FontWeight::NORMAL
    }
}

/// A font style.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

/// Metrics of a laid out text block.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TextMetrics {
    /// Width of the laid out text.
    pub width: f64,
    /// Height of the laid out text.
    pub height: f64,
    /// Distance from the top of the first line to its baseline.
    pub baseline: f64,
}

/// A sink that receives path geometry commands.
pub trait GeometrySink {
    /// Starts a new figure at the given point.
    fn begin_figure(&mut self, start: Point);

    /// Adds a line from the current point.
    fn add_line(&mut self, to: Point);

    /// Adds a quadratic Bézier from the current point.
    fn add_quadratic_bezier(&mut self, ctrl: Point, to: Point);

    /// Adds a cubic Bézier from the current point.
    fn add_bezier(&mut self, ctrl1: Point, ctrl2: Point, to: Point);

    /// Adds an elliptical arc from the current point.
    fn add_arc(&mut self, arc: ArcSegment);

    /// Ends the current figure.
    fn end_figure(&mut self, end: FigureEnd);
}

/// The backend graphics device.
///
/// Resource handles are cheap to clone and may be shared between elements;
/// a handle stays valid for as long as any holder keeps it.
///
/// Resource constructors return `None` when the backend cannot provide the
/// resource (an unknown font family, an empty stop list and so on); the
/// caller recovers by rendering without it.
pub trait Device {
    /// A paint brush: solid color or gradient.
    type Brush: Clone;
    /// A stroke style object.
    type StrokeStyle: Clone;
    /// An immutable path geometry.
    type Geometry: Clone;
    /// A sink used to build one [`Geometry`](Self::Geometry).
    type GeometrySink: GeometrySink;
    /// A text format: family, weight, style and size.
    type TextFormat: Clone;
    /// A laid out text block.
    type TextLayout: Clone;

    /// Creates a solid color brush.
    fn create_solid_brush(&mut self, color: Color) -> Option<Self::Brush>;

    /// Creates a linear gradient brush.
    fn create_linear_gradient_brush(
        &mut self,
        start: Point,
        end: Point,
        stops: &[GradientStop],
        transform: Option<Transform>,
    ) -> Option<Self::Brush>;

    /// Creates a radial gradient brush.
    ///
    /// `origin_offset` is the focal point offset from the centre,
    /// not an absolute position.
    fn create_radial_gradient_brush(
        &mut self,
        center: Point,
        origin_offset: Point,
        radius_x: f64,
        radius_y: f64,
        stops: &[GradientStop],
        transform: Option<Transform>,
    ) -> Option<Self::Brush>;

    /// Creates a stroke style object.
    fn create_stroke_style(&mut self, properties: &StrokeProperties) -> Option<Self::StrokeStyle>;

    /// Opens a sink for building a new path geometry.
    fn open_geometry_sink(&mut self) -> Self::GeometrySink;

    /// Closes a sink, producing the geometry.
    fn close_geometry_sink(&mut self, sink: Self::GeometrySink) -> Option<Self::Geometry>;

    /// Returns the axis-aligned bounds of a geometry under the identity
    /// transform.
    fn geometry_bounds(&self, geometry: &Self::Geometry) -> Rect;

    /// Creates a text format.
    ///
    /// Returns `None` when the family is not available, so a caller can
    /// walk a font fallback list.
    fn create_text_format(
        &mut self,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
        size: f64,
    ) -> Option<Self::TextFormat>;

    /// Lays out a text block with wrapping disabled.
    fn create_text_layout(
        &mut self,
        text: &str,
        format: &Self::TextFormat,
        max_width: f64,
        max_height: f64,
    ) -> Option<Self::TextLayout>;

    /// Queries the metrics of a text layout.
    fn text_metrics(&self, layout: &Self::TextLayout) -> TextMetrics;

    /// Starts a drawing pass.
    fn begin_draw(&mut self);

    /// Finishes a drawing pass.
    fn end_draw(&mut self);

    /// Clears the target surface to a color.
    fn clear(&mut self, color: Color);

    /// Returns the current device transform.
    fn transform(&self) -> Transform;

    /// Replaces the current device transform.
    fn set_transform(&mut self, transform: Transform);

    /// Returns the device (horizontal, vertical) DPI.
    fn dpi(&self) -> (f64, f64);

    /// Returns the target surface size in pixels.
    fn size(&self) -> Size;

    /// Fills a rectangle, rounded when `radii` is set.
    fn fill_rect(&mut self, rect: Rect, radii: Option<(f64, f64)>, brush: &Self::Brush);

    /// Strokes a rectangle, rounded when `radii` is set.
    fn stroke_rect(
        &mut self,
        rect: Rect,
        radii: Option<(f64, f64)>,
        brush: &Self::Brush,
        width: f64,
        style: Option<&Self::StrokeStyle>,
    );

    /// Fills an ellipse.
    fn fill_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64, brush: &Self::Brush);

    /// Strokes an ellipse.
    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        brush: &Self::Brush,
        width: f64,
        style: Option<&Self::StrokeStyle>,
    );

    /// Strokes a line segment.
    fn draw_line(
        &mut self,
        p1: Point,
        p2: Point,
        brush: &Self::Brush,
        width: f64,
        style: Option<&Self::StrokeStyle>,
    );

    /// Fills a path geometry.
    fn fill_geometry(&mut self, geometry: &Self::Geometry, brush: &Self::Brush);

    /// Strokes a path geometry.
    fn stroke_geometry(
        &mut self,
        geometry: &Self::Geometry,
        brush: &Self::Brush,
        width: f64,
        style: Option<&Self::StrokeStyle>,
    );

    /// Draws a text layout with its top-left corner at `origin`.
    fn draw_text_layout(&mut self, origin: Point, layout: &Self::TextLayout, brush: &Self::Brush);
}

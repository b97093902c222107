// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgscene` is a static SVG renderer over an abstract graphics device.

The crate parses an SVG document into a scene tree, resolves styling and
cross-references, binds backend resources and draws the scene through the
[`Device`] capability, which mirrors a Direct2D-like device context
without depending on it.

The pipeline runs in distinct phases:

1. the XML tokenizer produces an element-level event stream;
2. the builder turns events into a tree of [`Element`] nodes and collects
   the id indexes;
3. the reference resolver clones `<use>` targets in place and folds
   gradient template chains;
4. the asset binder materializes brushes, stroke styles and text layouts
   from the computed styles;
5. [`render`] walks the tree depth-first, composing transforms onto the
   device.

Parsing and rendering are separate: an [`Image`] may be rendered any
number of times against the device it was parsed with.

## Limitations

- Static SVG subset only: no scripting, animation, CSS selectors,
  filters, masks, clip paths or patterns.
- Text is laid out on a single line; `tspan` is not supported.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::question_mark)]

mod builder;
mod color;
mod device;
mod error;
mod geom;
mod length;
mod options;
mod paint;
mod pathdata;
mod render;
mod resolve;
mod stream;
mod style;
mod transform;
mod tree;
mod xmlstream;

pub use crate::color::Color;
pub use crate::device::{
    ArcSegment, Device, FigureEnd, FontStyle, FontWeight, GeometrySink, GradientStop, LineCap,
    LineJoin, StrokeProperties, TextMetrics,
};
pub use crate::error::Error;
pub use crate::geom::{FuzzyEq, FuzzyZero, Point, Rect, Size};
pub use crate::length::{Length, LengthUnit};
pub use crate::options::Options;
pub use crate::pathdata::{PathParser, PathSegment};
pub use crate::render::render;
pub use crate::stream::{Stream, StreamError};
pub use crate::transform::Transform;
pub use crate::tree::{
    Element, GradientUnits, Image, Kind, LinearGradient, Node, RadialGradient,
};
pub use crate::xmlstream::{Attribute, Event, EventStream};

use std::path::Path;

impl<D: Device> Image<D> {
    /// Parses an SVG file into an image bound to `device`.
    ///
    /// Only fatal defects fail the parse: an unreadable file, broken XML
    /// or a structurally malformed document. Everything else is recovered
    /// by skipping the offending element.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        device: &mut D,
        opt: &Options,
    ) -> Result<Self, Error> {
        let raw = std::fs::read(path)?;
        let text = std::str::from_utf8(&raw).map_err(|_| Error::NotAnUtf8Str)?;
        Self::from_str(text, device, opt)
    }

    /// Parses an SVG string into an image bound to `device`.
    pub fn from_str(text: &str, device: &mut D, opt: &Options) -> Result<Self, Error> {
        let image = builder::parse_document(text, device)?;
        resolve::resolve_references(&image);
        paint::bind_assets(&image, device, opt);
        Ok(image)
    }
}

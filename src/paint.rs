// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The asset binder: walks the resolved tree and materializes backend
//! resources (brushes, stroke styles, text layouts) for every drawable
//! element, using the computed style through an explicit parent stack.

use std::collections::HashMap;
use std::str::FromStr;

use crate::color::Color;
use crate::device::{
    Device, FontStyle, FontWeight, GradientStop, LineCap, LineJoin, StrokeProperties,
};
use crate::geom::{Point, Rect};
use crate::length::Length;
use crate::options::Options;
use crate::stream::Stream;
use crate::style::{computed_style, computed_style_or, parse_func_iri};
use crate::transform::Transform;
use crate::tree::{Element, GradientUnits, Image, Kind, Node};

pub(crate) fn bind_assets<D: Device>(image: &Image<D>, device: &mut D, opt: &Options) {
    let root = match image.root() {
        Some(root) => root,
        None => return,
    };

    let dpi = {
        let (dpi_x, dpi_y) = device.dpi();
        (dpi_x + dpi_y) / 2.0
    };

    let mut stack = Vec::new();
    bind_node(&root, &mut stack, &image.id_map, device, opt, dpi);

    // Binding replaces the placeholder text boxes with measured ones,
    // so the ancestor unions must be computed again.
    refresh_bboxes(&root, device);
}

fn refresh_bboxes<D: Device>(node: &Node<D>, device: &D) {
    let children: Vec<Node<D>> = node.borrow().children.clone();
    for child in &children {
        refresh_bboxes(child, device);
    }

    node.borrow_mut().compute_bbox(device);
}

fn bind_node<D: Device>(
    node: &Node<D>,
    stack: &mut Vec<Node<D>>,
    id_map: &HashMap<String, Node<D>>,
    device: &mut D,
    opt: &Options,
    dpi: f64,
) {
    bind_element(node, stack, id_map, device, opt, dpi);

    stack.push(node.clone());
    let children: Vec<Node<D>> = node.borrow().children.clone();
    for child in &children {
        bind_node(child, stack, id_map, device, opt, dpi);
    }
    stack.pop();
}

fn bind_element<D: Device>(
    node: &Node<D>,
    stack: &[Node<D>],
    id_map: &HashMap<String, Node<D>>,
    device: &mut D,
    opt: &Options,
    dpi: f64,
) {
    let (drawable, is_text) = {
        let element = node.borrow();
        (
            matches!(
                element.kind,
                Kind::Rect
                    | Kind::Circle
                    | Kind::Ellipse
                    | Kind::Line
                    | Kind::Path { .. }
                    | Kind::Text { .. }
            ),
            matches!(element.kind, Kind::Text { .. }),
        )
    };

    // Containers and definitions carry no brushes of their own.
    if !drawable {
        return;
    }

    // Text layout comes first: a gradient fill on the text needs the
    // metrics-refined bbox.
    if is_text {
        bind_text(node, stack, device, opt, dpi);
    }

    let element = node.borrow();

    let stroke_value = computed_style_or(&element, stack, "stroke", "none");
    let stroke_opacity = opacity_value(computed_style(&element, stack, "stroke-opacity"), dpi);

    let cap = match computed_style(&element, stack, "stroke-linecap").as_deref() {
        Some("round") => LineCap::Round,
        Some("square") => LineCap::Square,
        _ => LineCap::Butt,
    };
    let join = match computed_style(&element, stack, "stroke-linejoin").as_deref() {
        Some("bevel") => LineJoin::Bevel,
        Some("round") => LineJoin::Round,
        _ => LineJoin::Miter,
    };
    let miter_limit = computed_style(&element, stack, "stroke-miterlimit")
        .and_then(|v| size_value(&v, dpi))
        .unwrap_or(4.0);

    let fill_value = computed_style_or(&element, stack, "fill", "black");
    let fill_opacity = opacity_value(computed_style(&element, stack, "fill-opacity"), dpi);

    let stroke_width =
        computed_style(&element, stack, "stroke-width").and_then(|v| size_value(&v, dpi));

    let bbox = element.bbox;
    drop(element);

    let (stroke_brush, stroke_style) = if stroke_value == "none" {
        (None, None)
    } else {
        let brush = make_brush(&stroke_value, stroke_opacity, bbox, id_map, device);
        let properties = StrokeProperties {
            start_cap: cap,
            end_cap: cap,
            dash_cap: LineCap::Round,
            line_join: join,
            miter_limit,
        };

        (brush, device.create_stroke_style(&properties))
    };

    let fill_brush = if fill_value == "none" {
        None
    } else {
        make_brush(&fill_value, fill_opacity, bbox, id_map, device)
    };

    let mut element = node.borrow_mut();
    element.stroke_brush = stroke_brush;
    element.stroke_style = stroke_style;
    element.fill_brush = fill_brush;
    if let Some(width) = stroke_width {
        element.stroke_width = width;
    }
}

/// Creates a brush for a `fill`/`stroke` value.
///
/// A hex color and an id-only reference both start with `#`, so the color
/// grammar is tried first and `url(#id)` second.
fn make_brush<D: Device>(
    value: &str,
    opacity: f64,
    bbox: Rect,
    id_map: &HashMap<String, Node<D>>,
    device: &mut D,
) -> Option<D::Brush> {
    if let Ok(color) = Color::from_str(value) {
        return device.create_solid_brush(color.with_opacity(opacity));
    }

    let id = match parse_func_iri(value) {
        Some(id) => id,
        None => {
            log::warn!("Failed to parse the paint value: '{}'.", value);
            return None;
        }
    };

    let target = match id_map.get(id) {
        Some(target) => target.clone(),
        None => {
            log::warn!("Paint refers to a non-existing element: '#{}'.", id);
            return None;
        }
    };

    let kind = {
        let element = target.borrow();
        match element.kind {
            Kind::LinearGradient(_) => 0,
            Kind::RadialGradient(_) => 1,
            _ => {
                log::warn!("Paint reference '#{}' is not a gradient. Ignored.", id);
                return None;
            }
        }
    };

    if kind == 0 {
        linear_gradient_brush(&target, bbox, device)
    } else {
        radial_gradient_brush(&target, bbox, device)
    }
}

fn linear_gradient_brush<D: Device>(
    gradient: &Node<D>,
    bbox: Rect,
    device: &mut D,
) -> Option<D::Brush> {
    let (stops, points, units, transform) = {
        let element = gradient.borrow();
        let units = match element.kind {
            Kind::LinearGradient(ref g) => g.units.unwrap_or(GradientUnits::ObjectBoundingBox),
            _ => return None,
        };

        (
            collect_stops(&element),
            element.points.clone(),
            units,
            element.transform,
        )
    };

    if stops.is_empty() {
        log::warn!("A gradient without stops cannot be used.");
        return None;
    }

    // An unresolved gradient (one that never made it into the tree)
    // has no effective geometry.
    if points.len() < 4 {
        return None;
    }

    let (x1, y1, x2, y2) = (points[0], points[1], points[2], points[3]);

    let (start, end) = match units {
        GradientUnits::ObjectBoundingBox => {
            let (w, h) = (bbox.width(), bbox.height());
            (
                Point::new(bbox.left + x1 * w, bbox.top + y1 * h),
                Point::new(bbox.left + x2 * w, bbox.top + y2 * h),
            )
        }
        GradientUnits::UserSpaceOnUse => (Point::new(x1, y1), Point::new(x2, y2)),
    };

    let transform = transform.map(|ts| wrap_gradient_transform(ts, units, bbox));

    device.create_linear_gradient_brush(start, end, &stops, transform)
}

fn radial_gradient_brush<D: Device>(
    gradient: &Node<D>,
    bbox: Rect,
    device: &mut D,
) -> Option<D::Brush> {
    let (stops, points, units, transform) = {
        let element = gradient.borrow();
        let units = match element.kind {
            Kind::RadialGradient(ref g) => g.units.unwrap_or(GradientUnits::ObjectBoundingBox),
            _ => return None,
        };

        (
            collect_stops(&element),
            element.points.clone(),
            units,
            element.transform,
        )
    };

    if stops.is_empty() {
        log::warn!("A gradient without stops cannot be used.");
        return None;
    }

    if points.len() < 6 {
        return None;
    }

    // `points` holds `cx cy r fx fy fr`; the focal radius is carried but
    // the Direct2D-like capability has nowhere to put it.
    let (cx, cy, r, fx, fy) = (points[0], points[1], points[2], points[3], points[4]);

    let (center, origin_offset, radius_x, radius_y) = match units {
        GradientUnits::ObjectBoundingBox => {
            let (w, h) = (bbox.width(), bbox.height());
            (
                Point::new(bbox.left + cx * w, bbox.top + cy * h),
                // The offset is the delta from the centre,
                // not the focal position itself.
                Point::new((fx - cx) * w, (fy - cy) * h),
                r * w,
                r * h,
            )
        }
        GradientUnits::UserSpaceOnUse => {
            (Point::new(cx, cy), Point::new(fx - cx, fy - cy), r, r)
        }
    };

    let transform = transform.map(|ts| wrap_gradient_transform(ts, units, bbox));

    device.create_radial_gradient_brush(center, origin_offset, radius_x, radius_y, &stops, transform)
}

/// Under `objectBoundingBox` units a gradient transform rotates around
/// the bbox corner, so it gets wrapped in a translate pair.
fn wrap_gradient_transform(ts: Transform, units: GradientUnits, bbox: Rect) -> Transform {
    match units {
        GradientUnits::ObjectBoundingBox => Transform::from_translate(bbox.left, bbox.top)
            .pre_concat(ts)
            .pre_concat(Transform::from_translate(-bbox.left, -bbox.top)),
        GradientUnits::UserSpaceOnUse => ts,
    }
}

fn collect_stops<D: Device>(element: &Element<D>) -> Vec<GradientStop> {
    element
        .children
        .iter()
        .filter_map(|child| {
            let child = child.borrow();
            match child.kind {
                Kind::Stop { offset, color } => Some(GradientStop { offset, color }),
                _ => None,
            }
        })
        .collect()
}

fn bind_text<D: Device>(
    node: &Node<D>,
    stack: &[Node<D>],
    device: &mut D,
    opt: &Options,
    dpi: f64,
) {
    let (family, weight, font_style, size, content) = {
        let element = node.borrow();

        let family = computed_style_or(&element, stack, "font-family", &opt.font_family);
        let weight = font_weight(&computed_style_or(&element, stack, "font-weight", "normal"));
        let font_style = match computed_style(&element, stack, "font-style").as_deref() {
            Some("italic") => FontStyle::Italic,
            Some("oblique") => FontStyle::Oblique,
            _ => FontStyle::Normal,
        };
        let size = computed_style(&element, stack, "font-size")
            .and_then(|v| size_value(&v, dpi))
            .unwrap_or(opt.font_size);

        let content = match element.kind {
            Kind::Text { ref content, .. } => content.clone(),
            _ => return,
        };

        (family, weight, font_style, size, content)
    };

    // Walk the family list until the backend accepts one.
    let format = family
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .find_map(|f| device.create_text_format(f, weight, font_style, size));

    let format = match format {
        Some(format) => format,
        None => {
            log::warn!("No usable font family in '{}'.", family);
            return;
        }
    };

    let surface = device.size();
    let layout = match device.create_text_layout(&content, &format, surface.width, surface.height) {
        Some(layout) => layout,
        None => {
            log::warn!("Failed to lay out text: '{}'.", content);
            return;
        }
    };

    let metrics = device.text_metrics(&layout);

    let mut element = node.borrow_mut();
    let x = element.points[0];
    let y = element.points[1];

    // Replace the build-time placeholder with the real drawn region:
    // the layout box, shifted so the baseline sits at `y`.
    element.bbox = Rect::new(
        x,
        y - metrics.baseline,
        x + metrics.width,
        y - metrics.baseline + metrics.height,
    );

    if let Kind::Text {
        layout: ref mut slot,
        baseline: ref mut baseline_slot,
        ..
    } = element.kind
    {
        *slot = Some(layout);
        *baseline_slot = metrics.baseline;
    }
}

fn font_weight(text: &str) -> FontWeight {
    match text {
        "thin" => FontWeight(100),
        "light" => FontWeight(300),
        "normal" => FontWeight::NORMAL,
        "medium" => FontWeight(500),
        "semibold" => FontWeight(600),
        "bold" => FontWeight::BOLD,
        "black" => FontWeight(900),
        _ => {
            let mut s = Stream::from(text);
            match s.parse_number() {
                Ok(n) if (1.0..=1000.0).contains(&n) => FontWeight(n as u16),
                _ => FontWeight::NORMAL,
            }
        }
    }
}

/// Resolves a style string as a dimensional value.
fn size_value(text: &str, dpi: f64) -> Option<f64> {
    Length::from_str(text).ok().map(|length| length.to_px(dpi))
}

/// Resolves an opacity value; both plain numbers and percentages are
/// accepted, anything else falls back to fully opaque.
fn opacity_value(value: Option<String>, dpi: f64) -> f64 {
    value.and_then(|v| size_value(&v, dpi)).unwrap_or(1.0)
}

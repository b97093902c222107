// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::color::Color;
use crate::device::Device;
use crate::geom::{Point, Rect};
use crate::tree::{Element, Image, Kind, Node};

/// Renders a parsed image into the device's target surface.
///
/// The walk is depth-first: each element's local transform is composed
/// onto the device transform for the duration of its subtree.
pub fn render<D: Device>(device: &mut D, image: &Image<D>) {
    device.begin_draw();
    device.clear(Color::white());

    if let Some(root) = image.root() {
        render_node(device, &root);
    }

    device.end_draw();
}

fn render_node<D: Device>(device: &mut D, node: &Node<D>) {
    let element = node.borrow();

    // Template definitions are only drawn through `<use>` clones.
    if matches!(element.kind, Kind::Defs) {
        return;
    }

    let saved = device.transform();
    if let Some(local) = element.transform {
        // The local transform applies to the element's own coordinates
        // before everything inherited from the ancestors.
        device.set_transform(saved.pre_concat(local));
    }

    draw(device, &element);

    for child in &element.children {
        render_node(device, child);
    }

    if element.transform.is_some() {
        device.set_transform(saved);
    }
}

fn draw<D: Device>(device: &mut D, element: &Element<D>) {
    let p = &element.points;

    match element.kind {
        Kind::Rect => {
            let rect = Rect::from_xywh(p[0], p[1], p[2], p[3]);
            let radii = if p.len() == 6 { Some((p[4], p[5])) } else { None };

            if let Some(ref brush) = element.fill_brush {
                device.fill_rect(rect, radii, brush);
            }
            if let Some(ref brush) = element.stroke_brush {
                device.stroke_rect(
                    rect,
                    radii,
                    brush,
                    element.stroke_width,
                    element.stroke_style.as_ref(),
                );
            }
        }
        Kind::Circle => {
            let center = Point::new(p[0], p[1]);

            if let Some(ref brush) = element.fill_brush {
                device.fill_ellipse(center, p[2], p[2], brush);
            }
            if let Some(ref brush) = element.stroke_brush {
                device.stroke_ellipse(
                    center,
                    p[2],
                    p[2],
                    brush,
                    element.stroke_width,
                    element.stroke_style.as_ref(),
                );
            }
        }
        Kind::Ellipse => {
            let center = Point::new(p[0], p[1]);

            if let Some(ref brush) = element.fill_brush {
                device.fill_ellipse(center, p[2], p[3], brush);
            }
            if let Some(ref brush) = element.stroke_brush {
                device.stroke_ellipse(
                    center,
                    p[2],
                    p[3],
                    brush,
                    element.stroke_width,
                    element.stroke_style.as_ref(),
                );
            }
        }
        Kind::Line => {
            if let Some(ref brush) = element.stroke_brush {
                device.draw_line(
                    Point::new(p[0], p[1]),
                    Point::new(p[2], p[3]),
                    brush,
                    element.stroke_width,
                    element.stroke_style.as_ref(),
                );
            }
        }
        Kind::Path { ref geometry } => {
            if let Some(ref brush) = element.fill_brush {
                device.fill_geometry(geometry, brush);
            }
            if let Some(ref brush) = element.stroke_brush {
                device.stroke_geometry(
                    geometry,
                    brush,
                    element.stroke_width,
                    element.stroke_style.as_ref(),
                );
            }
        }
        Kind::Text {
            ref layout,
            baseline,
            ..
        } => {
            // The `y` coordinate denotes the baseline, while the backend
            // draws from the layout's top-left corner.
            if let (Some(layout), Some(brush)) = (layout.as_ref(), element.fill_brush.as_ref()) {
                device.draw_text_layout(Point::new(p[0], p[1] - baseline), layout, brush);
            }
        }
        // Containers and definitions draw nothing themselves.
        _ => {}
    }
}

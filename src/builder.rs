// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::color::Color;
use crate::device::Device;
use crate::error::Error;
use crate::length::Length;
use crate::pathdata;
use crate::stream::{collapse_whitespace, Stream};
use crate::style::{self, collect_styles, parse_func_iri};
use crate::transform::Transform;
use crate::tree::{Element, GradientUnits, Image, Kind, LinearGradient, Node, RadialGradient};
use crate::xmlstream::{attr, href_attr, Attribute, Event, EventStream};

/// Consumes the XML event stream and produces the scene tree with its
/// id indexes.
pub(crate) fn parse_document<D: Device>(text: &str, device: &mut D) -> Result<Image<D>, Error> {
    let dpi = {
        let (dpi_x, dpi_y) = device.dpi();
        (dpi_x + dpi_y) / 2.0
    };

    let mut builder = Builder {
        device,
        dpi,
        image: Image::new(),
        parent_stack: Vec::new(),
    };

    let mut events = EventStream::from(text);
    while let Some(event) = events.next_event()? {
        match event {
            Event::ElementStart {
                name,
                attributes,
                self_closing,
            } => builder.start_element(name, &attributes, self_closing),
            Event::Text(text) => builder.text(text)?,
            Event::ElementEnd(_) => builder.end_element(),
        }
    }

    if !builder.parent_stack.is_empty() {
        return Err(Error::UnclosedDocument);
    }

    Ok(builder.image)
}

struct Builder<'a, D: Device> {
    device: &'a mut D,
    // The average of the horizontal and vertical device DPI,
    // used for unit conversion.
    dpi: f64,
    image: Image<D>,
    // The path from the root to the currently open element.
    // Skipped elements occupy a `None` slot so end tags stay balanced.
    parent_stack: Vec<Option<Node<D>>>,
}

impl<'a, D: Device> Builder<'a, D> {
    fn start_element(&mut self, name: &str, attributes: &[Attribute], self_closing: bool) {
        let node = match self.convert_element(name, attributes) {
            Some(mut element) => {
                self.attach_transform(&mut element, attributes);
                collect_styles(attributes, &mut element.styles);

                let node = Node::new(element);

                if self.image.root.is_none() && name == "svg" {
                    self.image.root = Some(node.clone());
                }

                if let Some(id) = attr(attributes, "id") {
                    self.image.id_map.insert(id.to_string(), node.clone());

                    if let Some(Some(parent)) = self.parent_stack.last() {
                        if parent.borrow().tag == "defs" {
                            self.image.defs_map.insert(id.to_string(), node.clone());
                        }
                    }
                }

                if let Some(Some(parent)) = self.parent_stack.last() {
                    parent.borrow_mut().children.push(node.clone());
                }

                Some(node)
            }
            None => None,
        };

        if self_closing {
            if let Some(node) = node {
                node.borrow_mut().compute_bbox(self.device);
            }
        } else {
            self.parent_stack.push(node);
        }
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        let slot = match self.parent_stack.last() {
            Some(slot) => slot.clone(),
            None => {
                // Inter-element whitespace outside the root is not
                // character data.
                if text.trim().is_empty() {
                    return Ok(());
                }

                return Err(Error::TextOutsideElement);
            }
        };

        // A skipped element; its character data is dropped with it.
        let node = match slot {
            Some(node) => node,
            None => return Ok(()),
        };

        // Character data is only kept inside `<text>`.
        if node.borrow().tag != "text" {
            return Ok(());
        }

        let stack: Vec<Node<D>> = self.parent_stack[..self.parent_stack.len() - 1]
            .iter()
            .filter_map(|slot| slot.clone())
            .collect();

        let white_space = {
            let element = node.borrow();
            style::computed_style_or(&element, &stack, "white-space", "normal")
        };

        let mut element = node.borrow_mut();
        if let Kind::Text {
            ref mut content, ..
        } = element.kind
        {
            if white_space == "normal" {
                collapse_whitespace(text, content);
            } else {
                content.push_str(text);
            }
        }

        Ok(())
    }

    fn end_element(&mut self) {
        // All children are attached now, so the bbox can be computed.
        if let Some(Some(node)) = self.parent_stack.pop() {
            node.borrow_mut().compute_bbox(self.device);
        }
    }

    fn convert_element(&mut self, name: &str, attributes: &[Attribute]) -> Option<Element<D>> {
        match name {
            "svg" => Some(self.convert_svg(attributes)),
            "rect" => self.convert_rect(attributes),
            "circle" => self.convert_circle(attributes),
            "ellipse" => self.convert_ellipse(attributes),
            "line" => self.convert_line(attributes),
            "path" => self.convert_path(attributes),
            "polyline" => self.convert_poly(name, attributes, false),
            "polygon" => self.convert_poly(name, attributes, true),
            "g" | "group" => Some(Element::new(name, Kind::Group)),
            "defs" => Some(Element::new(name, Kind::Defs)),
            "text" => Some(self.convert_text(attributes)),
            "use" => self.convert_use(attributes),
            "linearGradient" => Some(self.convert_linear_gradient(attributes)),
            "radialGradient" => Some(self.convert_radial_gradient(attributes)),
            "stop" => Some(self.convert_stop(attributes)),
            // Unknown elements become plain containers;
            // their children are still parsed.
            _ => Some(Element::new(name, Kind::Unknown)),
        }
    }

    fn convert_svg(&mut self, attributes: &[Attribute]) -> Element<D> {
        let mut element = Element::new("svg", Kind::Svg);
        let is_root = self.image.root.is_none();

        if !is_root {
            // An inner svg is positioned by its x/y pair.
            let x = self.size_attr(attributes, "x");
            let y = self.size_attr(attributes, "y");
            if let (Some(x), Some(y)) = (x, y) {
                element.transform = Some(Transform::from_translate(x, y));
            }
        }

        self.apply_view_box(&mut element, attributes, is_root);

        element
    }

    fn apply_view_box(&mut self, element: &mut Element<D>, attributes: &[Attribute], is_root: bool) {
        let text = match attr(attributes, "viewBox") {
            Some(text) => text,
            None => return,
        };

        // Viewport target size: explicit width/height, otherwise the device
        // size for the root element and the historic 300x150 for inner ones.
        let (default_w, default_h) = if is_root {
            let size = self.device.size();
            (size.width, size.height)
        } else {
            (300.0, 150.0)
        };
        let width = self.size_attr(attributes, "width").unwrap_or(default_w);
        let height = self.size_attr(attributes, "height").unwrap_or(default_h);

        let mut s = Stream::from(text);
        let numbers = (|| -> Result<[f64; 4], crate::stream::StreamError> {
            Ok([
                s.parse_list_number()?,
                s.parse_list_number()?,
                s.parse_list_number()?,
                s.parse_list_number()?,
            ])
        })();

        let [vb_x, vb_y, vb_w, vb_h] = match numbers {
            Ok(numbers) => numbers,
            Err(e) => {
                log::warn!("Failed to parse the viewBox value: '{}' cause {}.", text, e);
                return;
            }
        };

        if vb_w <= 0.0 || vb_h <= 0.0 {
            log::warn!("viewBox has a non-positive size: '{}'. Ignored.", text);
            return;
        }

        let scale = (width / vb_w).min(height / vb_h);
        let view_box_ts = Transform::from_scale(scale, scale)
            .pre_concat(Transform::from_translate(-vb_x, -vb_y));

        // An inner svg keeps its position translation; the viewBox mapping
        // applies to the content first.
        element.transform = Some(match element.transform {
            Some(position) => position.pre_concat(view_box_ts),
            None => view_box_ts,
        });
    }

    fn convert_rect(&mut self, attributes: &[Attribute]) -> Option<Element<D>> {
        let x = self.require_size(attributes, "x", "rect")?;
        let y = self.require_size(attributes, "y", "rect")?;
        let width = self.require_size(attributes, "width", "rect")?;
        let height = self.require_size(attributes, "height", "rect")?;

        let mut element = Element::new("rect", Kind::Rect);
        element.points.extend_from_slice(&[x, y, width, height]);

        let rx = self.size_attr(attributes, "rx");
        let ry = self.size_attr(attributes, "ry");
        if rx.is_some() || ry.is_some() {
            // A missing corner radius mirrors the present one.
            element.points.push(rx.or(ry).unwrap_or(0.0));
            element.points.push(ry.or(rx).unwrap_or(0.0));
        }

        Some(element)
    }

    fn convert_circle(&mut self, attributes: &[Attribute]) -> Option<Element<D>> {
        let cx = self.require_size(attributes, "cx", "circle")?;
        let cy = self.require_size(attributes, "cy", "circle")?;
        let r = self.require_size(attributes, "r", "circle")?;

        let mut element = Element::new("circle", Kind::Circle);
        element.points.extend_from_slice(&[cx, cy, r]);
        Some(element)
    }

    fn convert_ellipse(&mut self, attributes: &[Attribute]) -> Option<Element<D>> {
        let cx = self.size_attr(attributes, "cx").unwrap_or(0.0);
        let cy = self.size_attr(attributes, "cy").unwrap_or(0.0);
        let rx = self.require_size(attributes, "rx", "ellipse")?;
        let ry = self.require_size(attributes, "ry", "ellipse")?;

        let mut element = Element::new("ellipse", Kind::Ellipse);
        element.points.extend_from_slice(&[cx, cy, rx, ry]);
        Some(element)
    }

    fn convert_line(&mut self, attributes: &[Attribute]) -> Option<Element<D>> {
        let x1 = self.require_size(attributes, "x1", "line")?;
        let y1 = self.require_size(attributes, "y1", "line")?;
        let x2 = self.require_size(attributes, "x2", "line")?;
        let y2 = self.require_size(attributes, "y2", "line")?;

        let mut element = Element::new("line", Kind::Line);
        element.points.extend_from_slice(&[x1, y1, x2, y2]);
        Some(element)
    }

    fn convert_path(&mut self, attributes: &[Attribute]) -> Option<Element<D>> {
        let data = match attr(attributes, "d") {
            Some(data) => data,
            None => {
                log::warn!("Element 'path' requires the 'd' attribute. Skipped.");
                return None;
            }
        };

        let geometry = pathdata::build_geometry(self.device, data)?;
        Some(Element::new("path", Kind::Path { geometry }))
    }

    fn convert_poly(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        close: bool,
    ) -> Option<Element<D>> {
        let points = match attr(attributes, "points") {
            Some(points) => points,
            None => {
                log::warn!("Element '{}' requires the 'points' attribute. Skipped.", name);
                return None;
            }
        };

        // A poly element is a path with an implicit moveto
        // (and an implicit close for polygons).
        let mut data = String::with_capacity(points.len() + 2);
        data.push('M');
        data.push_str(points);
        if close {
            data.push('Z');
        }

        let geometry = pathdata::build_geometry(self.device, &data)?;
        Some(Element::new(name, Kind::Path { geometry }))
    }

    fn convert_text(&mut self, attributes: &[Attribute]) -> Element<D> {
        let x = self.size_attr(attributes, "x").unwrap_or(0.0);
        let y = self.size_attr(attributes, "y").unwrap_or(0.0);

        let mut element = Element::new(
            "text",
            Kind::Text {
                content: String::new(),
                layout: None,
                baseline: 0.0,
            },
        );
        element.points.extend_from_slice(&[x, y]);
        element
    }

    fn convert_use(&mut self, attributes: &[Attribute]) -> Option<Element<D>> {
        let href = match href_attr(attributes).and_then(parse_func_iri) {
            Some(href) => href,
            None => {
                log::warn!("Element 'use' without a resolvable 'href'. Skipped.");
                return None;
            }
        };

        Some(Element::new(
            "use",
            Kind::Use {
                href: href.to_string(),
            },
        ))
    }

    fn convert_linear_gradient(&mut self, attributes: &[Attribute]) -> Element<D> {
        let gradient = LinearGradient {
            href: href_attr(attributes)
                .and_then(parse_func_iri)
                .map(str::to_string),
            units: self.gradient_units(attributes),
            x1: self.size_attr(attributes, "x1"),
            y1: self.size_attr(attributes, "y1"),
            x2: self.size_attr(attributes, "x2"),
            y2: self.size_attr(attributes, "y2"),
        };

        Element::new("linearGradient", Kind::LinearGradient(gradient))
    }

    fn convert_radial_gradient(&mut self, attributes: &[Attribute]) -> Element<D> {
        let gradient = RadialGradient {
            href: href_attr(attributes)
                .and_then(parse_func_iri)
                .map(str::to_string),
            units: self.gradient_units(attributes),
            cx: self.size_attr(attributes, "cx"),
            cy: self.size_attr(attributes, "cy"),
            r: self.size_attr(attributes, "r"),
            fx: self.size_attr(attributes, "fx"),
            fy: self.size_attr(attributes, "fy"),
            fr: self.size_attr(attributes, "fr"),
        };

        Element::new("radialGradient", Kind::RadialGradient(gradient))
    }

    fn gradient_units(&self, attributes: &[Attribute]) -> Option<GradientUnits> {
        let text = attr(attributes, "gradientUnits")?;
        let units = GradientUnits::from_str(text);
        if units.is_none() {
            log::warn!("Unknown gradientUnits value: '{}'. Ignored.", text);
        }

        units
    }

    fn convert_stop(&mut self, attributes: &[Attribute]) -> Element<D> {
        let offset = self
            .size_attr(attributes, "offset")
            .unwrap_or(0.0)
            .max(0.0)
            .min(1.0);

        let mut color = Color::black();
        if let Some(text) = attr(attributes, "stop-color") {
            match Color::from_str(text) {
                Ok(c) => color = c,
                Err(e) => {
                    log::warn!("Failed to parse the stop-color value: '{}' cause {}.", text, e);
                }
            }
        }

        if let Some(opacity) = self.size_attr(attributes, "stop-opacity") {
            color = color.with_opacity(opacity);
        }

        Element::new("stop", Kind::Stop { offset, color })
    }

    fn attach_transform(&self, element: &mut Element<D>, attributes: &[Attribute]) {
        let text = match attr(attributes, "transform") {
            Some(text) => text,
            None => return,
        };

        match Transform::from_str(text) {
            Ok(ts) => {
                // A pre-existing transform (an inner svg translation or a
                // viewBox mapping) applies before the attribute's own.
                let base = element.transform.unwrap_or_default();
                element.transform = Some(ts.pre_concat(base));
            }
            Err(e) => {
                // The element is still kept; it just loses the bad transform.
                log::warn!("Failed to parse a transform value: '{}' cause {}.", text, e);
            }
        }
    }

    /// Reads an attribute as a dimensional value, resolved against the
    /// device DPI.
    fn size_attr(&self, attributes: &[Attribute], name: &str) -> Option<f64> {
        let value = attr(attributes, name)?;
        match Length::from_str(value) {
            Ok(length) => Some(length.to_px(self.dpi)),
            Err(e) => {
                log::warn!("Failed to parse the '{}' value: '{}' cause {}.", name, value, e);
                None
            }
        }
    }

    fn require_size(&self, attributes: &[Attribute], name: &str, tag: &str) -> Option<f64> {
        let value = self.size_attr(attributes, name);
        if value.is_none() {
            log::warn!("Element '{}' requires the '{}' attribute. Skipped.", tag, name);
        }

        value
    }
}

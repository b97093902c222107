// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use crate::color::Color;
use crate::device::Device;
use crate::geom::Rect;
use crate::transform::Transform;

/// Gradient units resolution.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GradientUnits {
    /// Gradient coordinates are fractions of the filled element's
    /// bounding box.
    ObjectBoundingBox,
    /// Gradient coordinates are used verbatim in the current user space.
    UserSpaceOnUse,
}

impl GradientUnits {
    pub(crate) fn from_str(text: &str) -> Option<Self> {
        match text {
            "objectBoundingBox" => Some(GradientUnits::ObjectBoundingBox),
            "userSpaceOnUse" => Some(GradientUnits::UserSpaceOnUse),
            _ => None,
        }
    }
}

/// A linear gradient payload.
///
/// Geometry attributes stay unset until the reference resolver folds the
/// template chain; `None` means "not supplied locally".
#[allow(missing_docs)]
#[derive(Clone, Default, Debug)]
pub struct LinearGradient {
    pub href: Option<String>,
    pub units: Option<GradientUnits>,
    pub x1: Option<f64>,
    pub y1: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

/// A radial gradient payload.
#[allow(missing_docs)]
#[derive(Clone, Default, Debug)]
pub struct RadialGradient {
    pub href: Option<String>,
    pub units: Option<GradientUnits>,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
    pub r: Option<f64>,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    pub fr: Option<f64>,
}

/// The per-variant payload of an element.
pub enum Kind<D: Device> {
    /// An `svg` element, root or inner.
    Svg,
    /// A `g` container.
    Group,
    /// A `defs` template container.
    Defs,
    /// A rectangle; `points` holds `x y w h [rx ry]`.
    Rect,
    /// A circle; `points` holds `cx cy r`.
    Circle,
    /// An ellipse; `points` holds `cx cy rx ry`.
    Ellipse,
    /// A line; `points` holds `x1 y1 x2 y2`.
    Line,
    /// A path with its backend geometry. `polyline` and `polygon`
    /// are also represented as paths.
    Path {
        /// The backend geometry built from the path data.
        geometry: D::Geometry,
    },
    /// A text element; `points` holds the `x y` baseline origin.
    Text {
        /// The accumulated character data.
        content: String,
        /// The backend layout, bound by the asset binder.
        layout: Option<D::TextLayout>,
        /// First line baseline offset, in pixels from the layout top.
        baseline: f64,
    },
    /// A `use` indirection, replaced by a clone during resolution.
    Use {
        /// The referenced element id.
        href: String,
    },
    /// A linear gradient definition.
    LinearGradient(LinearGradient),
    /// A radial gradient definition.
    RadialGradient(RadialGradient),
    /// A gradient stop.
    Stop {
        /// Stop offset in the 0..=1 range.
        offset: f64,
        /// Stop color with `stop-opacity` folded into the alpha.
        color: Color,
    },
    /// Any unrecognised element; behaves as a plain container.
    Unknown,
}

impl<D: Device> std::fmt::Debug for Kind<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Svg => f.debug_struct("Svg").finish(),
            Kind::Group => f.debug_struct("Group").finish(),
            Kind::Defs => f.debug_struct("Defs").finish(),
            Kind::Rect => f.debug_struct("Rect").finish(),
            Kind::Circle => f.debug_struct("Circle").finish(),
            Kind::Ellipse => f.debug_struct("Ellipse").finish(),
            Kind::Line => f.debug_struct("Line").finish(),
            Kind::Path { .. } => f.debug_struct("Path").finish(),
            Kind::Text {
                content, baseline, ..
            } => f
                .debug_struct("Text")
                .field("content", content)
                .field("baseline", baseline)
                .finish(),
            Kind::Use { href } => f.debug_struct("Use").field("href", href).finish(),
            Kind::LinearGradient(g) => f.debug_tuple("LinearGradient").field(g).finish(),
            Kind::RadialGradient(g) => f.debug_tuple("RadialGradient").field(g).finish(),
            Kind::Stop { offset, color } => f
                .debug_struct("Stop")
                .field("offset", offset)
                .field("color", color)
                .finish(),
            Kind::Unknown => f.debug_struct("Unknown").finish(),
        }
    }
}

impl<D: Device> Clone for Kind<D> {
    fn clone(&self) -> Self {
        match self {
            Kind::Svg => Kind::Svg,
            Kind::Group => Kind::Group,
            Kind::Defs => Kind::Defs,
            Kind::Rect => Kind::Rect,
            Kind::Circle => Kind::Circle,
            Kind::Ellipse => Kind::Ellipse,
            Kind::Line => Kind::Line,
            Kind::Path { geometry } => Kind::Path {
                geometry: geometry.clone(),
            },
            Kind::Text {
                content,
                layout,
                baseline,
            } => Kind::Text {
                content: content.clone(),
                layout: layout.clone(),
                baseline: *baseline,
            },
            Kind::Use { href } => Kind::Use { href: href.clone() },
            Kind::LinearGradient(g) => Kind::LinearGradient(g.clone()),
            Kind::RadialGradient(g) => Kind::RadialGradient(g.clone()),
            Kind::Stop { offset, color } => Kind::Stop {
                offset: *offset,
                color: *color,
            },
            Kind::Unknown => Kind::Unknown,
        }
    }
}

/// A single scene tree element.
///
/// Common fields live here; variant-specific data in [`Kind`].
pub struct Element<D: Device> {
    /// The element tag name.
    pub tag: String,
    /// The variant payload.
    pub kind: Kind<D>,
    /// Child elements, in document order.
    pub children: Vec<Node<D>>,
    /// The local transform. Not inherited; the renderer composes it
    /// onto the device transform while walking the tree.
    pub transform: Option<Transform>,
    /// Own-element style properties; inheritance is computed on demand
    /// through an explicit parent stack.
    pub styles: HashMap<String, String>,
    /// Variant-specific geometry parameters.
    pub points: Vec<f64>,
    /// The bounding box in element-local coordinates.
    pub bbox: Rect,
    /// The fill brush, bound by the asset binder.
    pub fill_brush: Option<D::Brush>,
    /// The stroke brush, bound by the asset binder.
    pub stroke_brush: Option<D::Brush>,
    /// The stroke style object, bound by the asset binder.
    pub stroke_style: Option<D::StrokeStyle>,
    /// The stroke width.
    pub stroke_width: f64,
}

impl<D: Device> std::fmt::Debug for Element<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("transform", &self.transform)
            .field("styles", &self.styles)
            .field("points", &self.points)
            .field("bbox", &self.bbox)
            .field("stroke_width", &self.stroke_width)
            .finish()
    }
}

impl<D: Device> Element<D> {
    /// Creates a new element of the given kind.
    pub fn new(tag: &str, kind: Kind<D>) -> Self {
        Element {
            tag: tag.to_string(),
            kind,
            children: Vec::new(),
            transform: None,
            styles: HashMap::new(),
            points: Vec::new(),
            bbox: Rect::default(),
            fill_brush: None,
            stroke_brush: None,
            stroke_style: None,
            stroke_width: 1.0,
        }
    }

    /// Computes the element bounding box: its own geometry united with
    /// the children's boxes.
    ///
    /// Must run after all children have been attached and measured,
    /// which the builder guarantees by calling it on the end tag.
    pub(crate) fn compute_bbox(&mut self, device: &D) {
        let mut bbox = self.own_bbox(device);

        for child in &self.children {
            let child_bbox = child.borrow().bbox;
            bbox = Some(match bbox {
                Some(b) => b.expand(child_bbox),
                None => child_bbox,
            });
        }

        if let Some(bbox) = bbox {
            self.bbox = bbox;
        }
    }

    fn own_bbox(&self, device: &D) -> Option<Rect> {
        let p = &self.points;
        match self.kind {
            Kind::Rect => Some(Rect::from_xywh(p[0], p[1], p[2], p[3])),
            Kind::Circle => Some(Rect::new(p[0] - p[2], p[1] - p[2], p[0] + p[2], p[1] + p[2])),
            Kind::Ellipse => Some(Rect::new(p[0] - p[2], p[1] - p[3], p[0] + p[2], p[1] + p[3])),
            Kind::Line => Some(Rect::new(
                p[0].min(p[2]),
                p[1].min(p[3]),
                p[0].max(p[2]),
                p[1].max(p[3]),
            )),
            Kind::Path { ref geometry } => Some(device.geometry_bounds(geometry)),
            // A rough placeholder until the asset binder has refined the
            // box from the real layout metrics.
            Kind::Text { ref layout, .. } => {
                if layout.is_some() {
                    Some(self.bbox)
                } else {
                    Some(Rect::new(p[0], p[1], p[0] + 600.0, p[1] + 200.0))
                }
            }
            _ => None,
        }
    }
}

/// A shared handle to an [`Element`].
///
/// Elements are co-owned: the tree, the id maps and `<use>` clones may all
/// hold handles to the same node. Interior mutability is required because
/// the asset binder populates backend resources after the tree is built.
pub struct Node<D: Device>(Rc<RefCell<Element<D>>>);

impl<D: Device> std::fmt::Debug for Node<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Node").field(&self.borrow()).finish()
    }
}

impl<D: Device> Clone for Node<D> {
    #[inline]
    fn clone(&self) -> Self {
        Node(self.0.clone())
    }
}

impl<D: Device> Node<D> {
    /// Wraps an element into a shared handle.
    pub fn new(element: Element<D>) -> Self {
        Node(Rc::new(RefCell::new(element)))
    }

    /// Borrows the element immutably.
    #[inline]
    pub fn borrow(&self) -> Ref<Element<D>> {
        self.0.borrow()
    }

    /// Borrows the element mutably.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<Element<D>> {
        self.0.borrow_mut()
    }

    /// Checks whether two handles point at the same element.
    #[inline]
    pub fn ptr_eq(a: &Node<D>, b: &Node<D>) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Creates a deep copy of the subtree.
    ///
    /// Element data is copied node by node, so mutating the copy never
    /// affects the original; backend handles are shared by value.
    pub fn deep_clone(&self) -> Node<D> {
        let el = self.borrow();
        let children = el.children.iter().map(|c| c.deep_clone()).collect();

        Node::new(Element {
            tag: el.tag.clone(),
            kind: el.kind.clone(),
            children,
            transform: el.transform,
            styles: el.styles.clone(),
            points: el.points.clone(),
            bbox: el.bbox,
            fill_brush: el.fill_brush.clone(),
            stroke_brush: el.stroke_brush.clone(),
            stroke_style: el.stroke_style.clone(),
            stroke_width: el.stroke_width,
        })
    }
}

/// A parsed SVG document: the scene tree plus its id indexes.
pub struct Image<D: Device> {
    pub(crate) root: Option<Node<D>>,
    pub(crate) id_map: HashMap<String, Node<D>>,
    pub(crate) defs_map: HashMap<String, Node<D>>,
}

impl<D: Device> std::fmt::Debug for Image<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("root", &self.root)
            .field("id_map", &self.id_map)
            .field("defs_map", &self.defs_map)
            .finish()
    }
}

impl<D: Device> Image<D> {
    pub(crate) fn new() -> Self {
        Image {
            root: None,
            id_map: HashMap::new(),
            defs_map: HashMap::new(),
        }
    }

    /// Returns the root `svg` element, if the document had one.
    pub fn root(&self) -> Option<Node<D>> {
        self.root.clone()
    }

    /// Returns the element registered under `id`.
    pub fn node_by_id(&self, id: &str) -> Option<Node<D>> {
        self.id_map.get(id).cloned()
    }

    /// Returns the element registered under `id` directly inside `<defs>`.
    pub fn defs_by_id(&self, id: &str) -> Option<Node<D>> {
        self.defs_map.get(id).cloned()
    }

    /// Releases the scene tree and all backend resources it holds.
    pub fn clear(&mut self) {
        self.root = None;
        self.id_map.clear();
        self.defs_map.clear();
    }
}

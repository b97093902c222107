// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The second pass over a built tree: replaces `<use>` nodes with clones
//! of their targets and folds gradient template chains, so the asset
//! binder can treat every element as self-contained.

use std::collections::HashMap;

use crate::device::Device;
use crate::tree::{Image, Kind, Node};

// References nested deeper than this are assumed to be recursive.
const MAX_REFERENCE_DEPTH: u32 = 1024;

pub(crate) fn resolve_references<D: Device>(image: &Image<D>) {
    let root = match image.root() {
        Some(root) => root,
        None => return,
    };

    resolve_node(&root, &image.id_map, 0);
}

fn resolve_node<D: Device>(node: &Node<D>, id_map: &HashMap<String, Node<D>>, depth: u32) {
    if depth > MAX_REFERENCE_DEPTH {
        log::warn!("Element references are nested too deeply. Skipped.");
        return;
    }

    let mut i = 0;
    loop {
        let child = {
            let element = node.borrow();
            match element.children.get(i) {
                Some(child) => child.clone(),
                None => break,
            }
        };

        // Substitute a `use` with a clone of its target.
        let child = match use_href(&child) {
            Some(href) => match id_map.get(&href) {
                Some(target) => {
                    let clone = target.deep_clone();
                    transfer_use_properties(&child, &clone);
                    node.borrow_mut().children[i] = clone.clone();
                    clone
                }
                None => {
                    log::warn!("'use' refers to a non-existing element: '#{}'. Skipped.", href);
                    node.borrow_mut().children.remove(i);
                    continue;
                }
            },
            None => child,
        };

        resolve_gradient(&child, id_map);

        resolve_node(&child, id_map, depth + 1);
        i += 1;
    }
}

fn use_href<D: Device>(node: &Node<D>) -> Option<String> {
    match node.borrow().kind {
        Kind::Use { ref href } => Some(href.clone()),
        _ => None,
    }
}

/// Moves the `use` element's own transform and styles onto the clone
/// that replaces it.
///
/// The transform wraps the referenced content; the styles behave like
/// inherited ones, so the clone's own properties win.
fn transfer_use_properties<D: Device>(use_node: &Node<D>, clone: &Node<D>) {
    let use_element = use_node.borrow();
    let mut element = clone.borrow_mut();

    if let Some(use_ts) = use_element.transform {
        element.transform = Some(match element.transform {
            Some(own) => use_ts.pre_concat(own),
            None => use_ts,
        });
    }

    for (name, value) in &use_element.styles {
        element
            .styles
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
}

/// Folds a gradient's template chain and writes the effective endpoint
/// parameters into `points`.
fn resolve_gradient<D: Device>(node: &Node<D>, id_map: &HashMap<String, Node<D>>) {
    let is_linear = matches!(node.borrow().kind, Kind::LinearGradient(_));
    let is_radial = matches!(node.borrow().kind, Kind::RadialGradient(_));
    if !is_linear && !is_radial {
        return;
    }

    // Collect the template chain, nearest template first.
    let mut chain: Vec<Node<D>> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut next = gradient_href(node);

    while let Some(id) = next {
        if seen.iter().any(|s| *s == id) {
            log::warn!("Gradient template chain contains a loop: '#{}'. Truncated.", id);
            break;
        }

        let target = match id_map.get(&id) {
            Some(target) => target.clone(),
            None => {
                log::warn!("Gradient refers to a non-existing template: '#{}'.", id);
                break;
            }
        };

        let same_kind = (is_linear && matches!(target.borrow().kind, Kind::LinearGradient(_)))
            || (is_radial && matches!(target.borrow().kind, Kind::RadialGradient(_)));
        if !same_kind {
            log::warn!("Gradient template '#{}' has a different kind. Ignored.", id);
            break;
        }

        seen.push(id);
        next = gradient_href(&target);
        chain.push(target);
    }

    // Adopt the attributes the gradient did not set itself.
    for template in &chain {
        if Node::ptr_eq(template, node) {
            continue;
        }

        let template = template.borrow();
        let mut element = node.borrow_mut();
        match (&mut element.kind, &template.kind) {
            (Kind::LinearGradient(g), Kind::LinearGradient(t)) => {
                if g.units.is_none() {
                    g.units = t.units;
                }
                if g.x1.is_none() {
                    g.x1 = t.x1;
                }
                if g.y1.is_none() {
                    g.y1 = t.y1;
                }
                if g.x2.is_none() {
                    g.x2 = t.x2;
                }
                if g.y2.is_none() {
                    g.y2 = t.y2;
                }
            }
            (Kind::RadialGradient(g), Kind::RadialGradient(t)) => {
                if g.units.is_none() {
                    g.units = t.units;
                }
                if g.cx.is_none() {
                    g.cx = t.cx;
                }
                if g.cy.is_none() {
                    g.cy = t.cy;
                }
                if g.r.is_none() {
                    g.r = t.r;
                }
                if g.fx.is_none() {
                    g.fx = t.fx;
                }
                if g.fy.is_none() {
                    g.fy = t.fy;
                }
                if g.fr.is_none() {
                    g.fr = t.fr;
                }
            }
            _ => {}
        }
    }

    // Adopt the stops from the nearest template that has any.
    if !has_stops(node) {
        let template = chain
            .iter()
            .filter(|t| !Node::ptr_eq(t, node))
            .find(|t| has_stops(t));

        if let Some(template) = template {
            let stops: Vec<Node<D>> = template
                .borrow()
                .children
                .iter()
                .map(|stop| stop.deep_clone())
                .collect();
            node.borrow_mut().children = stops;
        }
    }

    // Record the effective endpoint parameters.
    let points = {
        let element = node.borrow();
        match element.kind {
            Kind::LinearGradient(ref g) => vec![
                g.x1.unwrap_or(0.0),
                g.y1.unwrap_or(0.0),
                g.x2.unwrap_or(1.0),
                g.y2.unwrap_or(0.0),
            ],
            Kind::RadialGradient(ref g) => {
                let cx = g.cx.unwrap_or(0.5);
                let cy = g.cy.unwrap_or(0.5);
                vec![
                    cx,
                    cy,
                    g.r.unwrap_or(0.5),
                    g.fx.unwrap_or(cx),
                    g.fy.unwrap_or(cy),
                    g.fr.unwrap_or(0.0),
                ]
            }
            _ => return,
        }
    };

    node.borrow_mut().points = points;
}

fn gradient_href<D: Device>(node: &Node<D>) -> Option<String> {
    match node.borrow().kind {
        Kind::LinearGradient(ref g) => g.href.clone(),
        Kind::RadialGradient(ref g) => g.href.clone(),
        _ => None,
    }
}

fn has_stops<D: Device>(node: &Node<D>) -> bool {
    node.borrow()
        .children
        .iter()
        .any(|child| matches!(child.borrow().kind, Kind::Stop { .. }))
}

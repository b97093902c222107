// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use crate::device::Device;
use crate::tree::{Element, Node};
use crate::xmlstream::{attr, Attribute};

/// Presentation attributes that participate in styling.
///
/// Each is equivalent to the CSS property of the same name, with lower
/// specificity than the `style` attribute.
const PRESENTATION_ATTRIBUTES: &[&str] = &[
    "fill",
    "fill-opacity",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
];

/// Merges the `style` attribute and the presentation attributes into
/// one property map.
///
/// `style` entries win: a presentation attribute never overrides one.
pub(crate) fn collect_styles(attributes: &[Attribute], styles: &mut HashMap<String, String>) {
    if let Some(style) = attr(attributes, "style") {
        parse_style_attribute(style, styles);
    }

    for name in PRESENTATION_ATTRIBUTES {
        if let Some(value) = attr(attributes, *name) {
            if !styles.contains_key(*name) {
                styles.insert((*name).to_string(), value.to_string());
            }
        }
    }
}

/// A simple parser for inline CSS declarations.
///
/// Splits on `;`, then each declaration on the first `:`; both sides are
/// trimmed and empty properties or values are discarded.
pub(crate) fn parse_style_attribute(text: &str, styles: &mut HashMap<String, String>) {
    for declaration in text.split(';') {
        if let Some(pos) = declaration.find(':') {
            let property = declaration[..pos].trim();
            let value = declaration[pos + 1..].trim();

            if !property.is_empty() && !value.is_empty() {
                styles.insert(property.to_string(), value.to_string());
            }
        }
    }
}

/// Computes a style property for an element.
///
/// The element's own properties win; otherwise the parent stack is
/// searched from the innermost ancestor outwards.
pub(crate) fn computed_style<D: Device>(
    element: &Element<D>,
    stack: &[Node<D>],
    name: &str,
) -> Option<String> {
    if let Some(value) = element.styles.get(name) {
        return Some(value.clone());
    }

    for parent in stack.iter().rev() {
        if let Some(value) = parent.borrow().styles.get(name) {
            return Some(value.clone());
        }
    }

    None
}

/// Like [`computed_style`], with a default.
pub(crate) fn computed_style_or<D: Device>(
    element: &Element<D>,
    stack: &[Node<D>],
    name: &str,
    default: &str,
) -> String {
    computed_style(element, stack, name).unwrap_or_else(|| default.to_string())
}

/// Extracts the id out of a reference value.
///
/// Accepts `#id` and `url(#id)`, the latter with optional single or
/// double quotes around the fragment.
pub(crate) fn parse_func_iri(text: &str) -> Option<&str> {
    let mut s = text.trim_start();

    // Only the functional form is unwrapped; a bare `#id` whose text
    // happens to contain "url" must fall through untouched.
    if s.starts_with("url(") {
        let end = s.rfind(')')?;
        s = &s[4..end];

        if let Some(rest) = s.strip_prefix('\'').or_else(|| s.strip_prefix('"')) {
            s = rest;
        }
        if let Some(rest) = s.strip_suffix('\'').or_else(|| s.strip_suffix('"')) {
            s = rest;
        }
    }

    let s = s.trim().strip_prefix('#')?;
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_attribute_1() {
        let mut styles = HashMap::new();
        parse_style_attribute("fill: red; stroke :blue ;;", &mut styles);
        assert_eq!(styles.get("fill").map(|s| s.as_str()), Some("red"));
        assert_eq!(styles.get("stroke").map(|s| s.as_str()), Some("blue"));
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn style_attribute_2() {
        let mut styles = HashMap::new();
        parse_style_attribute("fill:;:red;stroke", &mut styles);
        assert!(styles.is_empty());
    }

    macro_rules! test_iri {
        ($name:ident, $text:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(parse_func_iri($text), $result);
            }
        )
    }

    test_iri!(iri_1, "#gradient1",        Some("gradient1"));
    test_iri!(iri_2, "url(#gradient1)",   Some("gradient1"));
    test_iri!(iri_3, "url('#gradient1')", Some("gradient1"));
    test_iri!(iri_4, "url(\"#g\")",       Some("g"));
    test_iri!(iri_5, " url( #g ) ",       Some("g"));
    test_iri!(iri_6, "red",               None);
    test_iri!(iri_7, "url(#)",            None);
    test_iri!(iri_8, "#",                 None);
    test_iri!(iri_9, "url(gradient1)",    None);
    // Ids that merely contain "url" are still plain fragments.
    test_iri!(iri_10, "#hourly",          Some("hourly"));
    test_iri!(iri_11, "#burlap",          Some("burlap"));
    test_iri!(iri_12, "url(#curl)",       Some("curl"));
}

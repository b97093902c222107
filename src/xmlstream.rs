// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A thin adapter that folds the raw `xmlparser` token stream into the
//! element-level events the builder consumes.

use crate::error::Error;

/// A single XML attribute.
///
/// The name is split into a namespace prefix and a local name;
/// the prefix is empty for plain attributes.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Attribute<'a> {
    pub prefix: &'a str,
    pub local: &'a str,
    pub value: &'a str,
}

/// An element-level XML event.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Event<'a> {
    /// An opening tag with all of its attributes.
    ElementStart {
        /// The local tag name.
        name: &'a str,
        /// The tag attributes, in document order.
        attributes: Vec<Attribute<'a>>,
        /// Whether the element is written as `<name/>`.
        self_closing: bool,
    },
    /// Character data between tags.
    Text(&'a str),
    /// A closing tag.
    ElementEnd(&'a str),
}

/// Pulls element-level events out of an XML string.
pub struct EventStream<'a> {
    tokenizer: xmlparser::Tokenizer<'a>,
}

impl<'a> From<&'a str> for EventStream<'a> {
    fn from(text: &'a str) -> Self {
        EventStream {
            tokenizer: xmlparser::Tokenizer::from(text),
        }
    }
}

impl<'a> EventStream<'a> {
    /// Returns the next event, or `None` at the end of the document.
    pub fn next_event(&mut self) -> Result<Option<Event<'a>>, Error> {
        while let Some(token) = self.tokenizer.next() {
            match token? {
                xmlparser::Token::ElementStart { local, .. } => {
                    return self.collect_element(local.as_str());
                }
                xmlparser::Token::Text { text } => {
                    return Ok(Some(Event::Text(text.as_str())));
                }
                xmlparser::Token::Cdata { text, .. } => {
                    return Ok(Some(Event::Text(text.as_str())));
                }
                xmlparser::Token::ElementEnd {
                    end: xmlparser::ElementEnd::Close(_, local),
                    ..
                } => {
                    return Ok(Some(Event::ElementEnd(local.as_str())));
                }
                // Declarations, comments, PIs and DTDs are not part of
                // the scene.
                _ => {}
            }
        }

        Ok(None)
    }

    /// Gathers the attributes of a just-opened element.
    fn collect_element(&mut self, name: &'a str) -> Result<Option<Event<'a>>, Error> {
        let mut attributes = Vec::new();

        for token in &mut self.tokenizer {
            match token? {
                xmlparser::Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    attributes.push(Attribute {
                        prefix: prefix.as_str(),
                        local: local.as_str(),
                        value: value.as_str(),
                    });
                }
                xmlparser::Token::ElementEnd { end, .. } => {
                    let self_closing = match end {
                        xmlparser::ElementEnd::Open => false,
                        xmlparser::ElementEnd::Empty => true,
                        // `xmlparser` never emits a Close here; the tag
                        // is still open.
                        xmlparser::ElementEnd::Close(..) => false,
                    };

                    return Ok(Some(Event::ElementStart {
                        name,
                        attributes,
                        self_closing,
                    }));
                }
                _ => break,
            }
        }

        Err(Error::UnclosedDocument)
    }
}

/// Returns the value of a plain (un-prefixed) attribute.
pub(crate) fn attr<'a>(attributes: &[Attribute<'a>], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.prefix.is_empty() && a.local == name)
        .map(|a| a.value)
}

/// Returns the value of `href`, also accepting `xlink:href`.
pub(crate) fn href_attr<'a>(attributes: &[Attribute<'a>]) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.local == "href" && (a.prefix.is_empty() || a.prefix == "xlink"))
        .map(|a| a.value)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all fatal parsing errors.
///
/// Everything recoverable (a bad attribute value, a missing reference,
/// a backend refusal) is handled by skipping the offending element,
/// not by failing the whole document.
#[derive(Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    Io(std::io::Error),

    /// Only UTF-8 content are supported.
    NotAnUtf8Str,

    /// The tokenizer reported a non-recoverable XML error.
    Xml(xmlparser::Error),

    /// Character data appeared outside of any element.
    TextOutsideElement,

    /// The document ended while elements were still open.
    UnclosedDocument,
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<xmlparser::Error> for Error {
    fn from(e: xmlparser::Error) -> Self {
        Error::Xml(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::Io(ref e) => {
                write!(f, "failed to read the input cause {}", e)
            }
            Error::NotAnUtf8Str => {
                write!(f, "provided data has not an UTF-8 encoding")
            }
            Error::Xml(ref e) => {
                write!(f, "XML data parsing failed cause {}", e)
            }
            Error::TextOutsideElement => {
                write!(f, "character data outside of an element")
            }
            Error::UnclosedDocument => {
                write!(f, "the document ended before all elements were closed")
            }
        }
    }
}

impl std::error::Error for Error {}

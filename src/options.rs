// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Processing options.
#[derive(Clone, Debug)]
pub struct Options {
    /// The fallback font family list used when a `<text>` element
    /// resolves no `font-family`.
    ///
    /// Default: `Arial, sans-serif, Verdana`.
    pub font_family: String,

    /// The font size used when a `<text>` element resolves no `font-size`.
    ///
    /// Default: 12.
    pub font_size: f64,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            font_family: "Arial, sans-serif, Verdana".to_string(),
            font_size: 12.0,
        }
    }
}

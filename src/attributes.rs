//! Reads the `#[facet(...)]` field attributes this crate understands.
//!
//! ```text
//! #[facet(default_value = "30")]
//! #[facet(layout = "dateonly")]
//! #[facet(flatten)]
//! ```
//!
//! The derive hands unknown keys through as `FieldAttribute::Arbitrary`
//! with their tokens stringified, so literals arrive still quoted.

use facet_core::{Field, FieldAttribute, FieldFlags};

/// Key of the default descriptor attribute.
pub const DEFAULT_VALUE: &str = "default_value";

/// Key of the timestamp layout attribute.
pub const LAYOUT: &str = "layout";

/// The field's default descriptor. Empty descriptors count as absent.
pub fn default_descriptor(field: &Field) -> Option<String> {
    attribute(field, DEFAULT_VALUE).filter(|descriptor| !descriptor.is_empty())
}

/// The field's timestamp layout.
pub fn layout(field: &Field) -> Option<String> {
    attribute(field, LAYOUT)
}

/// Whether the field's own fields are addressable from its parent.
pub fn is_flattened(field: &Field) -> bool {
    field.flags.contains(FieldFlags::FLATTEN)
}

/// Value of the first `key = value` attribute on `field`.
pub fn attribute(field: &Field, key: &str) -> Option<String> {
    field.attributes.iter().find_map(|attr| {
        let FieldAttribute::Arbitrary(content) = *attr;
        let (name, value) = content.split_once('=')?;
        (name.trim() == key).then(|| unquote(value.trim()))
    })
}

/// Undoes the derive's stringification of a literal. Tokens that are not
/// string literals are taken verbatim.
fn unquote(token: &str) -> String {
    if let Some(raw) = token.strip_prefix('r') {
        let hashes = raw.len() - raw.trim_start_matches('#').len();
        let fence = "#".repeat(hashes);
        if let Some(body) = raw[hashes..]
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix(&format!("\"{fence}")))
        {
            return body.to_owned();
        }
        return token.to_owned();
    }

    let Some(body) = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return token.to_owned();
    };

    let mut unescaped = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('r') => unescaped.push('\r'),
            Some('0') => unescaped.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(c) = u8::from_str_radix(&hex, 16).ok().map(char::from) {
                    unescaped.push(c);
                }
            }
            Some('u') => {
                let code: String = chars
                    .by_ref()
                    .skip_while(|c| *c == '{')
                    .take_while(|c| *c != '}')
                    .collect();
                if let Some(c) = u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    unescaped.push(c);
                }
            }
            Some('\n') => {
                // line continuation
                let rest = chars.as_str().trim_start();
                chars = rest.chars();
            }
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

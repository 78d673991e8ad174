//! # Attribute Expressions
//!
//! Property values may reference record attributes with `${name}` placeholders,
//! e.g. `http://${host}:9999/${model}/predict` or `${filename}`. Placeholders are
//! replaced with the attribute's value, or with an empty string when the record
//! does not carry that attribute.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*(?P<attr>[^{}\s]+)\s*\}").expect("placeholder pattern is valid")
});

/// Substitutes every `${attr}` placeholder in `template` from `attributes`.
pub fn evaluate(template: &str, attributes: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            attributes.get(&caps["attr"]).cloned().unwrap_or_default()
        })
        .into_owned()
}

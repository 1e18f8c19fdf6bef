//! Final request URL composition.

use crate::query;
use std::collections::BTreeMap;

/// Merge `base` with the encoded query parameters.
///
/// `base` comes back unchanged when `params` is empty. If `base` already
/// carries a query string the new pairs are joined onto it with `&` rather
/// than opening a second `?`, and a `#fragment` stays last.
pub fn compose_url(base: &str, params: &BTreeMap<String, String>) -> String {
    let encoded = query::encode(params);
    if encoded.is_empty() {
        return base.to_string();
    }

    let (head, fragment) = match base.find('#') {
        Some(idx) => base.split_at(idx),
        None => (base, ""),
    };

    let separator = if !head.contains('?') {
        "?"
    } else if head.ends_with('?') || head.ends_with('&') {
        ""
    } else {
        "&"
    };

    format!("{head}{separator}{encoded}{fragment}")
}

//! Key/value attribute sets attached to edges and turn-cost tables.

/// One `(key, value)` tag, e.g. `("highway", "residential")`.
pub type Attribute = (String, String);

/// Canonical form of an attribute set: sorted by key then value, exact
/// duplicates removed.  Two sets that differ only in order canonicalize to
/// the same vector.
pub fn canonicalize<I>(attributes: I) -> Vec<Attribute>
where
    I: IntoIterator<Item = Attribute>,
{
    let mut out: Vec<Attribute> = attributes.into_iter().collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Convenience for tests and fixtures: build owned attributes from `&str` pairs.
pub fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Value of the first attribute with `key`, if any.
pub fn find<'a>(attributes: &'a [Attribute], key: &str) -> Option<&'a str> {
    attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

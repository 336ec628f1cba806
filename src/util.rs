use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic pseudo-random pair in [-1, 1] derived from an id, so a
/// node always enters the layout the same way across rebuilds and runs.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Turns a camelCase or snake_case detail key into spaced words for the
/// details panel: "criminalRecord" -> "criminal record".
pub fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch == '_' {
            out.push(' ');
        } else if ch.is_ascii_uppercase() {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x1, y1) = stable_pair("S001");
        let (x2, y2) = stable_pair("S001");
        assert_eq!((x1, y1), (x2, y2));
        assert!((-1.0..=1.0).contains(&x1));
        assert!((-1.0..=1.0).contains(&y1));
        assert_ne!(stable_pair("S001"), stable_pair("S002"));
    }

    #[test]
    fn humanize_key_splits_camel_and_snake() {
        assert_eq!(humanize_key("criminalRecord"), "criminal record");
        assert_eq!(humanize_key("registered_to"), "registered to");
        assert_eq!(humanize_key("imei"), "imei");
    }
}

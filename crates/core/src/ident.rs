use once_cell::sync::Lazy;
use regex::Regex;

static UUID_V4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("UUID pattern is valid")
});

/// Whether `candidate` is already a canonical (UUID v4) identifier rather
/// than a human-readable title.
pub fn is_canonical_id(candidate: &str) -> bool {
    UUID_V4.is_match(candidate)
}

//! Name normalization shared by cache keys and request keys.

const COUNTY_SUFFIX: &str = " county";

/// Trim and lowercase a state name.
pub fn normalize_state_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim and lowercase a county name, appending `" county"` unless the name
/// already ends with it.
///
/// `"Kings"`, `" kings county "` and `"KINGS COUNTY"` all map to
/// `"kings county"`. A bare `"County"` is left as `"county"`.
pub fn normalize_county_name(name: &str) -> String {
    let mut normalized = name.trim().to_lowercase();
    if normalized != COUNTY_SUFFIX.trim_start() && !normalized.ends_with(COUNTY_SUFFIX) {
        normalized.push_str(COUNTY_SUFFIX);
    }
    normalized
}

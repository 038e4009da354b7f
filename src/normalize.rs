/// Canonical matching key for an agency or department name: lower-cased,
/// punctuation removed, whitespace collapsed to single spaces and trimmed.
///
/// Only superficial differences are folded. "NYPD" and "Police Department"
/// stay distinct keys.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! Collision-free naming for boundary ports and promotions.

/// Increments the trailing number of `input`, or appends `2` when there is none.
///
/// `"a"` becomes `"a2"`, `"a2"` becomes `"a3"`. An empty input, or a trailing
/// number too large to increment, falls back to appending `" 2"`.
pub fn increment_string_number(input: &str) -> String {
    if input.is_empty() {
        return format!("{} 2", input);
    }
    let base = input.trim_end_matches(|c: char| c.is_ascii_digit());
    let number_part = &input[base.len()..];
    if number_part.is_empty() {
        return format!("{}2", base);
    }
    match number_part.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(incremented) => format!("{}{}", base, incremented),
        None => format!("{} 2", input),
    }
}

/// Derives a free identifier from `base`, incrementing its trailing number
/// while `is_taken` reports a collision.
pub fn unique_identifier(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut identifier = base.to_string();
    while is_taken(&identifier) {
        identifier = increment_string_number(&identifier);
    }
    identifier
}

//! Name coercion shared by parameter dispatch and range synthesis.

/// Suffix appended to a camel-cased column to name its range handler.
pub const BETWEEN_SUFFIX: &str = "Between";

/// Convert a parameter name to lowerCamelCase (`created_at` -> `createdAt`).
///
/// Underscores, dashes and spaces are the only word boundaries. Each word gets
/// an upper-case first letter and keeps the rest as written, then the first
/// letter of the result is lowered. Names that are already camel-cased come
/// back unchanged, and other punctuation (`filter[status]`, `order.id`) is
/// left alone.
#[must_use]
pub fn camel_case(name: &str) -> String {
    let mut camel = String::with_capacity(name.len());
    for word in name.split(['-', '_', ' ']) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if camel.is_empty() {
                camel.extend(first.to_lowercase());
            } else {
                camel.extend(first.to_uppercase());
            }
            camel.push_str(chars.as_str());
        }
    }
    camel
}

/// Name of the range handler for a column (`created_at` -> `createdAtBetween`).
#[must_use]
pub fn between_method(column: &str) -> String {
    let mut method = camel_case(column);
    method.push_str(BETWEEN_SUFFIX);
    method
}

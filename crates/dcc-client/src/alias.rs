//! Alias helpers
//!
//! Aliases are lab-scoped identifiers of the form `<lab>:<name>`.

use serde_json::Value;

/// Prepend `prefix` (e.g. `my-lab:`) to every alias that has no prefix yet
pub fn add_alias_prefix(aliases: &[String], prefix: &str) -> Vec<String> {
    aliases
        .iter()
        .map(|alias| {
            if alias.contains(':') {
                alias.clone()
            } else {
                format!("{prefix}{alias}")
            }
        })
        .collect()
}

/// Drop the lab prefix: `michael-snyder:B-167` becomes `B-167`
pub fn strip_alias_prefix(alias: &str) -> &str {
    alias.split_once(':').map_or(alias, |(_, name)| name)
}

/// Replace the characters the Portal rejects in aliases (`/` and `\`) with `_`
pub fn clean_alias_name(alias: &str) -> String {
    alias.replace(['/', '\\'], "_")
}

/// Append `value` unless an equal value is already present
pub fn add_to_set(values: &mut Vec<Value>, value: Value) {
    if !values.contains(&value) {
        values.push(value);
    }
}

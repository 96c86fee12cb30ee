//! Input sanitization and record validation.
//!
//! Runs before records reach the codec: strips disallowed characters and
//! enforces per-field maximum lengths. The codec trusts its input has been
//! through here. Validation reports problems as messages and never panics.

use log::{debug, warn};
use serde_json::Value;

use crate::models::Component;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_CHOICE_LEN: usize = 80;
pub const MAX_INFO_LEN: usize = 2000;
pub const MAX_DATASHEETS_LEN: usize = 2000;
pub const MAX_IMAGE_LEN: usize = 500;
pub const MAX_LOCATION_LEN: usize = 120;
pub const MAX_EXTRA_KEY_LEN: usize = 80;
pub const MAX_EXTRA_VALUE_LEN: usize = 500;

/// Cleans a single-line text field: control characters and angle brackets
/// are dropped, then the result is truncated at a character boundary.
pub fn clean_line(input: &str, max_len: usize) -> String {
    clean(input, max_len, false)
}

/// Cleans a multi-line text field (info, datasheets): newlines survive,
/// all other control characters and angle brackets are dropped.
pub fn clean_block(input: &str, max_len: usize) -> String {
    clean(input, max_len, true)
}

fn clean(input: &str, max_len: usize, keep_newlines: bool) -> String {
    let cleaned: String = input
        .chars()
        .filter(|ch| {
            if *ch == '\n' {
                keep_newlines
            } else {
                !ch.is_control() && *ch != '<' && *ch != '>'
            }
        })
        .collect();

    if cleaned.chars().count() > max_len {
        debug!("Truncating field from {} chars to {}", cleaned.chars().count(), max_len);
        cleaned.chars().take(max_len).collect()
    } else {
        cleaned
    }
}

/// Sanitizes every text field of a component, returning the cleaned copy.
///
/// Extra-parameter keys and string values are cleaned too; non-string extra
/// values pass through untouched.
pub fn sanitize_component(component: &Component) -> Component {
    let mut cleaned = component.clone();
    cleaned.name = clean_line(&component.name, MAX_NAME_LEN);
    cleaned.category = clean_line(&component.category, MAX_CHOICE_LEN);
    cleaned.kind = clean_line(&component.kind, MAX_CHOICE_LEN);
    cleaned.footprint = clean_line(&component.footprint, MAX_CHOICE_LEN);
    cleaned.info = clean_block(&component.info, MAX_INFO_LEN);
    cleaned.datasheets = clean_block(&component.datasheets, MAX_DATASHEETS_LEN);
    cleaned.image = clean_line(&component.image, MAX_IMAGE_LEN);

    cleaned.location_info.location_id =
        clean_line(&component.location_info.location_id, MAX_LOCATION_LEN);
    cleaned.location_info.details = clean_line(&component.location_info.details, MAX_LOCATION_LEN);
    cleaned.storage_info.location_id =
        clean_line(&component.storage_info.location_id, MAX_LOCATION_LEN);
    cleaned.storage_info.drawer_id =
        clean_line(&component.storage_info.drawer_id, MAX_LOCATION_LEN);
    cleaned.storage_info.cells = component
        .storage_info
        .cells
        .iter()
        .map(|cell| clean_line(cell, MAX_LOCATION_LEN))
        .collect();

    cleaned.extra = component
        .extra
        .iter()
        .map(|(key, value)| {
            let clean_key = clean_line(key, MAX_EXTRA_KEY_LEN);
            let clean_value = match value {
                Value::String(s) => Value::String(clean_line(s, MAX_EXTRA_VALUE_LEN)),
                other => other.clone(),
            };
            (clean_key, clean_value)
        })
        .collect();

    cleaned
}

/// Validates a component before it is persisted.
///
/// Returns a list of error messages; empty means the record is good to
/// save. The codec itself never checks these.
pub fn validate_component(component: &Component) -> Vec<String> {
    let mut errors = Vec::new();

    if component.id.trim().is_empty() {
        let msg = "Component id is empty".to_string();
        warn!("{msg}");
        errors.push(msg);
    }

    if component.name.trim().is_empty() {
        let msg = format!("Component '{}' has an empty name", component.id);
        warn!("{msg}");
        errors.push(msg);
    }

    if component.category.trim().is_empty() {
        let msg = format!("Component '{}' has an empty category", component.id);
        warn!("{msg}");
        errors.push(msg);
    }

    errors
}

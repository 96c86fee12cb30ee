//! Legacy snapshot normalization.
//!
//! Older snapshots differ from the current layout in two ways: drawer
//! placements carried a single cell id instead of a cell list, and some
//! records were stored in the verbose named-field form instead of the
//! compact single-letter form. Normalization runs once on load and always
//! yields the canonical expanded shape, so business logic never branches on
//! legacy shapes.

use serde_json::Value;

use crate::codec::expand;
use crate::models::Component;

/// Normalizes one loaded record value into the canonical expanded form.
pub fn normalize_loaded(mut value: Value) -> Component {
    upgrade_scalar_cells(&mut value);
    expand(value)
}

/// Rewrites legacy single-cell drawer placements to one-element cell lists.
///
/// Covers both layouts: the compact form's `l.e` as a scalar string, and
/// the verbose form's `storageInfo.cellId` field.
fn upgrade_scalar_cells(value: &mut Value) {
    let object = match value.as_object_mut() {
        Some(object) => object,
        None => return,
    };

    if let Some(placement) = object.get_mut("l").and_then(Value::as_object_mut) {
        if let Some(cell) = placement.get("e").and_then(Value::as_str) {
            let cell = cell.to_string();
            log::debug!("Upgrading legacy scalar cell id '{}' to cell list", cell);
            placement.insert("e".to_string(), Value::Array(vec![Value::String(cell)]));
        }
    }

    if let Some(storage) = object.get_mut("storageInfo").and_then(Value::as_object_mut) {
        let legacy_cell = storage
            .remove("cellId")
            .and_then(|v| v.as_str().map(str::to_string));
        if let Some(cell) = legacy_cell {
            let cells_empty = storage
                .get("cells")
                .and_then(Value::as_array)
                .map(|cells| cells.is_empty())
                .unwrap_or(true);
            if !cell.is_empty() && cells_empty {
                log::debug!("Migrating legacy cellId '{}' into cells list", cell);
                storage.insert("cells".to_string(), Value::Array(vec![Value::String(cell)]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_record_expands_normally() {
        let component = normalize_loaded(json!({
            "i": "1", "n": "R1", "c": "Resistor", "q": 3, "p": 0.1
        }));
        assert_eq!(component.id, "1");
        assert_eq!(component.quantity, 3);
    }

    #[test]
    fn verbose_record_passes_through() {
        let component = normalize_loaded(json!({
            "id": "1",
            "name": "R1",
            "category": "Resistor",
            "locationInfo": {"locationId": "shelf", "details": ""},
            "storageInfo": {"locationId": "", "drawerId": "", "cells": []}
        }));
        assert_eq!(component.location_info.location_id, "shelf");
    }

    #[test]
    fn legacy_scalar_cell_in_compact_form_becomes_list() {
        let component = normalize_loaded(json!({
            "i": "1", "n": "R1", "c": "Resistor",
            "l": {"i": "locA", "w": "drw1", "e": "A1"}
        }));
        assert_eq!(component.storage_info.cells, vec!["A1".to_string()]);
        assert_eq!(component.storage_info.drawer_id, "drw1");
    }

    #[test]
    fn legacy_cell_id_in_verbose_form_becomes_list() {
        let component = normalize_loaded(json!({
            "id": "1",
            "name": "R1",
            "category": "Resistor",
            "storageInfo": {"locationId": "locA", "drawerId": "drw1", "cellId": "B2"}
        }));
        assert_eq!(component.storage_info.cells, vec!["B2".to_string()]);
    }

    #[test]
    fn cell_id_does_not_override_existing_cells() {
        let component = normalize_loaded(json!({
            "id": "1",
            "name": "R1",
            "category": "Resistor",
            "storageInfo": {
                "locationId": "locA",
                "drawerId": "drw1",
                "cellId": "old",
                "cells": ["A1", "A2"]
            }
        }));
        assert_eq!(
            component.storage_info.cells,
            vec!["A1".to_string(), "A2".to_string()]
        );
    }

    #[test]
    fn modern_records_are_untouched() {
        let value = json!({
            "i": "1", "n": "R1", "c": "Resistor",
            "l": {"i": "locA", "w": "drw1", "e": ["A1", "A2"]}
        });
        let component = normalize_loaded(value);
        assert_eq!(
            component.storage_info.cells,
            vec!["A1".to_string(), "A2".to_string()]
        );
    }
}

//! Bulk-edit merge engine.
//!
//! A bulk edit applies one sparse instruction set across every selected
//! component. The instruction is typed: one enum per field group with
//! exhaustive matching. The raw string-keyed form the UI submits is decoded
//! once at the boundary by `decode_form`; the custom-choice sentinel never
//! reaches the merge itself.
//!
//! Failures are per field group: a malformed group (an action missing the
//! value it needs) is skipped and the component's existing value kept.
//! The merge never aborts a whole record.

use serde::Deserialize;

use crate::models::{Component, LocationInfo, StorageInfo, CUSTOM_CHOICE};

/// Edit for a dropdown-backed text field (category, footprint).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChoiceEdit {
    #[default]
    Keep,
    Set(String),
    /// The user picked the custom option; carries the already-resolved text.
    SetCustom(String),
}

/// Edit for a plain text field (type).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextEdit {
    #[default]
    Keep,
    Set(String),
}

/// Edit for the stock count. Results are floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityEdit {
    #[default]
    Keep,
    Set(u32),
    Increment(u32),
    Decrement(u32),
}

/// Edit for the unit price. Results are floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PriceEdit {
    #[default]
    Keep,
    Set(f64),
    Increase(f64),
    Decrease(f64),
}

/// Tri-state edit for an independent boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagEdit {
    #[default]
    Keep,
    Set(bool),
}

/// Edit for the coarse location placement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationEdit {
    #[default]
    Keep,
    Set { location_id: String, details: String },
    Clear,
}

/// Edit for the drawer/cell placement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageEdit {
    #[default]
    Keep,
    Set {
        location_id: String,
        drawer_id: String,
        cells: Vec<String>,
    },
    Clear,
}

/// One bulk-edit instruction set. The default is all-neutral: applying it
/// leaves a component untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkEdit {
    pub category: ChoiceEdit,
    pub kind: TextEdit,
    pub quantity: QuantityEdit,
    pub price: PriceEdit,
    pub footprint: ChoiceEdit,
    pub favorite: FlagEdit,
    pub bookmark: FlagEdit,
    pub star: FlagEdit,
    pub location: LocationEdit,
    pub storage: StorageEdit,
}

/// The raw bulk-edit form as the UI submits it: string-keyed actions,
/// tri-state flags as nullable booleans, and the custom-choice sentinel in
/// the dropdown fields. Decoded once by `decode_form`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkEditForm {
    pub category: String,
    pub custom_category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity_action: String,
    pub quantity: Option<u32>,
    pub price_action: String,
    pub price: Option<f64>,
    pub footprint: String,
    pub custom_footprint: String,
    pub favorite: Option<bool>,
    pub bookmark: Option<bool>,
    pub star: Option<bool>,
    pub location_action: String,
    pub location_id: String,
    pub location_details: String,
    pub storage_action: String,
    pub storage_location_id: String,
    pub drawer_id: String,
    pub cells: Vec<String>,
}

fn decode_choice(value: &str, custom: &str) -> ChoiceEdit {
    if value.is_empty() {
        ChoiceEdit::Keep
    } else if value == CUSTOM_CHOICE {
        if custom.is_empty() {
            // Custom option without custom text: malformed, keep.
            ChoiceEdit::Keep
        } else {
            ChoiceEdit::SetCustom(custom.to_string())
        }
    } else {
        ChoiceEdit::Set(value.to_string())
    }
}

fn decode_quantity(action: &str, value: Option<u32>) -> QuantityEdit {
    match (action, value) {
        ("set", Some(value)) => QuantityEdit::Set(value),
        ("increment", Some(value)) => QuantityEdit::Increment(value),
        ("decrement", Some(value)) => QuantityEdit::Decrement(value),
        (action, None) if !action.is_empty() => {
            log::debug!("Quantity action '{}' without a value, skipping", action);
            QuantityEdit::Keep
        }
        _ => QuantityEdit::Keep,
    }
}

fn decode_price(action: &str, value: Option<f64>) -> PriceEdit {
    match (action, value) {
        ("set", Some(value)) => PriceEdit::Set(value),
        ("increase", Some(value)) => PriceEdit::Increase(value),
        ("decrease", Some(value)) => PriceEdit::Decrease(value),
        (action, None) if !action.is_empty() => {
            log::debug!("Price action '{}' without a value, skipping", action);
            PriceEdit::Keep
        }
        _ => PriceEdit::Keep,
    }
}

fn decode_flag(value: Option<bool>) -> FlagEdit {
    match value {
        None => FlagEdit::Keep,
        Some(v) => FlagEdit::Set(v),
    }
}

fn decode_location(form: &BulkEditForm) -> LocationEdit {
    match form.location_action.as_str() {
        "set" => {
            if form.location_id.is_empty() {
                log::debug!("Location set without a location id, skipping");
                LocationEdit::Keep
            } else {
                LocationEdit::Set {
                    location_id: form.location_id.clone(),
                    details: form.location_details.clone(),
                }
            }
        }
        "clear" => LocationEdit::Clear,
        _ => LocationEdit::Keep,
    }
}

fn decode_storage(form: &BulkEditForm) -> StorageEdit {
    match form.storage_action.as_str() {
        "set" => {
            if form.storage_location_id.is_empty() && form.drawer_id.is_empty() {
                log::debug!("Storage set without a location or drawer, skipping");
                StorageEdit::Keep
            } else {
                StorageEdit::Set {
                    location_id: form.storage_location_id.clone(),
                    drawer_id: form.drawer_id.clone(),
                    cells: form.cells.clone(),
                }
            }
        }
        "clear" => StorageEdit::Clear,
        _ => StorageEdit::Keep,
    }
}

/// Decodes the raw form into a typed instruction set.
///
/// Malformed field groups decode to their neutral action, so applying the
/// result can never half-apply a group.
pub fn decode_form(form: &BulkEditForm) -> BulkEdit {
    BulkEdit {
        category: decode_choice(&form.category, &form.custom_category),
        kind: if form.kind.is_empty() {
            TextEdit::Keep
        } else {
            TextEdit::Set(form.kind.clone())
        },
        quantity: decode_quantity(&form.quantity_action, form.quantity),
        price: decode_price(&form.price_action, form.price),
        footprint: decode_choice(&form.footprint, &form.custom_footprint),
        favorite: decode_flag(form.favorite),
        bookmark: decode_flag(form.bookmark),
        star: decode_flag(form.star),
        location: decode_location(form),
        storage: decode_storage(form),
    }
}

/// Applies a bulk-edit instruction to one component, returning the updated
/// record. The input is never mutated; untouched field groups carry over
/// unchanged. Placement edits keep the single-active-placement invariant:
/// setting one mode clears the other, and when both modes are set in the
/// same pass the drawer assignment wins.
pub fn apply_bulk_edit(component: &Component, edit: &BulkEdit) -> Component {
    let mut updated = component.clone();

    match &edit.category {
        ChoiceEdit::Keep => {}
        ChoiceEdit::Set(value) | ChoiceEdit::SetCustom(value) => {
            if !value.is_empty() {
                updated.category = value.clone();
            }
        }
    }

    match &edit.kind {
        TextEdit::Keep => {}
        TextEdit::Set(value) => {
            if !value.is_empty() {
                updated.kind = value.clone();
            }
        }
    }

    match edit.quantity {
        QuantityEdit::Keep => {}
        QuantityEdit::Set(value) => updated.quantity = value,
        QuantityEdit::Increment(delta) => {
            updated.quantity = updated.quantity.saturating_add(delta)
        }
        QuantityEdit::Decrement(delta) => {
            updated.quantity = updated.quantity.saturating_sub(delta)
        }
    }

    match edit.price {
        PriceEdit::Keep => {}
        PriceEdit::Set(value) => updated.price = value.max(0.0),
        PriceEdit::Increase(delta) => updated.price = (updated.price + delta).max(0.0),
        PriceEdit::Decrease(delta) => updated.price = (updated.price - delta).max(0.0),
    }

    match &edit.footprint {
        ChoiceEdit::Keep => {}
        ChoiceEdit::Set(value) | ChoiceEdit::SetCustom(value) => {
            if !value.is_empty() {
                updated.footprint = value.clone();
            }
        }
    }

    if let FlagEdit::Set(value) = edit.favorite {
        updated.favorite = value;
    }
    if let FlagEdit::Set(value) = edit.bookmark {
        updated.bookmark = value;
    }
    if let FlagEdit::Set(value) = edit.star {
        updated.star = value;
    }

    // Location before storage: a storage set in the same pass overrides the
    // location set, preserving the single-active-placement invariant.
    match &edit.location {
        LocationEdit::Keep => {}
        LocationEdit::Set {
            location_id,
            details,
        } => {
            if location_id.is_empty() {
                log::debug!("Location set without a location id, component unchanged");
            } else {
                updated.location_info = LocationInfo {
                    location_id: location_id.clone(),
                    details: details.clone(),
                };
                updated.storage_info = StorageInfo::default();
            }
        }
        LocationEdit::Clear => updated.location_info = LocationInfo::default(),
    }

    match &edit.storage {
        StorageEdit::Keep => {}
        StorageEdit::Set {
            location_id,
            drawer_id,
            cells,
        } => {
            if location_id.is_empty() && drawer_id.is_empty() {
                log::debug!("Storage set without a location or drawer, component unchanged");
            } else {
                updated.storage_info = StorageInfo {
                    location_id: location_id.clone(),
                    drawer_id: drawer_id.clone(),
                    cells: cells.clone(),
                };
                updated.location_info = LocationInfo::default();
            }
        }
        StorageEdit::Clear => updated.storage_info = StorageInfo::default(),
    }

    updated
}

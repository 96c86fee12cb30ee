//! Compact storage codec for component records.
//!
//! Storage keeps components in a sparse, single-letter-key form to save
//! space; the UI works on the expanded named-field form. `compact` and
//! `expand` map between the two. The round trip is lossless for every
//! modeled field, and unrecognized extra parameters survive verbatim
//! through the `a` bucket.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{Component, LocationInfo, StorageInfo, CUSTOM_CHOICE};

/// Form-helper fields resolved (and consumed) by `compact`; never persisted.
const CUSTOM_CATEGORY_FIELD: &str = "customCategory";
const CUSTOM_FOOTPRINT_FIELD: &str = "customFootprint";

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Placement branch of a compact record. Exactly one mode is ever stored;
/// the presence of the drawer key (`w`) tells the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompactPlacement {
    /// Drawer/cell placement. The location id rides along so the full
    /// `storageInfo` survives the round trip.
    Drawer {
        #[serde(rename = "i", default, skip_serializing_if = "String::is_empty")]
        location_id: String,
        #[serde(rename = "w")]
        drawer_id: String,
        #[serde(rename = "e", default, skip_serializing_if = "Vec::is_empty")]
        cells: Vec<String>,
    },
    /// Coarse location placement.
    Location {
        #[serde(rename = "i")]
        location_id: String,
        #[serde(rename = "x", default, skip_serializing_if = "String::is_empty")]
        details: String,
    },
}

/// A component record in its compact (storage) form.
///
/// The core five keys (`i`, `n`, `c`, `q`, `p`) are always present;
/// everything else is omitted when it holds its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactComponent {
    #[serde(rename = "i")]
    pub id: String,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "c")]
    pub category: String,
    #[serde(rename = "t", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(rename = "q")]
    pub quantity: u32,
    #[serde(rename = "p")]
    pub price: f64,
    #[serde(rename = "f", skip_serializing_if = "String::is_empty")]
    pub footprint: String,
    #[serde(rename = "d", skip_serializing_if = "String::is_empty")]
    pub info: String,
    #[serde(rename = "s", skip_serializing_if = "String::is_empty")]
    pub datasheets: String,
    #[serde(rename = "m", skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(rename = "v", skip_serializing_if = "is_false")]
    pub favorite: bool,
    #[serde(rename = "b", skip_serializing_if = "is_false")]
    pub bookmark: bool,
    #[serde(rename = "r", skip_serializing_if = "is_false")]
    pub star: bool,
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub placement: Option<CompactPlacement>,
    #[serde(rename = "a", skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// True for values the extras bucket drops: null and the empty string.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Resolves a dropdown field that may hold the custom-choice sentinel.
/// The sentinel is replaced by the custom text when that text is non-empty;
/// otherwise the stored value is kept as-is.
fn resolve_choice(value: &str, custom: &str) -> String {
    if value == CUSTOM_CHOICE && !custom.is_empty() {
        custom.to_string()
    } else {
        value.to_string()
    }
}

/// Encodes an expanded component into its compact storage form.
///
/// Performs no validation or sanitization; input is trusted to have passed
/// the sanitizer already. Drawer placement wins over coarse location when
/// both happen to be populated.
pub fn compact(component: &Component) -> CompactComponent {
    let mut custom_category = String::new();
    let mut custom_footprint = String::new();
    let mut extra = Map::new();
    for (key, value) in &component.extra {
        match key.as_str() {
            CUSTOM_CATEGORY_FIELD => {
                custom_category = value.as_str().unwrap_or_default().to_string();
            }
            CUSTOM_FOOTPRINT_FIELD => {
                custom_footprint = value.as_str().unwrap_or_default().to_string();
            }
            _ => {
                if !is_blank(value) {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let placement = if !component.storage_info.drawer_id.is_empty() {
        Some(CompactPlacement::Drawer {
            location_id: component.storage_info.location_id.clone(),
            drawer_id: component.storage_info.drawer_id.clone(),
            cells: component.storage_info.cells.clone(),
        })
    } else if !component.location_info.location_id.is_empty() {
        Some(CompactPlacement::Location {
            location_id: component.location_info.location_id.clone(),
            details: component.location_info.details.clone(),
        })
    } else {
        None
    };

    CompactComponent {
        id: component.id.clone(),
        name: component.name.clone(),
        category: resolve_choice(&component.category, &custom_category),
        kind: component.kind.clone(),
        quantity: component.quantity,
        price: component.price,
        footprint: resolve_choice(&component.footprint, &custom_footprint),
        info: component.info.clone(),
        datasheets: component.datasheets.clone(),
        image: component.image.clone(),
        favorite: component.favorite,
        bookmark: component.bookmark,
        star: component.star,
        placement,
        extra,
    }
}

/// Rebuilds the expanded form from a decoded compact record.
///
/// Exactly one placement object ends up populated, matching the
/// single-active-placement invariant; the extras bucket reappears as
/// top-level fields.
pub fn expand_compact(compact: CompactComponent) -> Component {
    let mut component = Component {
        id: compact.id,
        name: compact.name,
        category: compact.category,
        kind: compact.kind,
        quantity: compact.quantity,
        price: compact.price,
        footprint: compact.footprint,
        info: compact.info,
        datasheets: compact.datasheets,
        image: compact.image,
        favorite: compact.favorite,
        bookmark: compact.bookmark,
        star: compact.star,
        extra: compact.extra,
        ..Default::default()
    };
    match compact.placement {
        Some(CompactPlacement::Drawer {
            location_id,
            drawer_id,
            cells,
        }) => {
            component.storage_info = StorageInfo {
                location_id,
                drawer_id,
                cells,
            };
        }
        Some(CompactPlacement::Location {
            location_id,
            details,
        }) => {
            component.location_info = LocationInfo {
                location_id,
                details,
            };
        }
        None => {}
    }
    component
}

/// Decodes a stored record value into the expanded form.
///
/// Idempotent: a value that already exposes `locationInfo` or `storageInfo`
/// is taken as expanded and returned as-is. Absent optional keys fall back
/// to their defaults; this never fails: an unreadable value decodes to a
/// defaulted (empty-id) record, which load paths drop.
pub fn expand(value: Value) -> Component {
    let already_expanded = value
        .as_object()
        .map(|object| object.contains_key("locationInfo") || object.contains_key("storageInfo"))
        .unwrap_or(false);

    if already_expanded {
        return serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Unreadable expanded record: {}", e);
            Component::default()
        });
    }

    match serde_json::from_value::<CompactComponent>(value) {
        Ok(compact) => expand_compact(compact),
        Err(e) => {
            log::warn!("Unreadable compact record: {}", e);
            Component::default()
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Reserved dropdown value signalling "use the accompanying free-text field".
///
/// Never persisted: `codec::compact` and `bulk_edit::decode_form` resolve it
/// to the custom text at their boundaries.
pub const CUSTOM_CHOICE: &str = "__custom__";

/// Coarse placement: the component sits at a location without a drawer
/// assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationInfo {
    pub location_id: String,
    pub details: String,
}

/// Fine-grained placement: the component sits in specific cells of a
/// drawer's grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageInfo {
    pub location_id: String,
    pub drawer_id: String,
    pub cells: Vec<String>,
}

/// A component record in its expanded (UI-facing) form.
///
/// At most one placement mode is active at a time: either `storage_info`
/// carries a drawer assignment or `location_info` carries a location id.
/// Fields not modeled here (e.g. "Voltage: 5V") live in `extra` and are
/// preserved verbatim through the codec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: u32,
    pub price: f64,
    pub footprint: String,
    pub info: String,
    /// Newline/comma separated URL list, stored as raw text.
    pub datasheets: String,
    pub image: String,
    pub favorite: bool,
    pub bookmark: bool,
    pub star: bool,
    pub location_info: LocationInfo,
    pub storage_info: StorageInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// Creates a new component with a freshly generated id.
    ///
    /// The id is immutable from here on; everything not passed in starts at
    /// its default.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Component {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Returns true if this component has a drawer assignment.
    pub fn has_drawer(&self) -> bool {
        !self.storage_info.drawer_id.is_empty()
    }

    /// Returns true if this component has any placement at all.
    pub fn is_placed(&self) -> bool {
        self.has_drawer()
            || !self.storage_info.location_id.is_empty()
            || !self.location_info.location_id.is_empty()
    }

    /// The location id this component is placed at, if any. A drawer
    /// assignment counts as placed at the drawer's location.
    pub fn placed_at(&self) -> Option<&str> {
        if !self.storage_info.location_id.is_empty() {
            Some(&self.storage_info.location_id)
        } else if !self.location_info.location_id.is_empty() {
            Some(&self.location_info.location_id)
        } else {
            None
        }
    }

    /// Returns true if this component is out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = Component::new("R1", "Resistor");
        let b = Component::new("R2", "Resistor");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_defaults_everything_else() {
        let c = Component::new("C1", "Capacitor");
        assert_eq!(c.name, "C1");
        assert_eq!(c.category, "Capacitor");
        assert_eq!(c.quantity, 0);
        assert_eq!(c.price, 0.0);
        assert!(!c.favorite && !c.bookmark && !c.star);
        assert!(c.extra.is_empty());
        assert!(!c.is_placed());
    }

    #[test]
    fn placed_at_prefers_drawer_location() {
        let mut c = Component::new("R1", "Resistor");
        c.storage_info.location_id = "locA".to_string();
        c.storage_info.drawer_id = "drw1".to_string();
        assert_eq!(c.placed_at(), Some("locA"));
        assert!(c.has_drawer());
    }

    #[test]
    fn placed_at_falls_back_to_coarse_location() {
        let mut c = Component::new("R1", "Resistor");
        c.location_info.location_id = "shelf".to_string();
        assert_eq!(c.placed_at(), Some("shelf"));
        assert!(!c.has_drawer());
    }

    #[test]
    fn serde_uses_camel_case_and_flattens_extras() {
        let mut c = Component::new("R1", "Resistor");
        c.location_info.location_id = "locA".to_string();
        c.extra
            .insert("Voltage".to_string(), Value::String("5V".to_string()));

        let value = serde_json::to_value(&c).unwrap();
        assert!(value.get("locationInfo").is_some());
        assert!(value.get("storageInfo").is_some());
        assert_eq!(value["Voltage"], "5V");

        let back: Component = serde_json::from_value(value).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn serde_type_field_round_trips() {
        let mut c = Component::new("U1", "IC");
        c.kind = "Microcontroller".to_string();
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["type"], "Microcontroller");
        let back: Component = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind, "Microcontroller");
    }
}

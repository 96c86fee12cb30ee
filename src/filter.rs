use serde_json::Value;

use crate::models::Component;

/// Tri-state filter for an independent boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagFilter {
    #[default]
    Any,
    Set,
    Unset,
}

impl FlagFilter {
    fn matches(&self, flag: bool) -> bool {
        match self {
            FlagFilter::Any => true,
            FlagFilter::Set => flag,
            FlagFilter::Unset => !flag,
        }
    }
}

/// Stock-level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockFilter {
    #[default]
    Any,
    InStock,
    OutOfStock,
}

/// Placement filter. A drawer assignment counts as placed at the drawer's
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlacementFilter {
    #[default]
    Any,
    Unplaced,
    At(String),
}

/// Conjunctive filter over a component list: a record passes when it passes
/// every active criterion. The default filter passes everything.
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    /// Free-text query, matched case-insensitively against name, info,
    /// type and extra-parameter values.
    pub query: String,
    /// Exact category match; empty means any.
    pub category: String,
    /// Exact footprint match; empty means any.
    pub footprint: String,
    pub favorite: FlagFilter,
    pub bookmark: FlagFilter,
    pub star: FlagFilter,
    pub stock: StockFilter,
    pub placement: PlacementFilter,
}

impl ComponentFilter {
    /// Returns true if the component passes every active criterion.
    pub fn matches(&self, component: &Component) -> bool {
        if !self.query.is_empty() && !matches_query(component, &self.query) {
            return false;
        }
        if !self.category.is_empty() && component.category != self.category {
            return false;
        }
        if !self.footprint.is_empty() && component.footprint != self.footprint {
            return false;
        }
        if !self.favorite.matches(component.favorite)
            || !self.bookmark.matches(component.bookmark)
            || !self.star.matches(component.star)
        {
            return false;
        }
        match self.stock {
            StockFilter::Any => {}
            StockFilter::InStock => {
                if component.is_out_of_stock() {
                    return false;
                }
            }
            StockFilter::OutOfStock => {
                if !component.is_out_of_stock() {
                    return false;
                }
            }
        }
        match &self.placement {
            PlacementFilter::Any => true,
            PlacementFilter::Unplaced => !component.is_placed(),
            PlacementFilter::At(location_id) => {
                component.placed_at() == Some(location_id.as_str())
            }
        }
    }
}

fn matches_query(component: &Component, query: &str) -> bool {
    let needle = query.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);

    hit(&component.name)
        || hit(&component.info)
        || hit(&component.kind)
        || component.extra.values().any(|value| match value {
            Value::String(s) => hit(s),
            other => hit(&other.to_string()),
        })
}

/// Filters a component list, returning references to the matching records
/// in their original order.
pub fn filter_components<'a>(
    components: &'a [Component],
    filter: &ComponentFilter,
) -> Vec<&'a Component> {
    components.iter().filter(|c| filter.matches(c)).collect()
}

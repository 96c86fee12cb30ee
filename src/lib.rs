//! Parts Inventory - Electronics Component Stock Core
//!
//! Pure-data transforms for electronics component records (the compact
//! storage codec and the bulk-edit merge engine) plus the surrounding
//! machinery: input sanitization, in-memory filtering, legacy snapshot
//! normalization and a local SQLite component store.

pub mod bulk_edit;
pub mod codec;
pub mod error;
pub mod filter;
pub mod migrate;
pub mod models;
pub mod sanitize;
pub mod store;

pub use bulk_edit::{apply_bulk_edit, decode_form, BulkEdit, BulkEditForm};
pub use codec::{compact, expand, CompactComponent};
pub use error::{InventoryError, Result};
pub use filter::ComponentFilter;
pub use models::{Component, LocationInfo, StorageInfo};
pub use store::ComponentStore;

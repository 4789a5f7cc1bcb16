//! DriveDeck Core - Record types and inventory/health reconciliation
//!
//! This crate provides the pure data layer for the DriveDeck dashboard:
//! - Device identifier normalization for cross-source joins
//! - Inventory and health record types matching the source wire shapes
//! - The reconciler that merges both sources into per-drive views
//! - Vendor classification and capacity formatting helpers
//!
//! Everything here is synchronous and side-effect free; fetching and
//! distribution live in `drivedeck-client`.

pub mod capacity;
pub mod drive;
pub mod normalize;
pub mod reconcile;
pub mod vendor;

pub use capacity::format_capacity;
pub use drive::{DriveView, HealthRecord, InventoryRecord};
pub use normalize::normalize_device_id;
pub use reconcile::reconcile;
pub use vendor::{VendorRule, VendorRules, VendorRulesError};

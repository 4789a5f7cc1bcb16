//! Inventory/health reconciliation
//!
//! The two sources are fetched independently and use different identifier
//! forms, so their records are joined on the normalized key. Inventory is
//! authoritative for the device list: every inventory record produces
//! exactly one view, and health records with no inventory counterpart are
//! dropped.

use tracing::warn;

use crate::drive::{DriveView, HealthRecord, InventoryRecord};

/// Join inventory records with health records into per-drive views.
///
/// For each inventory record, the first health record whose normalized
/// key matches wins; duplicate health entries for one key are a
/// data-quality issue upstream and are not deduplicated here. A device
/// with no matching health record gets a view with `health: None` and a
/// logged observation — never an error. Output order follows `inventory`,
/// and neither input is mutated.
pub fn reconcile(inventory: &[InventoryRecord], health: &[HealthRecord]) -> Vec<DriveView> {
    inventory
        .iter()
        .map(|record| {
            let key = record.key();
            let matched = health.iter().find(|h| h.key() == key).cloned();
            if matched.is_none() {
                warn!(device = %record.name, "No health record matched inventory device");
            }
            DriveView {
                inventory: record.clone(),
                health: matched,
            }
        })
        .collect()
}

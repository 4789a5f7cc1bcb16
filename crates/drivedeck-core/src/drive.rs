//! Drive record types for the inventory and health sources

use serde::{Deserialize, Serialize};

use crate::capacity;
use crate::normalize::normalize_device_id;

/// One device as reported by the inventory source.
///
/// Identity and static attributes only; health telemetry lives in
/// [`HealthRecord`]. Immutable once fetched within a poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Raw device identifier as the source reports it (e.g. `sda`).
    pub name: String,
    /// Human-readable capacity. Sources that report raw byte counts are
    /// formatted on deserialization.
    #[serde(
        default,
        rename = "size",
        deserialize_with = "capacity::capacity_from_wire"
    )]
    pub capacity: String,
    /// Full model string, e.g. `ST500DM002-1BD142`.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default, rename = "modelFamily")]
    pub model_family: String,
    #[serde(default)]
    pub serial: String,
}

impl InventoryRecord {
    /// Canonical join key for this record.
    pub fn key(&self) -> String {
        normalize_device_id(&self.name)
    }
}

/// SMART telemetry for one device as reported by the health source.
///
/// The health source keys devices by path (`/dev/sda`) rather than the
/// bare name the inventory source uses. Metric fields tolerate absence;
/// a partially populated record is still usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Device identifier as the source reports it (e.g. `/dev/sda`).
    pub device: String,
    /// HDD, SSD, or NVMe as detected by the source.
    #[serde(default)]
    pub drive_type: String,
    #[serde(default)]
    pub form_factor: String,
    #[serde(default)]
    pub rotation_rate: String,
    #[serde(default)]
    pub firmware_version: String,
    /// Degrees Celsius.
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub power_on_hours: Option<u64>,
    #[serde(default)]
    pub reallocated_sectors: Option<u64>,
    #[serde(default)]
    pub pending_sectors: Option<u64>,
    #[serde(default)]
    pub uncorrectable_sectors: Option<u64>,
    /// Lifetime LBA counters.
    #[serde(default)]
    pub total_lbas_read: Option<u64>,
    #[serde(default)]
    pub total_lbas_written: Option<u64>,
    /// Overall self-assessment string, e.g. `PASSED`.
    #[serde(default)]
    pub health_status: String,
    #[serde(default)]
    pub smart_passed: Option<bool>,
}

impl HealthRecord {
    /// Canonical join key for this record.
    pub fn key(&self) -> String {
        normalize_device_id(&self.device)
    }

    /// Whether the drive passes its SMART self-assessment. Falls back to
    /// the status string when the source omits the boolean.
    pub fn is_passing(&self) -> bool {
        match self.smart_passed {
            Some(passed) => passed,
            None => {
                let status = self.health_status.trim();
                status.eq_ignore_ascii_case("passed") || status.eq_ignore_ascii_case("ok")
            }
        }
    }
}

/// Joined view of one physical drive: its inventory identity plus health
/// telemetry when a matching record exists.
///
/// Owns copies of both records; the set of views produced for a poll
/// cycle is recreated wholesale, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveView {
    pub inventory: InventoryRecord,
    /// Absent when the health source had no record for this device.
    /// Modeled absence, not an error.
    pub health: Option<HealthRecord>,
}

impl DriveView {
    /// Device identifier as the inventory source reports it.
    pub fn device(&self) -> &str {
        &self.inventory.name
    }

    /// Canonical key shared by both underlying records.
    pub fn key(&self) -> String {
        self.inventory.key()
    }

    pub fn has_health(&self) -> bool {
        self.health.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_wire_shape() {
        let record: InventoryRecord = serde_json::from_str(
            r#"{
                "name": "sda",
                "size": "465.76 GB",
                "model": "ST500DM002-1BD142",
                "vendor": "Seagate",
                "modelFamily": "Barracuda 7200.12",
                "serial": "Z3T3FJSG"
            }"#,
        )
        .unwrap();
        assert_eq!(record.name, "sda");
        assert_eq!(record.capacity, "465.76 GB");
        assert_eq!(record.model_family, "Barracuda 7200.12");
        assert_eq!(record.key(), "sda");
    }

    #[test]
    fn test_inventory_numeric_capacity() {
        let record: InventoryRecord =
            serde_json::from_str(r#"{"name": "sdb", "size": 500107862016}"#).unwrap();
        assert_eq!(record.capacity, "465.76 GB");
        assert_eq!(record.vendor, "");
    }

    #[test]
    fn test_health_wire_shape() {
        let record: HealthRecord = serde_json::from_str(
            r#"{
                "device": "/dev/sda",
                "drive_type": "HDD",
                "temperature": 34.0,
                "power_on_hours": 12034,
                "reallocated_sectors": 0,
                "firmware_version": "KC45",
                "health_status": "PASSED"
            }"#,
        )
        .unwrap();
        assert_eq!(record.key(), "sda");
        assert_eq!(record.temperature, Some(34.0));
        assert!(record.is_passing());
        assert_eq!(record.pending_sectors, None);
    }

    #[test]
    fn test_health_passing_fallback() {
        let failing: HealthRecord =
            serde_json::from_str(r#"{"device": "/dev/sdb", "health_status": "FAILED"}"#).unwrap();
        assert!(!failing.is_passing());

        let explicit: HealthRecord =
            serde_json::from_str(r#"{"device": "/dev/sdb", "smart_passed": true}"#).unwrap();
        assert!(explicit.is_passing());
    }
}

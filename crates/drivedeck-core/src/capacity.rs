//! Capacity formatting
//!
//! Inventory sources disagree on how they report drive size: smartctl-style
//! sources send a pre-formatted string, block-device listings send a raw
//! byte count. Everything user-facing carries the formatted form.

use serde::{Deserialize, Deserializer};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Format a raw byte count as a human-readable size, e.g. `465.76 GB`
/// or `1.82 TB`.
pub fn format_capacity(bytes: u64) -> String {
    let gb = bytes as f64 / BYTES_PER_GB;
    if gb < 1024.0 {
        format!("{:.2} GB", gb)
    } else {
        format!("{:.2} TB", gb / 1024.0)
    }
}

/// Deserialize a capacity that may arrive as a formatted string or a raw
/// byte count. Byte counts are rendered with [`format_capacity`].
pub(crate) fn capacity_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Bytes(u64),
        Text(String),
    }

    Ok(match Wire::deserialize(deserializer)? {
        Wire::Bytes(bytes) => format_capacity(bytes),
        Wire::Text(text) => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gb() {
        assert_eq!(format_capacity(500_107_862_016), "465.76 GB");
    }

    #[test]
    fn test_format_tb() {
        assert_eq!(format_capacity(2_000_398_934_016), "1.82 TB");
    }

    #[test]
    fn test_format_small() {
        assert_eq!(format_capacity(0), "0.00 GB");
    }
}

//! Device identifier normalization
//!
//! The inventory source reports bare kernel names (`sda`) while the health
//! source reports device paths (`/dev/sda`), sometimes with stray case or
//! whitespace. Records from the two sources can only be joined on the
//! canonical form produced here.

/// Path prefix stripped from device identifiers.
const DEV_PREFIX: &str = "/dev/";

/// Canonicalize a raw device identifier for cross-source matching.
///
/// Lower-cases, strips any leading `/dev/` prefix, and trims surrounding
/// whitespace. Total over all inputs: empty or garbage strings come back
/// as a best-effort (possibly empty) key rather than an error, and the
/// function is idempotent, so a key can safely be normalized again.
pub fn normalize_device_id(raw: &str) -> String {
    let mut key = raw.trim().to_lowercase();
    while let Some(stripped) = key.strip_prefix(DEV_PREFIX) {
        key = stripped.to_string();
    }
    key.trim().to_string()
}

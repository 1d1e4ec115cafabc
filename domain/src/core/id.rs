//! Process-unique identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate an identifier of the form `<prefix>-<millis>-<seq>`.
///
/// The sequence component is process-global and strictly increasing, so two
/// identifiers generated within the same millisecond still differ.
pub fn next_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:x}-{:04x}", prefix, millis, seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = next_id("req");
        let b = next_id("req");
        assert_ne!(a, b);
        assert!(a.starts_with("req-"));
    }
}

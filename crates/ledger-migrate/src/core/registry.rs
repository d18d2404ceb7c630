//! Run-scoped mapping from source identifiers to created target identifiers.

use std::collections::HashMap;
use tracing::warn;

/// Source id → target id map, populated only by successful creates.
///
/// A mapping is write-once: the first target id recorded for a source id
/// stays for the rest of the run. Absence means the record was not
/// migrated (skipped or failed).
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    label: &'static str,
    ids: HashMap<String, String>,
}

impl IdRegistry {
    /// Create an empty registry. `label` names the mapping in log messages.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ids: HashMap::new(),
        }
    }

    /// Record a mapping. Returns `false` and keeps the existing mapping if
    /// `source_id` is already mapped.
    pub fn insert(&mut self, source_id: impl Into<String>, target_id: impl Into<String>) -> bool {
        let source_id = source_id.into();
        if let Some(existing) = self.ids.get(&source_id) {
            warn!(
                "{}: {} is already mapped to {}, keeping existing mapping",
                self.label, source_id, existing
            );
            return false;
        }
        self.ids.insert(source_id, target_id.into());
        true
    }

    /// Look up the target id for a source id.
    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.ids.get(source_id).map(String::as_str)
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.ids.contains_key(source_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop every mapping (reset only).
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

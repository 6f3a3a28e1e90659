//! Diff the desired attachment set against what is already on disk.
//!
//! Presence is decided by exact file name alone. The declared size from the
//! API is unreliable and is never compared, so a truncated file left behind
//! by an interrupted run counts as downloaded and is not fetched again.

use std::collections::btree_map;
use std::path::Path;

use crate::snapshot::AttachmentSet;

/// Attachments wanted this cycle that have no same-named entry locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSet(AttachmentSet);

impl PendingSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// File name and declared size, in file-name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.0.iter()
    }
}

/// List `directory` once and drop every attachment whose name is taken.
pub fn reconcile(directory: &Path, attachments: &AttachmentSet) -> std::io::Result<PendingSet> {
    let mut pending = attachments.clone();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            pending.remove(name);
        }
    }
    Ok(PendingSet(pending))
}

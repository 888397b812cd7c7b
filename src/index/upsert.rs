//! Upsert orchestration

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::codec::{FindexKey, IndexedEntry, Keyword, Label};
use crate::error::{IndexError, IndexResult};
use crate::traits::UpsertRequest;

use super::{summary, Findex};

/// Group entries by encoded IndexedValue, merging their keyword sets
///
/// A value indexed under several keywords, possibly across several
/// entries, becomes a single unit.
///
/// # Errors
///
/// `InvalidArgument` if an entry has no keyword.
pub fn group_entries(
    entries: &[IndexedEntry],
) -> IndexResult<BTreeMap<Vec<u8>, BTreeSet<Keyword>>> {
    let mut grouped: BTreeMap<Vec<u8>, BTreeSet<Keyword>> = BTreeMap::new();
    for entry in entries {
        if entry.keywords.is_empty() {
            return Err(IndexError::InvalidArgument(format!(
                "indexed value {:?} has no keyword",
                entry.value
            )));
        }
        grouped
            .entry(entry.value.to_bytes())
            .or_default()
            .extend(entry.keywords.iter().cloned());
    }
    Ok(grouped)
}

impl Findex {
    /// Index `entries` under their keywords
    ///
    /// Either every fetch and write the engine requests succeeds, or the call
    /// fails with `UpsertFailed` carrying the first error. A failed upsert
    /// may leave backend-defined partial state behind; re-upserting the
    /// same entries is required.
    pub async fn upsert(
        &self,
        search_key: &FindexKey,
        update_key: &FindexKey,
        label: &Label,
        entries: &[IndexedEntry],
    ) -> IndexResult<()> {
        let grouped = group_entries(entries)?;
        if grouped.is_empty() {
            return Ok(());
        }

        let keyword_count: usize = grouped.values().map(BTreeSet::len).sum();
        let request = UpsertRequest {
            search_key,
            update_key,
            label,
            entries: &grouped,
        };

        if let Err(e) = self.engine.upsert(request, &self.relay).await {
            warn!(value_count = grouped.len(), error = %e, "Upsert failed");
            return Err(IndexError::UpsertFailed(e));
        }

        summary!(
            self.config.verbose,
            value_count = grouped.len(),
            keyword_count,
            "Upsert committed"
        );
        Ok(())
    }
}

//! Partition and filter decision for a single input unit.

use sp_core::filter::kind_filter;
use sp_core::{InputUnit, KnowledgeSet, Partition};

use crate::archive;

/// Where a unit goes and which entries of it are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub partition: Partition,
    pub filter: Vec<String>,
}

/// Classify `unit` against `knowledge`.
///
/// Directories are always processed. Archives are processed only when they
/// contain a class named in `knowledge`; an empty knowledge set skips the
/// probe entirely and an unreadable archive counts as "no match".
pub fn classify(unit: &InputUnit, knowledge: &KnowledgeSet) -> Classification {
    let filter = derived_filter(unit, &[]);
    let partition = if unit.is_directory() || holds_known_class(unit, knowledge) {
        Partition::Processed
    } else {
        Partition::Reference
    };
    tracing::debug!(path = %unit.path.display(), ?partition, ?filter, "classified input");
    Classification { partition, filter }
}

/// Kind-derived filter for `unit` on top of `base`.
pub fn derived_filter(unit: &InputUnit, base: &[String]) -> Vec<String> {
    kind_filter(base, unit.kinds.has_classes(), unit.kinds.has_resources())
}

fn holds_known_class(unit: &InputUnit, knowledge: &KnowledgeSet) -> bool {
    if knowledge.is_empty() {
        return false;
    }
    match archive::contains_any_class(&unit.path, knowledge) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                path = %unit.path.display(),
                error = %e,
                "could not probe archive, treating it as reference-only"
            );
            false
        }
    }
}

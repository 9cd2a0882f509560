//! Appends classified, filtered entries to the active configuration.

use std::path::{Path, PathBuf};

use sp_core::filter::reference_base_filter;
use sp_core::{ClasspathEntry, InputUnit, KnowledgeSet, Partition, Role, ShrinkConfig};

use crate::classifier::{classify, derived_filter};

/// Builds both classpath partitions of one [`ShrinkConfig`], preserving the
/// order in which units are added.
pub struct ClasspathBuilder<'a> {
    config: &'a mut ShrinkConfig,
    knowledge: &'a KnowledgeSet,
}

impl<'a> ClasspathBuilder<'a> {
    pub fn new(config: &'a mut ShrinkConfig, knowledge: &'a KnowledgeSet) -> Self {
        Self { config, knowledge }
    }

    /// Classify and append `units` with the given role.
    ///
    /// Returns the units that landed in the processed partition. Referenced
    /// units always go to the reference partition behind the reference base
    /// filter, whatever their classification.
    pub fn add(&mut self, units: &[InputUnit], role: Role) -> Vec<InputUnit> {
        let mut processed = Vec::new();
        for unit in units {
            let entry = match role {
                Role::Primary => {
                    let class = classify(unit, self.knowledge);
                    ClasspathEntry::new(&unit.path, class.filter, class.partition)
                }
                Role::Referenced => ClasspathEntry::new(
                    &unit.path,
                    derived_filter(unit, &reference_base_filter()),
                    Partition::Reference,
                ),
            };
            if entry.partition == Partition::Processed {
                processed.push(unit.clone());
            }
            self.config.add_entry(entry);
        }
        processed
    }

    /// Append a unit already known to be processed, with its kind-derived
    /// filter only.
    pub fn add_processed(&mut self, unit: &InputUnit) {
        let filter = derived_filter(unit, &[]);
        self.config.add_entry(ClasspathEntry::new(&unit.path, filter, Partition::Processed));
    }

    /// Append a unit already known to be reference-only, with its
    /// kind-derived filter only.
    pub fn add_reference(&mut self, unit: &InputUnit) {
        let filter = derived_filter(unit, &[]);
        self.config.add_entry(ClasspathEntry::new(&unit.path, filter, Partition::Reference));
    }

    /// Append an artifact produced by an earlier pass, unfiltered.
    pub fn add_artifact(&mut self, path: &Path) {
        self.config.add_entry(ClasspathEntry::unfiltered(path, Partition::Processed));
    }

    /// Append the platform reference archives after everything else, in the
    /// order given.
    pub fn add_platform(&mut self, archives: &[PathBuf]) {
        for archive in archives {
            self.config.add_entry(ClasspathEntry::unfiltered(archive, Partition::Reference));
        }
    }
}

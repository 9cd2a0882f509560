//! Mutable engine configuration for one shrink pass.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{ClasspathEntry, Partition};

/// Ordered classpath of one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classpath {
    entries: Vec<ClasspathEntry>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ClasspathEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.entries.iter().map(|e| e.path.as_path()).collect()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything the engine reads for one invocation.
///
/// Collections (`processed`, `reference`, `rule_files`, `keep_rules`,
/// `apply_mappings`) accumulate while a pass is configured and are emptied by
/// [`ShrinkConfig::reset`]. Output targets and flags are plain values the
/// pipeline reassigns per pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShrinkConfig {
    pub processed: Classpath,
    pub reference: Classpath,
    pub rule_files: Vec<PathBuf>,
    pub keep_rules: Vec<String>,
    /// Mappings the engine applies, in registration order.
    pub apply_mappings: Vec<PathBuf>,
    pub out_artifact: Option<PathBuf>,
    pub print_mapping: Option<PathBuf>,
    pub dump: Option<PathBuf>,
    pub print_seeds: Option<PathBuf>,
    pub print_usage: Option<PathBuf>,
    pub optimize: bool,
    pub force_processing: bool,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            processed: Classpath::new(),
            reference: Classpath::new(),
            rule_files: Vec::new(),
            keep_rules: Vec::new(),
            apply_mappings: Vec::new(),
            out_artifact: None,
            print_mapping: None,
            dump: None,
            print_seeds: None,
            print_usage: None,
            optimize: true,
            force_processing: false,
        }
    }
}

impl ShrinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classpath_mut(&mut self, partition: Partition) -> &mut Classpath {
        match partition {
            Partition::Processed => &mut self.processed,
            Partition::Reference => &mut self.reference,
        }
    }

    pub fn classpath(&self, partition: Partition) -> &Classpath {
        match partition {
            Partition::Processed => &self.processed,
            Partition::Reference => &self.reference,
        }
    }

    /// Append an entry to the partition it names.
    pub fn add_entry(&mut self, entry: ClasspathEntry) {
        self.classpath_mut(entry.partition).push(entry);
    }

    /// Register a mapping to apply before renaming.
    pub fn apply_mapping(&mut self, mapping: impl Into<PathBuf>) {
        self.apply_mappings.push(mapping.into());
    }

    pub fn add_rule_file(&mut self, path: impl Into<PathBuf>) {
        self.rule_files.push(path.into());
    }

    /// Add a `-keep` rule body, e.g. `class **.R { *; }`.
    pub fn keep(&mut self, rule: impl Into<String>) {
        self.keep_rules.push(rule.into());
    }

    pub fn dont_optimize(&mut self) {
        self.optimize = false;
    }

    pub fn force_processing(&mut self) {
        self.force_processing = true;
    }

    /// Empty every collection so the next pass starts from nothing.
    pub fn reset(&mut self) {
        self.processed.clear();
        self.reference.clear();
        self.rule_files.clear();
        self.keep_rules.clear();
        self.apply_mappings.clear();
    }

    pub fn is_cleared(&self) -> bool {
        self.processed.is_empty()
            && self.reference.is_empty()
            && self.rule_files.is_empty()
            && self.keep_rules.is_empty()
            && self.apply_mappings.is_empty()
    }
}

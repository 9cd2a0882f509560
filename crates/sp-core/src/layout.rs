//! Fixed locations of reports and intermediate pass artifacts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const MAPPING_FILE: &str = "mapping.txt";
pub const DUMP_FILE: &str = "dump.txt";
pub const SEEDS_FILE: &str = "seeds.txt";
pub const USAGE_FILE: &str = "usage.txt";

/// Reports directory holding the four fixed-name reports.
///
/// Downstream tooling finds these files by name, so the names never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLayout {
    dir: PathBuf,
}

impl ReportLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<build_dir>/outputs/mapping/<variant_dir>`.
    pub fn for_variant(build_dir: &Path, variant_dir: &str) -> Self {
        Self::new(build_dir.join("outputs").join("mapping").join(variant_dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mapping(&self) -> PathBuf {
        self.dir.join(MAPPING_FILE)
    }

    pub fn dump(&self) -> PathBuf {
        self.dir.join(DUMP_FILE)
    }

    pub fn seeds(&self) -> PathBuf {
        self.dir.join(SEEDS_FILE)
    }

    pub fn usage(&self) -> PathBuf {
        self.dir.join(USAGE_FILE)
    }

    pub fn secondary_outputs(&self) -> Vec<PathBuf> {
        vec![self.mapping(), self.dump(), self.seeds(), self.usage()]
    }
}

/// Private, cache-scoped outputs of pass 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediatePaths {
    pub artifact: PathBuf,
    pub mapping: PathBuf,
}

impl IntermediatePaths {
    pub fn new(cache_dir: &Path, artifact_name: &str, mapping_name: &str) -> Self {
        Self { artifact: cache_dir.join(artifact_name), mapping: cache_dir.join(mapping_name) }
    }
}

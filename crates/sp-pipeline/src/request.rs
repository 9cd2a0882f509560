//! Everything the host hands over for one shrink job.

use std::path::PathBuf;

use sp_core::{InputUnit, KnowledgeSet, Role};

use crate::mapping::PriorMapping;

#[derive(Debug, Clone)]
pub struct ShrinkRequest {
    /// Primary and referenced inputs, in host order.
    pub units: Vec<InputUnit>,
    /// User rule files, applied in this order.
    pub rule_files: Vec<PathBuf>,
    pub prior_mapping: PriorMapping,
    /// Platform/runtime archives, appended to the reference classpath last.
    pub platform: Vec<PathBuf>,
    /// Private cache directory for pass-1 artifacts, unique per invocation.
    pub cache_dir: PathBuf,
    /// Final processed archive.
    pub output: PathBuf,
    pub knowledge: KnowledgeSet,
}

impl ShrinkRequest {
    pub fn new(cache_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            units: Vec::new(),
            rule_files: Vec::new(),
            prior_mapping: PriorMapping::none(),
            platform: Vec::new(),
            cache_dir: cache_dir.into(),
            output: output.into(),
            knowledge: KnowledgeSet::default(),
        }
    }

    pub fn with_unit(mut self, unit: InputUnit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = InputUnit>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_rule_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rule_files.push(path.into());
        self
    }

    pub fn with_prior_mapping(mut self, prior: PriorMapping) -> Self {
        self.prior_mapping = prior;
        self
    }

    pub fn with_platform(mut self, archives: impl IntoIterator<Item = PathBuf>) -> Self {
        self.platform.extend(archives);
        self
    }

    pub fn with_knowledge(mut self, knowledge: KnowledgeSet) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn units_with_role(&self, role: Role) -> Vec<InputUnit> {
        self.units.iter().filter(|u| u.role == role).cloned().collect()
    }

    pub fn primary(&self) -> Vec<InputUnit> {
        self.units_with_role(Role::Primary)
    }

    pub fn referenced(&self) -> Vec<InputUnit> {
        self.units_with_role(Role::Referenced)
    }

    /// Non-incremental inputs the host must watch: the prior mapping, if one
    /// resolves, then the rule files.
    pub fn secondary_inputs(&self) -> Vec<PathBuf> {
        self.prior_mapping.locate().into_iter().chain(self.rule_files.iter().cloned()).collect()
    }
}

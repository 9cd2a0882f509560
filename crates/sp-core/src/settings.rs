//! Ambient settings: engine launcher and intermediate artifact names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const JAVA_ENV: &str = "SHRINKPASS_JAVA";
pub const PROGUARD_JAR_ENV: &str = "SHRINKPASS_PROGUARD_JAR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrinkSettings {
    pub engine: EngineSettings,
    /// File name of the pass-1 artifact inside the cache directory.
    pub temp_artifact_name: String,
    /// File name of the pass-1 mapping inside the cache directory.
    pub intermediate_mapping_name: String,
    /// Whether pass 1 may optimize. Pass 2 never does.
    pub optimize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub java: PathBuf,
    pub proguard_jar: PathBuf,
    pub jvm_args: Vec<String>,
}

impl Default for ShrinkSettings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            temp_artifact_name: "temp.jar".into(),
            intermediate_mapping_name: "mapping.txt".into(),
            optimize: true,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            proguard_jar: PathBuf::from("proguard.jar"),
            jvm_args: Vec::new(),
        }
    }
}

impl ShrinkSettings {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading shrink settings");
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Override the engine launcher from the environment.
    pub fn apply_env(mut self) -> Self {
        if let Some(java) = std::env::var_os(JAVA_ENV) {
            self.engine.java = PathBuf::from(java);
            tracing::debug!(java = %self.engine.java.display(), "java launcher from {JAVA_ENV}");
        }
        if let Some(jar) = std::env::var_os(PROGUARD_JAR_ENV) {
            self.engine.proguard_jar = PathBuf::from(jar);
        }
        self
    }
}

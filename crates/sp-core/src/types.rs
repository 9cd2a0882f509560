//! Input units, classpath entries and pass results.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared content kind of an input unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Classes,
    Resources,
    Other(String),
}

/// Ordered set of declared content kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKinds(BTreeSet<ContentKind>);

impl ContentKinds {
    pub fn new(kinds: impl IntoIterator<Item = ContentKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn classes() -> Self {
        Self::new([ContentKind::Classes])
    }

    pub fn resources() -> Self {
        Self::new([ContentKind::Resources])
    }

    /// Classes and resources, the usual kinds of a library archive.
    pub fn jars() -> Self {
        Self::new([ContentKind::Classes, ContentKind::Resources])
    }

    pub fn contains(&self, kind: &ContentKind) -> bool {
        self.0.contains(kind)
    }

    pub fn has_classes(&self) -> bool {
        self.contains(&ContentKind::Classes)
    }

    pub fn has_resources(&self) -> bool {
        self.contains(&ContentKind::Resources)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentKind> {
        self.0.iter()
    }
}

/// Who owns an input unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Produced by this build; shrunk and renamed.
    Primary,
    /// Supplied for symbol resolution only; never renamed or stripped.
    Referenced,
}

/// Classpath partition an entry lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Processed and renamed by the engine ("program jars").
    Processed,
    /// Read-only, symbol resolution only ("library jars").
    Reference,
}

/// One file or directory handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputUnit {
    pub path: PathBuf,
    pub kinds: ContentKinds,
    pub role: Role,
}

impl InputUnit {
    pub fn new(path: impl Into<PathBuf>, kinds: ContentKinds, role: Role) -> Self {
        Self { path: path.into(), kinds, role }
    }

    pub fn primary(path: impl Into<PathBuf>, kinds: ContentKinds) -> Self {
        Self::new(path, kinds, Role::Primary)
    }

    pub fn referenced(path: impl Into<PathBuf>, kinds: ContentKinds) -> Self {
        Self::new(path, kinds, Role::Referenced)
    }

    /// Archive form: the path is a regular file. Anything else (directories,
    /// paths that do not exist yet) is directory form.
    pub fn is_archive(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_directory(&self) -> bool {
        !self.is_archive()
    }
}

/// A path plus its file filter, placed in one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasspathEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub filter: Vec<String>,
    pub partition: Partition,
}

impl ClasspathEntry {
    pub fn new(path: impl Into<PathBuf>, filter: Vec<String>, partition: Partition) -> Self {
        Self { path: path.into(), filter, partition }
    }

    pub fn unfiltered(path: impl Into<PathBuf>, partition: Partition) -> Self {
        Self::new(path, Vec::new(), partition)
    }
}

/// Fully-qualified class names whose presence forces an archive into the
/// processed partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSet(BTreeSet<String>);

impl KnowledgeSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Compiled-class entry paths, e.g. `a.b.C` -> `a/b/C.class`.
    pub fn class_entry_paths(&self) -> Vec<String> {
        self.0.iter().map(|name| class_entry_path(name)).collect()
    }
}

/// Entry path of a compiled class inside an archive or directory.
pub fn class_entry_path(class_name: &str) -> String {
    format!("{}.class", class_name.replace('.', "/"))
}

/// Which of the two engine invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassId {
    First,
    Second,
}

impl PassId {
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass {}", self.number())
    }
}

/// Artifact and mapping produced by one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassResult {
    pub pass: PassId,
    pub artifact: PathBuf,
    pub mapping: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PassResult {
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn mapping(&self) -> &Path {
        &self.mapping
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

//! Core model for the two-pass shrink pipeline.
//!
//! Holds the input/classpath data model, the ProGuard-style glob filters,
//! the mutable engine configuration and the fixed report layout shared by
//! the classpath, pipeline and scheduler crates.

pub mod config;
pub mod error;
pub mod filter;
pub mod layout;
pub mod settings;
pub mod types;

pub use config::{Classpath, ShrinkConfig};
pub use error::{Result, ShrinkError};
pub use filter::CompiledFilter;
pub use layout::{IntermediatePaths, ReportLayout};
pub use settings::{EngineSettings, ShrinkSettings};
pub use types::{
    ClasspathEntry, ContentKind, ContentKinds, InputUnit, KnowledgeSet, Partition, PassId,
    PassResult, Role,
};

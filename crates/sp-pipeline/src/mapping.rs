//! Prior-mapping lookup and mapping registration order.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sp_core::ShrinkConfig;

/// Resolves a single mapping file owned by the host, e.g. the output of a
/// related variant's build.
pub trait MappingResolver: Send + Sync {
    fn resolve(&self) -> anyhow::Result<PathBuf>;
}

/// Rename mapping of a related variant, given directly or through a resolver.
#[derive(Clone, Default)]
pub struct PriorMapping {
    file: Option<PathBuf>,
    resolver: Option<Arc<dyn MappingResolver>>,
}

impl PriorMapping {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { file: Some(path.into()), resolver: None }
    }

    pub fn resolver(resolver: Arc<dyn MappingResolver>) -> Self {
        Self { file: None, resolver: Some(resolver) }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn MappingResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The mapping to apply, if any.
    ///
    /// A direct file wins when it exists; otherwise the resolver's file is used
    /// when it resolves to an existing file.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(file) = self.file.as_ref().filter(|f| f.is_file()) {
            return Some(file.clone());
        }
        let resolver = self.resolver.as_ref()?;
        match resolver.resolve() {
            Ok(path) if path.is_file() => Some(path),
            Ok(path) => {
                tracing::debug!(path = %path.display(), "resolved prior mapping does not exist");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve prior mapping, continuing without it");
                None
            }
        }
    }
}

impl fmt::Debug for PriorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorMapping")
            .field("file", &self.file)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Threads the prior mapping and a pass-local mapping into a configuration.
///
/// The engine applies mappings in registration order and later mappings
/// rename symbols already renamed by earlier ones, so the prior mapping is
/// always registered first.
#[derive(Debug, Clone, Default)]
pub struct MappingChain {
    prior: Option<PathBuf>,
}

impl MappingChain {
    pub fn new(prior: Option<PathBuf>) -> Self {
        Self { prior }
    }

    pub fn prior(&self) -> Option<&Path> {
        self.prior.as_deref()
    }

    pub fn apply(&self, config: &mut ShrinkConfig, pass_mapping: Option<&Path>) {
        for mapping in self.prior.as_deref().into_iter().chain(pass_mapping) {
            tracing::debug!(mapping = %mapping.display(), "registering mapping");
            config.apply_mapping(mapping);
        }
    }
}

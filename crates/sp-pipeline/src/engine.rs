use sp_core::ShrinkConfig;

/// The shrinking/renaming engine, run once per pass against a fully built
/// configuration.
///
/// Implementations hold whatever state they like between calls; the pipeline
/// guarantees the two calls of one job are sequential and that no other job
/// runs concurrently.
pub trait ShrinkEngine: Send {
    fn name(&self) -> &str {
        "proguard"
    }

    fn run(&mut self, config: &ShrinkConfig) -> anyhow::Result<()>;
}

impl ShrinkEngine for Box<dyn ShrinkEngine> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&mut self, config: &ShrinkConfig) -> anyhow::Result<()> {
        (**self).run(config)
    }
}

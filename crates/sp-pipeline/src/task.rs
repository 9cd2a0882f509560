//! Serialized entry point: one shrink job per call, one job at a time.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use sp_core::error::{Result, ShrinkError};
use sp_core::{ReportLayout, ShrinkSettings};
use sp_scheduler::{SchedulerError, SingleFlight};

use crate::engine::ShrinkEngine;
use crate::pipeline::{ShrinkOutcome, ShrinkPipeline};
use crate::proguard::ProguardCommandEngine;
use crate::request::ShrinkRequest;

/// Builds a fresh engine for every job.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn ShrinkEngine> + Send + Sync>;

pub struct ShrinkTask {
    name: String,
    layout: ReportLayout,
    settings: ShrinkSettings,
    engine_factory: EngineFactory,
    scheduler: &'static SingleFlight,
}

impl ShrinkTask {
    pub fn new(layout: ReportLayout, settings: ShrinkSettings, engine_factory: EngineFactory) -> Self {
        Self {
            name: "proguard".to_string(),
            layout,
            settings,
            engine_factory,
            scheduler: SingleFlight::global(),
        }
    }

    /// A task running the ProGuard command-line tool configured in `settings`.
    pub fn proguard(layout: ReportLayout, settings: ShrinkSettings) -> Self {
        let engine = settings.engine.clone();
        let factory: EngineFactory =
            Arc::new(move || Box::new(ProguardCommandEngine::new(engine.clone())) as Box<dyn ShrinkEngine>);
        Self::new(layout, settings, factory)
    }

    /// Run on `scheduler` instead of the process-wide one.
    pub fn with_scheduler(mut self, scheduler: &'static SingleFlight) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Every run reprocesses the full input set.
    pub fn is_incremental(&self) -> bool {
        false
    }

    pub fn secondary_inputs(&self, request: &ShrinkRequest) -> Vec<PathBuf> {
        request.secondary_inputs()
    }

    pub fn secondary_outputs(&self) -> Vec<PathBuf> {
        self.layout.secondary_outputs()
    }

    fn job(&self, request: ShrinkRequest) -> impl FnOnce() -> Result<ShrinkOutcome> + Send + 'static {
        let factory = self.engine_factory.clone();
        let layout = self.layout.clone();
        let settings = self.settings.clone();
        move || {
            let mut pipeline = ShrinkPipeline::new(factory(), layout, settings);
            pipeline.run(&request)
        }
    }

    /// Run both passes, blocking until this job has finished. Must not be
    /// called from inside an async runtime.
    pub fn transform(&self, request: ShrinkRequest) -> Result<ShrinkOutcome> {
        self.scheduler.submit(self.name.clone(), self.job(request)).map_err(unwrap_job_error)
    }

    pub async fn transform_async(&self, request: ShrinkRequest) -> Result<ShrinkOutcome> {
        self.scheduler
            .submit_async(self.name.clone(), self.job(request))
            .await
            .map_err(unwrap_job_error)
    }

    /// Like [`ShrinkTask::transform_async`], giving up when `interrupt`
    /// completes first. The queued job still runs to completion.
    pub async fn transform_until<I>(&self, request: ShrinkRequest, interrupt: I) -> Result<ShrinkOutcome>
    where
        I: Future<Output = ()>,
    {
        self.scheduler
            .submit_until(self.name.clone(), self.job(request), interrupt)
            .await
            .map_err(unwrap_job_error)
    }
}

/// Give the caller back the pipeline's own error when the job failed.
fn unwrap_job_error(err: SchedulerError) -> ShrinkError {
    match err.into_job_error() {
        Ok(source) => match source.downcast::<ShrinkError>() {
            Ok(shrink) => *shrink,
            Err(other) => ShrinkError::Other(anyhow::anyhow!(other)),
        },
        Err(scheduler) => ShrinkError::Other(anyhow::Error::new(scheduler).context("single-flight scheduler")),
    }
}

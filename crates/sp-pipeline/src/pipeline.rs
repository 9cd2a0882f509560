//! The two-pass state machine.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sp_classpath::ClasspathBuilder;
use sp_core::error::{Result, ShrinkError};
use sp_core::{
    InputUnit, IntermediatePaths, PassId, PassResult, ReportLayout, Role, ShrinkConfig,
    ShrinkSettings,
};

use crate::engine::ShrinkEngine;
use crate::mapping::MappingChain;
use crate::request::ShrinkRequest;

/// Generated identifier-table classes referenced by name from code that is
/// never shrunk.
pub const IMPLICIT_KEEP_RULES: [&str; 2] = ["class **.R { *; }", "class **.R$** { *; }"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Init,
    Pass1Configured,
    Pass1Done,
    Pass2Configured,
    Pass2Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Pass1Configured => "pass1-configured",
            Self::Pass1Done => "pass1-done",
            Self::Pass2Configured => "pass2-configured",
            Self::Pass2Done => "pass2-done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a successful two-pass run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShrinkOutcome {
    pub first: PassResult,
    pub second: PassResult,
    pub residual_libraries: Vec<InputUnit>,
    pub layout: ReportLayout,
}

impl ShrinkOutcome {
    pub fn artifact(&self) -> &Path {
        &self.second.artifact
    }

    pub fn mapping(&self) -> &Path {
        &self.second.mapping
    }
}

/// What pass 1's classification decided for the primary inputs.
#[derive(Debug, Clone, Default)]
struct PrimarySplit {
    processed: Vec<InputUnit>,
    reference: Vec<InputUnit>,
}

/// Archive-form processed primary inputs other than the intermediate
/// artifact. Pass 1 emitted their content; pass 2 takes them again as
/// processed input with their kind filter only.
pub fn residual_libraries(processed_primary: &[InputUnit], intermediate: &Path) -> Vec<InputUnit> {
    processed_primary
        .iter()
        .filter(|unit| unit.is_archive() && unit.path != intermediate)
        .cloned()
        .collect()
}

/// Drives one engine through both passes of one job.
///
/// Each [`ShrinkPipeline::run`] starts from a freshly constructed
/// configuration, so nothing leaks from an earlier job.
pub struct ShrinkPipeline<E: ShrinkEngine> {
    engine: E,
    layout: ReportLayout,
    settings: ShrinkSettings,
    config: ShrinkConfig,
    state: PipelineState,
}

impl<E: ShrinkEngine> ShrinkPipeline<E> {
    pub fn new(engine: E, layout: ReportLayout, settings: ShrinkSettings) -> Self {
        Self { engine, layout, settings, config: ShrinkConfig::new(), state: PipelineState::Init }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Configuration of the last configured pass.
    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    pub fn run(&mut self, request: &ShrinkRequest) -> Result<ShrinkOutcome> {
        self.config = ShrinkConfig::new();
        self.state = PipelineState::Init;
        let result = self.run_passes(request);
        if let Err(e) = &result {
            tracing::error!(error = %e, from = %self.state, "shrink failed");
            self.state = PipelineState::Failed;
        }
        result
    }

    fn run_passes(&mut self, request: &ShrinkRequest) -> Result<ShrinkOutcome> {
        let intermediate = IntermediatePaths::new(
            &request.cache_dir,
            &self.settings.temp_artifact_name,
            &self.settings.intermediate_mapping_name,
        );
        let chain = MappingChain::new(request.prior_mapping.locate());

        let split = self
            .configure_first_pass(request, &chain, &intermediate)
            .map_err(|e| e.into_pass(PassId::First))?;
        self.state = PipelineState::Pass1Configured;

        let first = self.execute(PassId::First)?;
        let residual = residual_libraries(&split.processed, &intermediate.artifact);
        self.state = PipelineState::Pass1Done;
        tracing::info!(
            residual = residual.len(),
            artifact = %first.artifact.display(),
            "pass 1 complete"
        );

        self.configure_second_pass(request, &chain, &intermediate, &residual, &split.reference)
            .map_err(|e| e.into_pass(PassId::Second))?;
        self.state = PipelineState::Pass2Configured;

        let second = self.execute(PassId::Second)?;
        self.state = PipelineState::Pass2Done;
        tracing::info!(artifact = %second.artifact.display(), "pass 2 complete");

        Ok(ShrinkOutcome {
            first,
            second,
            residual_libraries: residual,
            layout: self.layout.clone(),
        })
    }

    fn prepare_directories(&self, request: &ShrinkRequest) -> Result<()> {
        if let Some(parent) = request.output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&request.cache_dir)?;
        // The engine does not create report folders itself.
        std::fs::create_dir_all(self.layout.dir())?;
        Ok(())
    }

    fn apply_rules(&mut self, rule_files: &[PathBuf]) -> Result<()> {
        for rule in rule_files {
            if !rule.is_file() {
                return Err(ShrinkError::Config(format!(
                    "rule file {} does not exist",
                    rule.display()
                )));
            }
            self.config.add_rule_file(rule);
        }
        for keep in IMPLICIT_KEEP_RULES {
            self.config.keep(keep);
        }
        Ok(())
    }

    fn configure_first_pass(
        &mut self,
        request: &ShrinkRequest,
        chain: &MappingChain,
        intermediate: &IntermediatePaths,
    ) -> Result<PrimarySplit> {
        self.prepare_directories(request)?;
        chain.apply(&mut self.config, None);

        let primary = request.primary();
        let processed = {
            let mut builder = ClasspathBuilder::new(&mut self.config, &request.knowledge);
            let processed = builder.add(&primary, Role::Primary);
            builder.add(&request.referenced(), Role::Referenced);
            builder.add_platform(&request.platform);
            processed
        };
        let reference = primary.into_iter().filter(|u| !processed.contains(u)).collect();

        self.config.out_artifact = Some(intermediate.artifact.clone());
        self.config.print_mapping = Some(intermediate.mapping.clone());
        self.apply_rules(&request.rule_files)?;
        self.config.dump = Some(self.layout.dump());
        self.config.print_seeds = Some(self.layout.seeds());
        self.config.print_usage = Some(self.layout.usage());
        self.config.optimize = self.settings.optimize;
        self.config.force_processing();

        Ok(PrimarySplit { processed, reference })
    }

    fn configure_second_pass(
        &mut self,
        request: &ShrinkRequest,
        chain: &MappingChain,
        intermediate: &IntermediatePaths,
        residual: &[InputUnit],
        primary_reference: &[InputUnit],
    ) -> Result<()> {
        self.config.reset();
        tracing::debug!(cleared = self.config.is_cleared(), "configuration reset for pass 2");

        chain.apply(&mut self.config, Some(&intermediate.mapping));
        {
            let mut builder = ClasspathBuilder::new(&mut self.config, &request.knowledge);
            builder.add_artifact(&intermediate.artifact);
            for unit in residual {
                builder.add_processed(unit);
            }
            for unit in primary_reference {
                builder.add_reference(unit);
            }
            builder.add(&request.referenced(), Role::Referenced);
            builder.add_platform(&request.platform);
        }

        self.config.out_artifact = Some(request.output.clone());
        self.config.print_mapping = Some(self.layout.mapping());
        self.apply_rules(&request.rule_files)?;
        // Optimizing is only valid once, against the unrenamed bytecode.
        self.config.dont_optimize();
        self.config.force_processing();
        Ok(())
    }

    fn execute(&mut self, pass: PassId) -> Result<PassResult> {
        let artifact = self
            .config
            .out_artifact
            .clone()
            .ok_or_else(|| ShrinkError::Config(format!("{pass} has no output artifact")))
            .map_err(|e| e.into_pass(pass))?;
        let mapping = self
            .config
            .print_mapping
            .clone()
            .ok_or_else(|| ShrinkError::Config(format!("{pass} has no mapping output")))
            .map_err(|e| e.into_pass(pass))?;

        tracing::info!(
            %pass,
            engine = self.engine.name(),
            processed = self.config.processed.len(),
            reference = self.config.reference.len(),
            mappings = self.config.apply_mappings.len(),
            optimize = self.config.optimize,
            "running shrink engine"
        );
        let started_at = Utc::now();
        self.engine.run(&self.config).map_err(|e| ShrinkError::pass(pass, e))?;
        Ok(PassResult { pass, artifact, mapping, started_at, finished_at: Utc::now() })
    }
}

//! Two-pass shrink pipeline.
//!
//! Pass 1 shrinks and renames the processed classpath into a private
//! intermediate archive. Pass 2 starts from an emptied configuration, applies
//! the prior and pass-1 mappings in that order, and renames the intermediate
//! archive plus the residual libraries into the final artifact. Every run is
//! serialized process-wide through [`sp_scheduler::SingleFlight`].

pub mod engine;
pub mod mapping;
pub mod pipeline;
pub mod proguard;
pub mod request;
pub mod task;

pub use engine::ShrinkEngine;
pub use mapping::{MappingChain, MappingResolver, PriorMapping};
pub use pipeline::{residual_libraries, PipelineState, ShrinkOutcome, ShrinkPipeline};
pub use proguard::ProguardCommandEngine;
pub use request::ShrinkRequest;
pub use task::{EngineFactory, ShrinkTask};

//! Pipelines.
//!
//! The module provides a light [pipeline::Pipeline] trait, implemented by [corpus::CorpusPipeline]
//! which turns a folder of shards into a single training corpus.
pub mod corpus;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use corpus::{CorpusPipeline, PipelineState};
pub use pipeline::Pipeline;

#![warn(clippy::pedantic)]
// Allow common pedantic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

//! # Advisor
//!
//! Core library for LLM-backed cloud cost recommendations.
//!
//! This crate provides:
//! - In-memory task registry with cooperative, poll-based cancellation
//! - Cancellation-aware analysis engine that fans out per-resource LLM calls
//! - LLM provider abstraction (Anthropic, OpenAI)
//! - Prompt templates for storage and compute cost analysis
//! - SQLite-backed recommendation cache keyed by analysis parameters
//! - Resource inventory port for the ingestion boundary
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use advisor::{AnalysisEngine, TaskRegistry};
//!
//! let registry = Arc::new(TaskRegistry::new());
//! let task_id = registry.create("project-1", "llm_analysis");
//!
//! let engine = AnalysisEngine::new(registry.clone(), provider, settings);
//! let outcome = engine.run(&task_id, kind, &resources, &period).await;
//! ```

// LLM provider abstraction
pub mod ai;

// Analysis engine and recommendation schema
pub mod analysis;

// Recommendation cache
pub mod cache;

// Resource inventory port
pub mod inventory;

// Resource data model
pub mod resources;

// Task registry
pub mod tasks;

// Re-export key types for convenience
pub use ai::{GenerateOptions, LlmError, LlmProvider, LlmResponse, ProviderRegistry, TokenUsage};
pub use analysis::{
    AnalysisEngine, AnalysisOutcome, CostForecast, EngineSettings, RecommendationSet,
    ResourceRecommendation,
};
pub use cache::{CacheKey, RecommendationCache};
pub use inventory::{FileInventory, InventoryError, ResourceStore};
pub use resources::{AnalysisPeriod, ResourceData, ResourceKind};
pub use tasks::{Task, TaskRegistry, TaskStatus};

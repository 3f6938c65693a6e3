//! Ensemble judging engine for rap performances.
//!
//! A panel of persona-driven judges scores the same text concurrently
//! through chat-completion backends. Each judge always yields an outcome:
//! failed or unparseable calls are replaced by a lexical fallback analysis.
//! The outcomes are then folded into one aggregate verdict.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use rapjudge_core::{Engine, EngineConfig, HttpScorer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = EngineConfig::from_env()?;
//! let engine = Engine::new(config, Arc::new(HttpScorer::new()?));
//!
//! let eval = engine.evaluate("I came to win, spitting fire on the mic").await?;
//! println!("{} ({:.1}/10)", eval.verdict.grade, eval.verdict.overall);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `FEATHERLESS_API_KEY` | Key for the built-in `featherless` provider |
//! | `K2_API_KEY` | Key for the built-in `k2` provider |
//! | `RAPJUDGE_TIMEOUT_SECS` | Per-call timeout in seconds (default: 30) |
//! | `RAPJUDGE_RETRIES` | Extra attempts on transient failures (default: 0) |

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod model;
pub mod panel;
pub mod parse;
pub mod prompt;
pub mod record;
pub mod scorer;
pub mod transcript;

// Re-export main types
pub use aggregate::{aggregate, GradeBand};
pub use config::{load_config, EngineConfig, JudgeDefinition, ProviderConfig, VerdictTable};
pub use engine::{Engine, Evaluation};
pub use error::{ConfigError, EngineError, ParseError, ScorerError};
pub use heuristics::{analyze, Analysis};
pub use model::{
    AggregateVerdict, Category, CategoryMap, CategoryScores, JudgeOutcome, Provenance, ScoreRecord,
};
pub use panel::Panel;
pub use parse::parse;
pub use record::{feedback_summary, grade_label, MemoryRecordStore, RecordStore, SavedRecord};
pub use scorer::{FakeReply, FakeScorer, HttpScorer, Scorer};
pub use transcript::{TranscriptBuffer, TranscriptEvent};

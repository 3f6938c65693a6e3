//! Entry point tying the panel and the aggregator together.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, info_span, Instrument};

use crate::aggregate;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{AggregateVerdict, JudgeOutcome};
use crate::panel::Panel;
use crate::record::{self, RecordStore, SavedRecord};
use crate::scorer::Scorer;

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub outcomes: Vec<JudgeOutcome>,
    pub verdict: AggregateVerdict,
}

#[derive(Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    panel: Panel,
}

impl Engine {
    pub fn new(config: EngineConfig, scorer: Arc<dyn Scorer>) -> Self {
        let config = Arc::new(config);
        let panel = Panel::new(config.clone(), scorer);
        Self { config, panel }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Judge `text` with the full panel and fold the outcomes.
    ///
    /// Only an empty panel fails; backend trouble degrades individual
    /// outcomes instead.
    pub async fn evaluate(&self, text: &str) -> Result<Evaluation, EngineError> {
        if self.config.judges.is_empty() {
            return Err(EngineError::EmptyPanel);
        }

        let span = info_span!("evaluate", judges = self.config.judges.len(), chars = text.len());
        async {
            let outcomes = self.panel.run(text).await;
            let verdict = aggregate::aggregate(&outcomes, text, &self.config.grades);
            info!(
                overall = verdict.overall,
                grade = %verdict.grade,
                succeeded = verdict.judges_succeeded,
                "evaluation complete"
            );
            Ok(Evaluation { outcomes, verdict })
        }
        .instrument(span)
        .await
    }

    /// Save the text, evaluate it, then attach grade and feedback to the
    /// saved record.
    pub async fn evaluate_and_record(
        &self,
        text: &str,
        store: &dyn RecordStore,
    ) -> Result<(SavedRecord, Evaluation), EngineError> {
        let saved = store.save(text).await.map_err(store_error)?;
        let evaluation = self.evaluate(text).await?;
        store
            .update(
                &saved.id,
                &record::grade_label(&evaluation.verdict),
                &record::feedback_summary(&evaluation.outcomes),
            )
            .await
            .map_err(store_error)?;
        Ok((saved, evaluation))
    }
}

fn store_error(e: anyhow::Error) -> EngineError {
    EngineError::Store {
        message: format!("{:#}", e),
    }
}

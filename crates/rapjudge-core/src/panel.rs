//! Judge panel: fans one scorer call per judge out concurrently and joins
//! them back in definition order.
//!
//! `run` is total: every configured judge yields exactly one outcome, with
//! fallbacks standing in for judges whose backend failed, timed out, or
//! answered with something unparseable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{EngineConfig, JudgeDefinition};
use crate::error::ScorerError;
use crate::heuristics;
use crate::model::{CategoryScores, JudgeOutcome, Provenance, ScoreRecord};
use crate::parse;
use crate::prompt;
use crate::scorer::Scorer;

/// Verdicts shorter than this are replaced from the judge's table.
const MIN_VERDICT_CHARS: usize = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Clone)]
pub struct Panel {
    config: Arc<EngineConfig>,
    scorer: Arc<dyn Scorer>,
}

impl Panel {
    pub fn new(config: Arc<EngineConfig>, scorer: Arc<dyn Scorer>) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// One outcome per configured judge, in configuration order.
    pub async fn run(&self, text: &str) -> Vec<JudgeOutcome> {
        let judges = &self.config.judges;
        let text: Arc<str> = Arc::from(text);
        let mut join_set = JoinSet::new();

        for (idx, judge) in judges.iter().enumerate() {
            let config = self.config.clone();
            let scorer = self.scorer.clone();
            let text = text.clone();
            let span = info_span!("judge", judge.id = %judge.id, judge.provider = %judge.provider);
            join_set.spawn(
                async move {
                    let judge = &config.judges[idx];
                    let outcome = evaluate_judge(&config, scorer.as_ref(), judge, &text).await;
                    (idx, outcome)
                }
                .instrument(span),
            );
        }

        let mut slots: Vec<Option<JudgeOutcome>> = vec![None; judges.len()];
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => warn!(error = %e, "judge task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(judges)
            .map(|(slot, judge)| {
                slot.unwrap_or_else(|| {
                    fallback_outcome(judge, &text, Provenance::ScorerUnreachableFallback)
                })
            })
            .collect()
    }
}

async fn evaluate_judge(
    config: &EngineConfig,
    scorer: &dyn Scorer,
    judge: &JudgeDefinition,
    text: &str,
) -> JudgeOutcome {
    let started = Instant::now();

    let outcome = match call_with_retries(config, scorer, judge, text).await {
        Ok(raw) => match parse::parse(&raw) {
            Ok(record) => success_outcome(judge, record, text),
            Err(e) => {
                warn!(error = %e, "scorer output unusable, using fallback");
                fallback_outcome(judge, text, Provenance::ScorerParsedFallback)
            }
        },
        Err(e) => {
            warn!(error = %e, "scorer unreachable, using fallback");
            fallback_outcome(judge, text, Provenance::ScorerUnreachableFallback)
        }
    };

    info!(
        provenance = outcome.provenance.as_str(),
        overall = outcome.overall,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "judge finished"
    );
    outcome
}

async fn call_with_retries(
    config: &EngineConfig,
    scorer: &dyn Scorer,
    judge: &JudgeDefinition,
    text: &str,
) -> Result<String, ScorerError> {
    let provider = config
        .provider(&judge.provider)
        .ok_or_else(|| ScorerError::Configuration {
            provider: judge.provider.clone(),
        })?;
    let messages = prompt::build_messages(judge, text);
    let budget = config.timeout();

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let call = scorer.call(
            &judge.provider,
            provider,
            &judge.model,
            &messages,
            judge.max_tokens,
        );
        let result = match tokio::time::timeout(budget, call).await {
            Ok(result) => result,
            Err(_) => Err(ScorerError::Timeout {
                provider: judge.provider.clone(),
                after: budget,
            }),
        };

        match result {
            Err(e) if e.is_retryable() && attempt <= config.retries => {
                debug!(attempt, error = %e, "retrying scorer call");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            other => return other,
        }
    }
}

fn success_outcome(judge: &JudgeDefinition, record: ScoreRecord, text: &str) -> JudgeOutcome {
    let verdict = if record.verdict.chars().count() < MIN_VERDICT_CHARS {
        judge.verdicts.pick(record.overall).to_string()
    } else {
        record.verdict
    };

    let (mut strengths, mut improve) = (record.strengths, record.improve);
    if strengths.is_empty() || improve.is_empty() {
        let analysis = heuristics::analyze(text);
        if strengths.is_empty() {
            strengths = analysis.strengths;
        }
        if improve.is_empty() {
            improve = analysis.tips;
        }
    }

    JudgeOutcome {
        judge_id: judge.id.clone(),
        judge_name: judge.name.clone(),
        icon: judge.icon.clone(),
        scores: record.scores,
        overall: record.overall,
        verdict,
        strengths,
        improve,
        provenance: Provenance::ScorerSuccess,
    }
}

/// Outcome synthesized from the text alone. Scores land in [5, 6].
pub(crate) fn fallback_outcome(
    judge: &JudgeDefinition,
    text: &str,
    provenance: Provenance,
) -> JudgeOutcome {
    let scores = CategoryScores::from_fn(|category| fallback_score(&judge.id, category.key(), text));
    let overall = scores.mean().round();
    let analysis = heuristics::analyze(text);

    JudgeOutcome {
        judge_id: judge.id.clone(),
        judge_name: judge.name.clone(),
        icon: judge.icon.clone(),
        scores,
        overall,
        verdict: judge.verdicts.pick(overall).to_string(),
        strengths: analysis.strengths,
        improve: analysis.tips,
        provenance,
    }
}

/// 5 or 6, chosen by hashing judge, category and text.
fn fallback_score(judge_id: &str, category: &str, text: &str) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(judge_id.as_bytes());
    hasher.update([0x1f]);
    hasher.update(category.as_bytes());
    hasher.update([0x1f]);
    hasher.update(text.as_bytes());
    5 + (hasher.finalize()[0] & 1)
}

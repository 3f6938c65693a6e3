//! Record store seam. Persistence itself lives outside the engine; this is
//! the contract it is driven through plus an in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AggregateVerdict, JudgeOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, text: &str) -> anyhow::Result<SavedRecord>;

    async fn update(&self, id: &str, grade_label: &str, feedback_summary: &str)
        -> anyhow::Result<()>;
}

/// `"<letter> (<overall>/10)"`, overall to one decimal.
pub fn grade_label(verdict: &AggregateVerdict) -> String {
    format!("{} ({:.1}/10)", verdict.grade, verdict.overall)
}

/// `"<icon> <name>: <verdict>"` per successful judge, joined with `" | "`.
pub fn feedback_summary(outcomes: &[JudgeOutcome]) -> String {
    outcomes
        .iter()
        .filter(|o| o.provenance.is_success())
        .map(|o| format!("{} {}: {}", o.icon, o.judge_name, o.verdict))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecord {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub grade: Option<String>,
    pub feedback: Option<String>,
}

/// Process-local store keyed by random UUIDs.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, StoredRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<StoredRecord> {
        self.records.lock().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save(&self, text: &str) -> anyhow::Result<SavedRecord> {
        let record = StoredRecord {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            grade: None,
            feedback: None,
        };
        let saved = SavedRecord {
            id: record.id.clone(),
            created_at: record.created_at,
        };
        self.records
            .lock()
            .map_err(|_| anyhow::anyhow!("record store lock poisoned"))?
            .insert(record.id.clone(), record);
        Ok(saved)
    }

    async fn update(
        &self,
        id: &str,
        grade_label: &str,
        feedback_summary: &str,
    ) -> anyhow::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("record store lock poisoned"))?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("record not found: {}", id))?;
        record.grade = Some(grade_label.to_string());
        record.feedback = Some(feedback_summary.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryMap, CategoryScores, Provenance};

    fn outcome(name: &str, verdict: &str, provenance: Provenance) -> JudgeOutcome {
        JudgeOutcome {
            judge_id: name.to_lowercase(),
            judge_name: name.to_string(),
            icon: "🎤".to_string(),
            scores: CategoryScores::from_fn(|_| 7),
            overall: 7.0,
            verdict: verdict.to_string(),
            strengths: vec![],
            improve: vec![],
            provenance,
        }
    }

    #[test]
    fn label_and_summary_format() {
        let verdict = AggregateVerdict {
            categories: CategoryMap::from_fn(|_| 7.0),
            overall: 7.0,
            grade: "B".to_string(),
            message: String::new(),
            strengths: vec![],
            improvements: vec![],
            judges_total: 3,
            judges_succeeded: 2,
        };
        assert_eq!(grade_label(&verdict), "B (7.0/10)");

        let outcomes = vec![
            outcome("Mike", "Real hip-hop.", Provenance::ScorerSuccess),
            outcome("Neural", "fallback", Provenance::ScorerUnreachableFallback),
            outcome("Queen", "Crowd loved it.", Provenance::ScorerSuccess),
        ];
        assert_eq!(
            feedback_summary(&outcomes),
            "🎤 Mike: Real hip-hop. | 🎤 Queen: Crowd loved it."
        );
    }

    #[tokio::test]
    async fn memory_store_save_then_update() {
        let store = MemoryRecordStore::new();
        let saved = store.save("my verse").await.unwrap();
        store.update(&saved.id, "A (8.6/10)", "ok").await.unwrap();

        let record = store.get(&saved.id).unwrap();
        assert_eq!(record.text, "my verse");
        assert_eq!(record.grade.as_deref(), Some("A (8.6/10)"));
        assert!(store.update("missing", "F", "").await.is_err());
    }
}

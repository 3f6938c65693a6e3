use std::fmt::Write as _;

use rapjudge_core::{EngineConfig, Evaluation, JudgeOutcome, Provenance, SavedRecord};
use serde::Serialize;

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    evaluation: &'a Evaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a SavedRecord>,
}

pub(crate) fn render_json(
    evaluation: &Evaluation,
    record: Option<&SavedRecord>,
) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&Report { evaluation, record })?)
}

pub(crate) fn render_text(evaluation: &Evaluation, record: Option<&SavedRecord>) -> String {
    let mut out = String::new();
    let verdict = &evaluation.verdict;

    for outcome in &evaluation.outcomes {
        render_card(&mut out, outcome);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Grade: {} ({:.1}/10)", verdict.grade, verdict.overall);
    let _ = writeln!(out, "{}", verdict.message);
    let _ = writeln!(
        out,
        "Judges responding: {}/{}",
        verdict.judges_succeeded, verdict.judges_total
    );

    let categories: Vec<String> = verdict
        .categories
        .iter()
        .map(|(category, score)| format!("{} {:.1}", category.key(), score))
        .collect();
    let _ = writeln!(out, "Categories: {}", categories.join(", "));

    if !verdict.strengths.is_empty() {
        let _ = writeln!(out, "\nStrengths:");
        for s in &verdict.strengths {
            let _ = writeln!(out, "  + {s}");
        }
    }
    if !verdict.improvements.is_empty() {
        let _ = writeln!(out, "\nTips:");
        for tip in &verdict.improvements {
            let _ = writeln!(out, "  - {tip}");
        }
    }

    if let Some(record) = record {
        let _ = writeln!(
            out,
            "\nSaved as {} at {}",
            record.id,
            record.created_at.to_rfc3339()
        );
    }
    out
}

fn render_card(out: &mut String, outcome: &JudgeOutcome) {
    let marker = match outcome.provenance {
        Provenance::ScorerSuccess => "",
        Provenance::ScorerParsedFallback => "  [unreadable reply, heuristic score]",
        Provenance::ScorerUnreachableFallback => "  [unavailable, heuristic score]",
    };
    let _ = writeln!(
        out,
        "{} {}: {:.0}/10{}",
        outcome.icon, outcome.judge_name, outcome.overall, marker
    );
    let _ = writeln!(out, "   \"{}\"", outcome.verdict);
}

pub(crate) fn render_judges(config: &EngineConfig) -> String {
    let mut out = String::new();
    for judge in &config.judges {
        let keyed = config
            .provider(&judge.provider)
            .is_some_and(|p| p.api_key.is_some());
        let _ = writeln!(
            out,
            "{} {} ({})  {}/{}{}",
            judge.icon,
            judge.name,
            judge.id,
            judge.provider,
            judge.model,
            if keyed { "" } else { "  [no API key]" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapjudge_core::{Engine, FakeScorer};
    use std::sync::Arc;

    async fn offline_evaluation() -> Evaluation {
        let engine = Engine::new(EngineConfig::default(), Arc::new(FakeScorer::offline()));
        engine.evaluate("I came to win tonight").await.unwrap()
    }

    #[tokio::test]
    async fn text_report_marks_unavailable_judges() {
        let eval = offline_evaluation().await;
        let text = render_text(&eval, None);
        assert!(text.contains("OG Mike"));
        assert_eq!(text.matches("[unavailable, heuristic score]").count(), 4);
        assert!(text.contains(&format!("Grade: {}", eval.verdict.grade)));
        assert!(text.contains("Judges responding: 0/4"));
        assert!(text.contains("Tips:"));
    }

    #[tokio::test]
    async fn json_report_has_verdict_and_outcomes() {
        let eval = offline_evaluation().await;
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&eval, None).unwrap()).unwrap();
        assert_eq!(json["outcomes"].as_array().unwrap().len(), 4);
        assert_eq!(json["outcomes"][0]["provenance"], "scorer-unreachable-fallback");
        assert_eq!(json["verdict"]["grade"], eval.verdict.grade.as_str());
        assert!(json.get("record").is_none());
    }

    #[test]
    fn judges_without_keys_are_flagged() {
        let mut config = EngineConfig::default();
        for provider in config.providers.values_mut() {
            provider.api_key = None;
        }
        let listing = render_judges(&config);
        assert_eq!(listing.lines().count(), 4);
        assert!(listing.lines().all(|l| l.ends_with("[no API key]")));
    }
}

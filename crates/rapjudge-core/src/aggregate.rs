//! Combines per-judge outcomes into one verdict.
//!
//! Every outcome counts, whatever its provenance, so the aggregate is
//! computable even when every backend is down.

use serde::{Deserialize, Serialize};

use crate::heuristics;
use crate::model::{round1, AggregateVerdict, Category, CategoryMap, JudgeOutcome, DEFAULT_SCORE};

pub const MAX_STRENGTHS: usize = 4;
pub const MAX_IMPROVEMENTS: usize = 5;
pub const MIN_IMPROVEMENTS: usize = 3;

/// One rung of the letter ladder: scores at or above `min` get `letter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub min: f64,
    pub letter: String,
}

impl GradeBand {
    fn new(min: f64, letter: &str) -> Self {
        Self {
            min,
            letter: letter.to_string(),
        }
    }
}

pub fn default_grade_bands() -> Vec<GradeBand> {
    vec![
        GradeBand::new(9.5, "S"),
        GradeBand::new(9.0, "A+"),
        GradeBand::new(8.5, "A"),
        GradeBand::new(8.0, "A-"),
        GradeBand::new(7.5, "B+"),
        GradeBand::new(7.0, "B"),
        GradeBand::new(6.5, "B-"),
        GradeBand::new(6.0, "C+"),
        GradeBand::new(5.5, "C"),
        GradeBand::new(5.0, "C-"),
        GradeBand::new(4.0, "D"),
        GradeBand::new(0.0, "F"),
    ]
}

/// Ladder must be strictly descending and its last rung must cover 1.0.
pub fn validate_grade_bands(bands: &[GradeBand]) -> Result<(), String> {
    let last = bands.last().ok_or_else(|| "ladder is empty".to_string())?;
    if bands.iter().any(|b| !b.min.is_finite()) {
        return Err("thresholds must be finite".to_string());
    }
    if let Some(pair) = bands.windows(2).find(|w| w[0].min <= w[1].min) {
        return Err(format!(
            "thresholds must strictly descend: {} ({}) then {} ({})",
            pair[0].letter, pair[0].min, pair[1].letter, pair[1].min
        ));
    }
    if last.min > 1.0 {
        return Err(format!(
            "lowest band {} starts at {}; scores down to 1.0 must be covered",
            last.letter, last.min
        ));
    }
    Ok(())
}

/// Letter for an overall score. Bands must have passed validation.
pub fn grade_for(bands: &[GradeBand], score: f64) -> &str {
    bands
        .iter()
        .find(|b| score >= b.min)
        .or(bands.last())
        .map(|b| b.letter.as_str())
        .unwrap_or("F")
}

/// Six fixed bands keyed to the overall score.
pub fn verdict_message(score: f64) -> &'static str {
    if score >= 9.0 {
        "Legendary! That verse belongs in the hall of fame."
    } else if score >= 8.0 {
        "Fire! The panel is feeling those bars."
    } else if score >= 7.0 {
        "Solid performance with real moments of skill."
    } else if score >= 6.0 {
        "Decent verse. Some bars landed, others need work."
    } else if score >= 5.0 {
        "Work in progress. The potential is there."
    } else {
        "Back to the notebook. Keep writing and keep practicing."
    }
}

/// Fold all judge outcomes into one verdict. `text` is the judged text,
/// used to backfill improvements when the judges agree on too few.
pub fn aggregate(outcomes: &[JudgeOutcome], text: &str, bands: &[GradeBand]) -> AggregateVerdict {
    let categories = CategoryMap::from_fn(|category: Category| {
        mean(outcomes.iter().map(|o| f64::from(o.scores.get(category))))
    });
    let overall = mean(outcomes.iter().map(|o| o.overall));

    let strengths = dedup_capped(outcomes.iter().flat_map(|o| &o.strengths), MAX_STRENGTHS);
    let mut improvements = dedup_capped(outcomes.iter().flat_map(|o| &o.improve), MAX_IMPROVEMENTS);

    if improvements.len() < MIN_IMPROVEMENTS {
        for tip in heuristics::analyze(text).tips {
            if improvements.len() >= MAX_IMPROVEMENTS {
                break;
            }
            if !improvements.contains(&tip) {
                improvements.push(tip);
            }
        }
    }

    AggregateVerdict {
        categories,
        overall,
        grade: grade_for(bands, overall).to_string(),
        message: verdict_message(overall).to_string(),
        strengths,
        improvements,
        judges_total: outcomes.len(),
        judges_succeeded: outcomes.iter().filter(|o| o.provenance.is_success()).count(),
    }
}

/// Mean rounded to one decimal; 5.0 for an empty input.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        DEFAULT_SCORE
    } else {
        round1(sum / n as f64)
    }
}

/// Exact-string dedup preserving first occurrence.
fn dedup_capped<'a>(items: impl Iterator<Item = &'a String>, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if out.len() >= cap {
            break;
        }
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryScores, Provenance};

    fn outcome(overall: f64, improve: &[&str], strengths: &[&str]) -> JudgeOutcome {
        JudgeOutcome {
            judge_id: "j".into(),
            judge_name: "J".into(),
            icon: String::new(),
            scores: CategoryScores::from_fn(|_| overall.round() as u8),
            overall,
            verdict: "fine verse".into(),
            strengths: strengths.iter().map(|s| s.to_string()).collect(),
            improve: improve.iter().map(|s| s.to_string()).collect(),
            provenance: Provenance::ScorerSuccess,
        }
    }

    #[test]
    fn grade_ladder_boundaries() {
        let bands = default_grade_bands();
        validate_grade_bands(&bands).unwrap();
        assert_eq!(grade_for(&bands, 9.6), "S");
        assert_eq!(grade_for(&bands, 9.0), "A+");
        assert_eq!(grade_for(&bands, 7.0), "B");
        assert_eq!(grade_for(&bands, 6.9), "B-");
        assert_eq!(grade_for(&bands, 3.9), "F");
        assert_eq!(grade_for(&bands, 1.0), "F");
    }

    #[test]
    fn grade_ladder_is_monotonic() {
        let bands = default_grade_bands();
        let rank = |letter: &str| bands.iter().position(|b| b.letter == letter).unwrap();
        let mut prev = rank(grade_for(&bands, 1.0));
        for step in 10..=100 {
            let r = rank(grade_for(&bands, step as f64 / 10.0));
            assert!(r <= prev, "grade got worse at {}", step as f64 / 10.0);
            prev = r;
        }
    }

    #[test]
    fn rejects_bad_ladders() {
        assert!(validate_grade_bands(&[]).is_err());
        let unordered = vec![GradeBand::new(5.0, "C"), GradeBand::new(7.0, "B")];
        assert!(validate_grade_bands(&unordered).is_err());
        let gap = vec![GradeBand::new(7.0, "B"), GradeBand::new(3.0, "D")];
        assert!(validate_grade_bands(&gap).is_err());
    }

    #[test]
    fn message_bands() {
        assert!(verdict_message(9.2).starts_with("Legendary"));
        assert!(verdict_message(7.0).starts_with("Solid"));
        assert!(verdict_message(4.99).starts_with("Back to the notebook"));
    }

    #[test]
    fn averages_round_to_one_decimal() {
        let outcomes = vec![outcome(8.0, &[], &[]), outcome(6.0, &[], &[]), outcome(7.0, &[], &[])];
        let v = aggregate(&outcomes, "", &default_grade_bands());
        assert_eq!(v.overall, 7.0);
        assert_eq!(v.categories.flow, 7.0);
        assert_eq!(v.grade, "B");

        let outcomes = vec![outcome(8.0, &[], &[]), outcome(7.0, &[], &[]), outcome(7.0, &[], &[])];
        assert_eq!(aggregate(&outcomes, "", &default_grade_bands()).overall, 7.3);
    }

    #[test]
    fn empty_outcomes_default_to_five() {
        let v = aggregate(&[], "some text", &default_grade_bands());
        assert_eq!(v.overall, 5.0);
        assert_eq!(v.categories.technique, 5.0);
        assert_eq!(v.grade, "C-");
        assert_eq!(v.improvements.len(), heuristics::TIP_COUNT);
        assert_eq!(v.judges_total, 0);
    }

    #[test]
    fn duplicate_improvements_collapse() {
        let outcomes = vec![
            outcome(7.0, &["work on breath control", "a"], &["x"]),
            outcome(7.0, &["work on breath control", "b"], &["x", "y"]),
        ];
        let v = aggregate(&outcomes, "", &default_grade_bands());
        let count = v
            .improvements
            .iter()
            .filter(|s| *s == "work on breath control")
            .count();
        assert_eq!(count, 1);
        assert_eq!(v.improvements[..3], ["work on breath control", "a", "b"]);
        assert_eq!(v.strengths, vec!["x", "y"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let outcomes = vec![outcome(7.0, &["Rhyme more", "rhyme more", "RHYME MORE"], &[])];
        let v = aggregate(&outcomes, "", &default_grade_bands());
        assert_eq!(v.improvements.len(), 3);
    }

    #[test]
    fn lists_are_capped() {
        let improve = ["1", "2", "3", "4", "5", "6", "7"];
        let strengths = ["a", "b", "c", "d", "e"];
        let v = aggregate(&[outcome(7.0, &improve, &strengths)], "", &default_grade_bands());
        assert_eq!(v.improvements.len(), MAX_IMPROVEMENTS);
        assert_eq!(v.strengths.len(), MAX_STRENGTHS);
    }

    #[test]
    fn sparse_improvements_are_backfilled() {
        let v = aggregate(
            &[outcome(7.0, &["one tip"], &[])],
            "short verse here",
            &default_grade_bands(),
        );
        assert_eq!(v.improvements[0], "one tip");
        assert!(v.improvements.len() >= MIN_IMPROVEMENTS);
        assert!(v.improvements.len() <= MAX_IMPROVEMENTS);
        assert!(v.improvements.contains(&heuristics::TIP_DEVELOP.to_string()));
    }
}

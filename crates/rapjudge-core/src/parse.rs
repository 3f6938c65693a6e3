//! Scorer response parsing.
//!
//! Backends wrap their JSON in commentary, markdown fences and trailing
//! commas. Nothing past this module sees an unvalidated field: every number
//! is coerced and clamped, every string list filtered.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::model::{clamp_score, CategoryScores, ScoreRecord, DEFAULT_SCORE};

/// Extract a validated [`ScoreRecord`] from raw scorer output.
///
/// Every `{` is a candidate start, tried left to right, so an outer object is
/// tried before the objects nested inside it. A region that parses is
/// searched recursively and then skipped; a region that does not parse still
/// has its nested objects tried. Worst case is quadratic in the response
/// length, which `max_tokens` bounds.
pub fn parse(raw: &str) -> Result<ScoreRecord, ParseError> {
    let mut saw_object = false;
    let mut resume_at = 0;

    for (idx, ch) in raw.char_indices() {
        if ch != '{' || idx < resume_at {
            continue;
        }
        let Some(candidate) = balanced_object_from(raw, idx) else {
            continue;
        };
        let fixed = strip_trailing_commas(candidate);
        let Ok(value) = serde_json::from_str::<Value>(&fixed) else {
            continue;
        };
        saw_object = true;
        if let Some(obj) = find_score_object(&value) {
            return Ok(record_from_object(obj));
        }
        resume_at = idx + candidate.len();
    }

    if saw_object {
        Err(ParseError::MissingScores)
    } else {
        Err(ParseError::NoJsonObject)
    }
}

fn balanced_object_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop commas that directly precede `}` or `]`, ignoring string contents.
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// The shallowest object carrying a `scores` object.
fn find_score_object(value: &Value) -> Option<&Map<String, Value>> {
    let obj = value.as_object()?;
    if obj.get("scores").is_some_and(Value::is_object) {
        return Some(obj);
    }
    obj.values().find_map(find_score_object)
}

fn record_from_object(obj: &Map<String, Value>) -> ScoreRecord {
    let empty = Map::new();
    let scores_obj = obj.get("scores").and_then(Value::as_object).unwrap_or(&empty);

    let scores = CategoryScores::from_fn(|category| {
        let score = coerce_score(scores_obj.get(category.key()));
        score.round() as u8
    });

    ScoreRecord {
        scores,
        overall: coerce_score(obj.get("overall")),
        verdict: obj
            .get("verdict")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        strengths: string_list(obj.get("strengths")),
        improve: string_list(obj.get("improve")),
    }
}

/// Number or numeric string, clamped to [1, 10]; anything else is 5.
fn coerce_score(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => clamp_score(n),
        _ => DEFAULT_SCORE,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[test]
    fn tolerates_commentary_and_trailing_commas() {
        let raw = r#"Here you go: {"scores":{"flow":8,"lyrics":7,"delivery":8,"creativity":6,"technique":7,},"overall":7,"verdict":"Solid.","strengths":["clear theme"],"improve":["tighten transitions"]} Thanks!"#;
        let rec = parse(raw).unwrap();
        assert_eq!(rec.overall, 7.0);
        assert_eq!(rec.scores.get(Category::Flow), 8);
        assert_eq!(rec.scores.get(Category::Creativity), 6);
        assert_eq!(rec.verdict, "Solid.");
        assert_eq!(rec.strengths, vec!["clear theme"]);
        assert_eq!(rec.improve, vec!["tighten transitions"]);
    }

    #[test]
    fn clamps_and_defaults_fields() {
        let raw = r#"{"scores":{"flow":14,"lyrics":-2,"delivery":"9","creativity":"lots"},"overall":"n/a"}"#;
        let rec = parse(raw).unwrap();
        assert_eq!(rec.scores.get(Category::Flow), 10);
        assert_eq!(rec.scores.get(Category::Lyrics), 1);
        assert_eq!(rec.scores.get(Category::Delivery), 9);
        assert_eq!(rec.scores.get(Category::Creativity), 5);
        assert_eq!(rec.scores.get(Category::Technique), 5);
        assert_eq!(rec.overall, 5.0);
        assert!(rec.verdict.is_empty());
        assert!(rec.strengths.is_empty());
    }

    #[test]
    fn filters_non_string_and_empty_entries() {
        let raw = r#"{"scores":{},"strengths":["ok", "", 3, null, "  "],"improve":[{"x":1},"breath"]}"#;
        let rec = parse(raw).unwrap();
        assert_eq!(rec.strengths, vec!["ok"]);
        assert_eq!(rec.improve, vec!["breath"]);
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_extraction() {
        let raw = "```json\n{\"verdict\":\"a } tricky, }\",\"scores\":{\"flow\":6,},\"overall\":6}\n```";
        let rec = parse(raw).unwrap();
        assert_eq!(rec.verdict, "a } tricky, }");
        assert_eq!(rec.scores.get(Category::Flow), 6);
    }

    #[test]
    fn finds_nested_score_object() {
        let raw = r#"{"result":{"scores":{"flow":9},"overall":9}}"#;
        let rec = parse(raw).unwrap();
        assert_eq!(rec.overall, 9.0);
        assert_eq!(rec.scores.get(Category::Flow), 9);
    }

    #[test]
    fn skips_broken_leading_region() {
        let raw = r#"I think {this is not json} but {"scores":{"lyrics":8},"overall":8}"#;
        assert_eq!(parse(raw).unwrap().scores.get(Category::Lyrics), 8);
    }

    #[test]
    fn finds_score_object_after_many_draft_regions() {
        let mut raw = String::from("<think>");
        for i in 0..20 {
            raw.push_str(&format!(" option {{\"draft\":{i}}}"));
            raw.push_str(r#" template {"scores": {"flow": <1-10>}, "overall": <1-10>}"#);
        }
        raw.push_str(r#"</think> {"scores":{"flow":9},"overall":9,"verdict":"Strong bars."}"#);

        let rec = parse(&raw).unwrap();
        assert_eq!(rec.overall, 9.0);
        assert_eq!(rec.scores.get(Category::Flow), 9);
        assert_eq!(rec.verdict, "Strong bars.");
    }

    #[test]
    fn parsed_object_without_scores_is_skipped_whole() {
        let raw = r#"{"note":{"hint":"x"}} then {"scores":{"lyrics":4},"overall":4}"#;
        assert_eq!(parse(raw).unwrap().scores.get(Category::Lyrics), 4);
    }

    #[test]
    fn reports_missing_scores() {
        assert_eq!(
            parse(r#"{"score": 7, "comment": "nice"}"#),
            Err(ParseError::MissingScores)
        );
        assert_eq!(
            parse(r#"{"scores": [7, 8]}"#),
            Err(ParseError::MissingScores)
        );
    }

    #[test]
    fn reports_no_json() {
        assert_eq!(parse("Great verse, 8/10"), Err(ParseError::NoJsonObject));
        assert_eq!(parse(""), Err(ParseError::NoJsonObject));
        assert_eq!(parse("{ unterminated"), Err(ParseError::NoJsonObject));
    }
}

//! Lexical fallback analysis.
//!
//! Pure function of the input text. Used whenever a judge cannot be trusted
//! so no judge ever comes back empty-handed.

use std::collections::HashSet;

use serde::Serialize;

/// Number of tips every analysis returns.
pub const TIP_COUNT: usize = 3;

const FILLER_WORDS: [&str; 5] = ["like", "um", "uh", "yeah", "yo"];
const MAX_FILLERS: usize = 3;
const SHORT_VERSE_TOKENS: usize = 20;
const LONG_VERSE_TOKENS: usize = 50;
const MIN_VOCAB_RATIO: f64 = 0.5;

pub const TIP_VOCABULARY: &str =
    "Expand your vocabulary: vary your word choice and avoid repeating yourself";
pub const TIP_DEVELOP: &str =
    "Develop your verse further: give the ideas more bars to build momentum";
pub const TIP_FILLER: &str =
    "Cut the filler words (like, um, yeah): every word should earn its place";

pub const STRENGTH_VOCABULARY: &str = "Good vocabulary variety";
pub const STRENGTH_LENGTH: &str = "Delivered a verse with real length and substance";

const DEFAULT_STRENGTHS: [&str; 2] = ["Showed confidence", "Completed a full verse"];

const GENERIC_TIPS: [&str; 7] = [
    "Work more internal rhymes into your lines",
    "Use metaphors and similes to paint pictures",
    "Try switching up your flow to keep listeners engaged",
    "Build up to punchlines that land at the end of a bar",
    "Experiment with multisyllabic rhymes",
    "Keep the verse tied to one clear theme",
    "Work on breath control so the bars stay tight",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub tips: Vec<String>,
    pub strengths: Vec<String>,
}

/// Derive tips and strengths from lexical statistics of `text`.
pub fn analyze(text: &str) -> Analysis {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let mut tips: Vec<String> = Vec::new();
    let mut strengths: Vec<String> = Vec::new();

    // No tokens reads as zero variety.
    let unique: HashSet<&str> = tokens.iter().copied().collect();
    let vocab_ratio = if tokens.is_empty() {
        0.0
    } else {
        unique.len() as f64 / tokens.len() as f64
    };
    if vocab_ratio < MIN_VOCAB_RATIO {
        tips.push(TIP_VOCABULARY.to_string());
    } else {
        strengths.push(STRENGTH_VOCABULARY.to_string());
    }

    if tokens.len() < SHORT_VERSE_TOKENS {
        tips.push(TIP_DEVELOP.to_string());
    } else if tokens.len() > LONG_VERSE_TOKENS {
        strengths.push(STRENGTH_LENGTH.to_string());
    }

    let fillers = tokens.iter().filter(|t| is_filler(t)).count();
    if fillers > MAX_FILLERS {
        tips.push(TIP_FILLER.to_string());
    }

    for generic in GENERIC_TIPS {
        if tips.len() >= TIP_COUNT {
            break;
        }
        if !tips.iter().any(|t| t == generic) {
            tips.push(generic.to_string());
        }
    }

    if strengths.is_empty() {
        strengths = DEFAULT_STRENGTHS.iter().map(|s| s.to_string()).collect();
    }

    Analysis { tips, strengths }
}

/// Filler match ignores surrounding punctuation ("like," counts).
fn is_filler(token: &str) -> bool {
    let word = token.trim_matches(|c: char| !c.is_alphanumeric());
    FILLER_WORDS.contains(&word)
}

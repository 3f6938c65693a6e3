use serde::{Deserialize, Serialize};

/// Lowest score any judge may give.
pub const MIN_SCORE: f64 = 1.0;
/// Highest score any judge may give.
pub const MAX_SCORE: f64 = 10.0;
/// Score used when a field is missing or not a number.
pub const DEFAULT_SCORE: f64 = 5.0;

/// The closed set of scoring categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Flow,
    Lyrics,
    Delivery,
    Creativity,
    Technique,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Flow,
        Category::Lyrics,
        Category::Delivery,
        Category::Creativity,
        Category::Technique,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Flow => "flow",
            Category::Lyrics => "lyrics",
            Category::Delivery => "delivery",
            Category::Creativity => "creativity",
            Category::Technique => "technique",
        }
    }
}

/// One value per category. Serializes as a JSON object keyed by category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryMap<T> {
    pub flow: T,
    pub lyrics: T,
    pub delivery: T,
    pub creativity: T,
    pub technique: T,
}

impl<T: Copy> CategoryMap<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            flow: f(Category::Flow),
            lyrics: f(Category::Lyrics),
            delivery: f(Category::Delivery),
            creativity: f(Category::Creativity),
            technique: f(Category::Technique),
        }
    }

    pub fn get(&self, category: Category) -> T {
        match category {
            Category::Flow => self.flow,
            Category::Lyrics => self.lyrics,
            Category::Delivery => self.delivery,
            Category::Creativity => self.creativity,
            Category::Technique => self.technique,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Integer category scores, each in [1, 10].
pub type CategoryScores = CategoryMap<u8>;

impl CategoryScores {
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.iter().map(|(_, s)| f64::from(s)).sum();
        sum / Category::ALL.len() as f64
    }
}

/// Where a judge outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Backend answered with a usable score object.
    ScorerSuccess,
    /// Backend answered but the payload was unusable; synthesized.
    ScorerParsedFallback,
    /// Backend could not be reached; synthesized.
    ScorerUnreachableFallback,
}

impl Provenance {
    pub fn is_success(&self) -> bool {
        matches!(self, Provenance::ScorerSuccess)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::ScorerSuccess => "scorer-success",
            Provenance::ScorerParsedFallback => "scorer-parsed-fallback",
            Provenance::ScorerUnreachableFallback => "scorer-unreachable-fallback",
        }
    }
}

/// Validated score record extracted from a scorer's raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub scores: CategoryScores,
    pub overall: f64,
    pub verdict: String,
    pub strengths: Vec<String>,
    pub improve: Vec<String>,
}

/// One judge's opinion for one evaluation. Always populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeOutcome {
    pub judge_id: String,
    pub judge_name: String,
    pub icon: String,
    pub scores: CategoryScores,
    pub overall: f64,
    pub verdict: String,
    pub strengths: Vec<String>,
    pub improve: Vec<String>,
    pub provenance: Provenance,
}

/// Final combined result for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateVerdict {
    pub categories: CategoryMap<f64>,
    pub overall: f64,
    pub grade: String,
    pub message: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub judges_total: usize,
    pub judges_succeeded: usize,
}

/// Clamp a score into [1, 10].
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

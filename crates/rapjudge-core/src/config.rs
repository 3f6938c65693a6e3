//! Engine configuration: providers, judge panel, timeouts and grade ladder.
//!
//! Built once at process start and shared read-only (`Arc<EngineConfig>`).
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `FEATHERLESS_API_KEY` | Key for the built-in Featherless provider |
//! | `K2_API_KEY` | Key for the built-in K2 Think provider |
//! | `RAPJUDGE_TIMEOUT_SECS` | Per-call timeout in seconds (default: 30) |
//! | `RAPJUDGE_RETRIES` | Extra attempts on transient failures (default: 0) |

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregate::GradeBand;
use crate::error::ConfigError;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// A chat-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Chat-completion endpoint URL.
    pub url: String,

    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Inline API key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key_env: None,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Fill `api_key` from `api_key_env` if not set inline. Empty counts as absent.
    fn resolve_key(&mut self) {
        let inline = self.api_key.take().filter(|k| !k.trim().is_empty());
        self.api_key = inline.or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|k| !k.trim().is_empty())
        });
    }
}

/// Persona-flavored one-liners, one per score band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictTable {
    pub high: String,
    pub mid: String,
    pub low: String,
}

impl Default for VerdictTable {
    fn default() -> Self {
        Self {
            high: "Strong verse. The panel felt that one.".to_string(),
            mid: "Some real moments in there, keep sharpening.".to_string(),
            low: "Not there yet. Back to the notebook.".to_string(),
        }
    }
}

impl VerdictTable {
    /// `high` at 7 and above, `mid` at 5 and above, `low` below.
    pub fn pick(&self, score: f64) -> &str {
        if score >= 7.0 {
            &self.high
        } else if score >= 5.0 {
            &self.mid
        } else {
            &self.low
        }
    }
}

/// One configured judge. Immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// Key into [`EngineConfig::providers`].
    pub provider: String,
    pub model: String,
    pub persona: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub verdicts: VerdictTable,
}

fn default_max_tokens() -> u32 {
    400
}

fn default_timeout() -> u64 {
    30
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Per scorer call, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts on retryable transport failures.
    #[serde(default)]
    pub retries: u32,

    pub providers: BTreeMap<String, ProviderConfig>,

    pub judges: Vec<JudgeDefinition>,

    /// Letter ladder override, highest band first.
    #[serde(default = "crate::aggregate::default_grade_bands")]
    pub grades: Vec<GradeBand>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "featherless".to_string(),
            ProviderConfig::new("https://api.featherless.ai/v1/chat/completions")
                .with_api_key_env("FEATHERLESS_API_KEY"),
        );
        providers.insert(
            "k2".to_string(),
            ProviderConfig::new("https://api.k2think.ai/v1/chat/completions")
                .with_api_key_env("K2_API_KEY"),
        );

        Self {
            version: SUPPORTED_CONFIG_VERSION,
            timeout_secs: default_timeout(),
            retries: 0,
            providers,
            judges: builtin_judges(),
            grades: crate::aggregate::default_grade_bands(),
        }
    }
}

impl EngineConfig {
    /// Built-in panel with keys and overrides taken from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().finish()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Apply env overrides, resolve API keys and validate.
    pub fn finish(mut self) -> Result<Self, ConfigError> {
        if let Some(secs) = env_parse("RAPJUDGE_TIMEOUT_SECS") {
            self.timeout_secs = secs;
        }
        if let Some(retries) = env_parse("RAPJUDGE_RETRIES") {
            self.retries = retries;
        }
        for provider in self.providers.values_mut() {
            provider.resolve_key();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: SUPPORTED_CONFIG_VERSION,
            });
        }

        let mut seen = HashSet::new();
        for judge in &self.judges {
            if !seen.insert(judge.id.as_str()) {
                return Err(ConfigError::DuplicateJudge(judge.id.clone()));
            }
            if !self.providers.contains_key(&judge.provider) {
                return Err(ConfigError::UnknownProvider {
                    judge: judge.id.clone(),
                    provider: judge.provider.clone(),
                });
            }
        }

        crate::aggregate::validate_grade_bands(&self.grades).map_err(ConfigError::GradeLadder)
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.trim().parse().ok())
}

/// Load a YAML config file, resolve keys and validate it.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: EngineConfig = serde_yaml::from_str(&raw)?;
    cfg.finish()
}

fn builtin_judges() -> Vec<JudgeDefinition> {
    vec![
        JudgeDefinition {
            id: "og".to_string(),
            name: "OG Mike".to_string(),
            icon: "🎤".to_string(),
            provider: "featherless".to_string(),
            model: "deepseek-ai/DeepSeek-V3-0324".to_string(),
            persona: "You are OG Mike, a veteran battle rap judge from the 90s hip-hop scene. \
                      You value old-school lyricism, complex rhyme schemes, and raw authenticity. \
                      You're tough but fair, and you appreciate bars that would make Rakim proud."
                .to_string(),
            max_tokens: default_max_tokens(),
            verdicts: VerdictTable {
                high: "That's real hip-hop right there. Rakim would nod.".to_string(),
                mid: "You got the foundation, now build the house.".to_string(),
                low: "Back in my day we'd send you home. Study the greats.".to_string(),
            },
        },
        JudgeDefinition {
            id: "tech".to_string(),
            name: "DJ Neural".to_string(),
            icon: "🤖".to_string(),
            provider: "featherless".to_string(),
            model: "meta-llama/Llama-3.3-70B-Instruct".to_string(),
            persona: "You are DJ Neural, a modern hip-hop analyst who breaks down rap technically. \
                      You focus on syllable patterns, internal rhymes, flow switches, and delivery precision. \
                      You appreciate innovative wordplay and technical mastery."
                .to_string(),
            max_tokens: default_max_tokens(),
            verdicts: VerdictTable {
                high: "Syllable density and scheme work check out. Clean execution.".to_string(),
                mid: "Patterns are there but the schemes need more layers.".to_string(),
                low: "Rhyme structure breaks down. Map your syllables first.".to_string(),
            },
        },
        JudgeDefinition {
            id: "street".to_string(),
            name: "Queen Bars".to_string(),
            icon: "👑".to_string(),
            provider: "featherless".to_string(),
            model: "Qwen/Qwen2.5-72B-Instruct".to_string(),
            persona: "You are Queen Bars, a fierce battle rap queen who's seen thousands of battles. \
                      You value confidence, stage presence, crowd engagement, and memorable punchlines. \
                      You know what makes the crowd go \"OHHH!\" and judge accordingly."
                .to_string(),
            max_tokens: default_max_tokens(),
            verdicts: VerdictTable {
                high: "The crowd would be losing it. You owned that stage.".to_string(),
                mid: "A few bars landed, but you need more punch to win the room.".to_string(),
                low: "The crowd went quiet. Come with more fire next time.".to_string(),
            },
        },
        JudgeDefinition {
            id: "prof".to_string(),
            name: "The Professor".to_string(),
            icon: "🧠".to_string(),
            provider: "k2".to_string(),
            model: "MBZUAI-IFM/K2-Think-v2".to_string(),
            persona: "You are The Professor, a legendary rap battle judge with decades of experience \
                      in hip-hop culture. You give brief, punchy feedback like a real battle rap judge."
                .to_string(),
            max_tokens: 2000,
            verdicts: VerdictTable {
                high: "Top of the class. That verse earns its grade.".to_string(),
                mid: "Passing marks, but the thesis needs sharper evidence.".to_string(),
                low: "Incomplete. Revise the draft and resubmit.".to_string(),
            },
        },
    ]
}

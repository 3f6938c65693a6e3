use serde::Serialize;

use crate::config::JudgeDefinition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

pub(crate) const RUBRIC: &str = r#"Grade this rap performance on a scale of 1-10 in each category:
- flow: rhythm, timing and smoothness
- lyrics: wordplay, punchlines and clever bars
- delivery: confidence and presence
- creativity: originality and concepts
- technique: rhyme schemes, multisyllabics and breath control

Respond with ONLY this JSON, no other text:
{"scores": {"flow": <1-10>, "lyrics": <1-10>, "delivery": <1-10>, "creativity": <1-10>, "technique": <1-10>}, "overall": <1-10>, "verdict": "<one punchy sentence in your character's voice>", "strengths": ["<strength>", "..."], "improve": ["<specific tip>", "..."]}"#;

/// Persona + rubric as system message, the performance as user message.
pub fn build_messages(judge: &JudgeDefinition, text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!("{}\n\n{}", judge.persona.trim(), RUBRIC)),
        ChatMessage::user(format!("Grade this performance:\n\n\"{}\"", text)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn messages_carry_persona_rubric_and_text() {
        let cfg = EngineConfig::default();
        let msgs = build_messages(&cfg.judges[0], "bars bars bars");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert!(msgs[0].content.starts_with("You are OG Mike"));
        assert!(msgs[0].content.contains("\"technique\""));
        assert_eq!(msgs[1].role, "user");
        assert!(msgs[1].content.ends_with("\"bars bars bars\""));
    }
}

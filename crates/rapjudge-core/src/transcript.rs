//! Accumulates transcription events into the text handed to the engine.

/// Event from a streaming transcription source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Ephemeral text, replaced by the next event.
    Partial(String),
    /// Final text, appended.
    Committed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    committed: String,
    partial: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: TranscriptEvent) {
        match event {
            TranscriptEvent::Partial(text) => self.partial = text,
            TranscriptEvent::Committed(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    if !self.committed.is_empty() {
                        self.committed.push(' ');
                    }
                    self.committed.push_str(text);
                }
                self.partial.clear();
            }
        }
    }

    /// The only text ever evaluated.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Committed text followed by any in-flight partial.
    pub fn display(&self) -> String {
        match (self.committed.is_empty(), self.partial.is_empty()) {
            (_, true) => self.committed.clone(),
            (true, false) => self.partial.clone(),
            (false, false) => format!("{} {}", self.committed, self.partial),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.partial.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_segments_join_with_single_space() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::Partial("I got".into()));
        assert_eq!(buf.display(), "I got");
        assert!(buf.is_empty());

        buf.apply(TranscriptEvent::Committed(" I got bars ".into()));
        buf.apply(TranscriptEvent::Partial("for".into()));
        assert_eq!(buf.display(), "I got bars for");

        buf.apply(TranscriptEvent::Committed("for days".into()));
        assert_eq!(buf.committed(), "I got bars for days");
        assert_eq!(buf.display(), "I got bars for days");
    }

    #[test]
    fn segment_padding_collapses_to_one_separator() {
        let mut buf = TranscriptBuffer::new();
        for segment in ["one", "  two ", "   ", "\tthree\n"] {
            buf.apply(TranscriptEvent::Committed(segment.to_string()));
        }
        assert_eq!(buf.committed(), "one two three");
    }

    #[test]
    fn partial_never_reaches_committed_text() {
        let mut buf = TranscriptBuffer::new();
        buf.apply(TranscriptEvent::Committed("one".into()));
        buf.apply(TranscriptEvent::Partial("two".into()));
        assert_eq!(buf.committed(), "one");
        buf.clear();
        assert_eq!(buf.display(), "");
    }
}

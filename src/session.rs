//! Word buffer and per-process session context

use crate::recognition::DetectionResult;

/// Letters assembled so far, in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBuffer {
    chars: Vec<char>,
}

impl WordBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { chars: Vec::new() }
    }

    /// Append every character of `text` in order
    pub fn push_str(&mut self, text: &str) {
        self.chars.extend(text.chars());
    }

    /// Append a single space
    pub fn push_space(&mut self) {
        self.chars.push(' ');
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Concatenated string form
    #[must_use]
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

/// State shared by every request against one server
///
/// Holds the word being spelled and the outcome of the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct Session {
    word: WordBuffer,
    last_detection: DetectionResult,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn last_detection(&self) -> &DetectionResult {
        &self.last_detection
    }

    /// Replace the last detection, accepted or not
    pub fn record_detection(&mut self, result: DetectionResult) {
        self.last_detection = result;
    }

    #[must_use]
    pub const fn word(&self) -> &WordBuffer {
        &self.word
    }

    /// Append `explicit`, or the last detected letter when `None`
    ///
    /// Returns the resolved text, which is empty when nothing was appended.
    pub fn add_char(&mut self, explicit: Option<&str>) -> String {
        let resolved = explicit
            .unwrap_or(&self.last_detection.character)
            .to_string();
        if !resolved.is_empty() {
            self.word.push_str(&resolved);
        }
        resolved
    }

    pub fn add_space(&mut self) {
        self.word.push_space();
    }

    /// Empty the word and forget the last detection
    pub fn clear(&mut self) {
        self.word.clear();
        self.last_detection = DetectionResult::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(c: &str) -> DetectionResult {
        DetectionResult {
            character: c.to_string(),
            confidence: 0.9,
            message: None,
        }
    }

    #[test]
    fn new_session_is_empty() {
        let session = Session::new();
        assert!(session.word().is_empty());
        assert_eq!(session.last_detection(), &DetectionResult::empty());
    }

    #[test]
    fn add_char_defaults_to_last_detection() {
        let mut session = Session::new();
        session.record_detection(detected("B"));

        assert_eq!(session.add_char(None), "B");
        assert_eq!(session.add_char(None), "B");
        assert_eq!(session.word().as_string(), "BB");
    }

    #[test]
    fn explicit_char_overrides_detection() {
        let mut session = Session::new();
        session.record_detection(detected("B"));

        assert_eq!(session.add_char(Some("Q")), "Q");
        assert_eq!(session.word().as_string(), "Q");
    }

    #[test]
    fn explicit_empty_char_never_changes_word() {
        let mut session = Session::new();
        session.record_detection(detected("B"));
        session.add_char(Some("X"));

        for _ in 0..3 {
            assert_eq!(session.add_char(Some("")), "");
        }
        assert_eq!(session.word().as_string(), "X");
    }

    #[test]
    fn rejected_detection_adds_nothing() {
        let mut session = Session::new();
        session.record_detection(DetectionResult::no_landmarks());

        assert_eq!(session.add_char(None), "");
        assert!(session.word().is_empty());
    }

    #[test]
    fn spaces_and_letters_interleave() {
        let mut session = Session::new();
        session.add_char(Some("H"));
        session.add_space();
        session.add_char(Some("I"));

        assert_eq!(session.word().as_string(), "H I");
        assert_eq!(session.word().len(), 3);
    }

    #[test]
    fn multi_char_input_appends_each_char() {
        let mut buffer = WordBuffer::new();
        buffer.push_str("AB");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.as_string(), "AB");
    }

    #[test]
    fn clear_is_absorbing() {
        let mut session = Session::new();
        session.record_detection(detected("Z"));
        session.add_char(None);
        session.add_space();

        session.clear();

        assert_eq!(session.word().as_string(), "");
        assert_eq!(session.last_detection(), &DetectionResult::empty());
        assert_eq!(session.add_char(None), "");
        assert!(session.word().is_empty());
    }
}

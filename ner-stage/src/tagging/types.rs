//! Token and block types shared by the batcher, backends and aligner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One word occurrence produced by the upstream pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// The word text
    pub word: String,
    /// Index of the instruction (sentence, command) this word belongs to
    pub instruction_number: usize,
    /// NER label, unset until the stage has run
    #[serde(default)]
    pub ner: Option<String>,
}

impl Token {
    /// Create an untagged token.
    pub fn new(word: impl Into<String>, instruction_number: usize) -> Self {
        Self {
            word: word.into(),
            instruction_number,
            ner: None,
        }
    }

    /// Set the NER label.
    pub fn with_ner(mut self, label: impl Into<String>) -> Self {
        self.ner = Some(label.into());
        self
    }
}

/// One candidate token sequence, tagged independently of other hypotheses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Hypothesis {
    pub tokens: Vec<Token>,
}

impl Hypothesis {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Build a hypothesis from `(word, instruction_number)` pairs.
    pub fn from_words(words: &[(&str, usize)]) -> Self {
        Self {
            tokens: words
                .iter()
                .map(|(word, instruction)| Token::new(*word, *instruction))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Labels currently assigned to the tokens, in order.
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.tokens.iter().map(|t| t.ner.as_deref()).collect()
    }
}

impl From<Vec<Token>> for Hypothesis {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

/// Words submitted to the tagger as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    words: Vec<String>,
}

impl TextBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, word: impl Into<String>) {
        self.words.push(word.into());
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Every word followed by a single space, e.g. `"Open the door "`.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.words.iter().map(|w| w.len() + 1).sum());
        for word in &self.words {
            text.push_str(word);
            text.push(' ');
        }
        text
    }

    /// The newline-terminated form written to the tagger's input file.
    pub fn render(&self) -> String {
        let mut text = self.text();
        text.push('\n');
        text
    }
}

impl<S: Into<String>> FromIterator<S> for TextBlock {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// A word and the label the tagger assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedWord {
    pub word: String,
    pub label: String,
}

impl TaggedWord {
    pub fn new(word: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            label: label.into(),
        }
    }
}

/// Ordered tagger output for one block.
pub type TaggingResult = Vec<TaggedWord>;

/// Data handed over by the host pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrePipelineData {
    /// Tokenised hypotheses, absent when an earlier stage did not provide them
    #[serde(default)]
    pub tagged_hypotheses: Option<Vec<Hypothesis>>,
}

impl PrePipelineData {
    pub fn with_hypotheses(hypotheses: Vec<Hypothesis>) -> Self {
        Self {
            tagged_hypotheses: Some(hypotheses),
        }
    }

    /// Parse host data from JSON; malformed input is reported as unavailable data.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            crate::NerError::DataUnavailable(format!("Pipeline data unreadable: {}", e))
        })
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::NerError::DataUnavailable(format!("Pipeline data not serializable: {}", e))
        })
    }

    /// Borrow the hypotheses mutably, failing when none were provided.
    pub fn hypotheses_mut(&mut self) -> crate::Result<&mut Vec<Hypothesis>> {
        self.tagged_hypotheses.as_mut().ok_or_else(|| {
            crate::NerError::DataUnavailable("No tagged hypotheses provided".to_string())
        })
    }
}

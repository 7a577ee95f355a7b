//! # ner-stage
//!
//! A pipeline stage that attaches named-entity labels to tokens by handing
//! them to an external tagger (SENNA by default) through temporary text files
//! and aligning the tagger's answers back onto the tokens by position.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ner_stage::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::new()
//!         .with_parse_per_instruction(true)
//!         .with_program("/opt/senna/senna")
//!         .with_working_dir("/opt/senna")
//!         .build()?;
//!
//!     let stage = NerStage::from_config(&config)?;
//!
//!     let mut hypotheses = vec![Hypothesis::from_words(&[
//!         ("Open", 0),
//!         ("the", 0),
//!         ("door", 0),
//!         ("Close", 1),
//!         ("it", 1),
//!     ])];
//!
//!     stage.tag_hypotheses(&mut hypotheses).await?;
//!
//!     for token in &hypotheses[0].tokens {
//!         println!("{} -> {:?}", token.word, token.ner);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Batcher**: splits a hypothesis into one text block per instruction, or
//!   a single block for the whole hypothesis.
//! - **Backend**: anything implementing [`tagging::NerBackend`]; the default
//!   [`tagging::ProcessTagger`] runs an external program over a temp file.
//! - **Aligner**: writes each returned label onto the token at the same
//!   position, refusing results whose length differs from the input.

pub mod config;
pub mod logging;
pub mod tagging;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::config::{
        ConfigBuilder, ConfigLoader, InputMode, LogFormat, LogLevel, LoggingConfig, NerConfig,
        TaggerConfig,
    };

    pub use crate::tagging::{
        EntityKind, EntitySpan, Hypothesis, NerBackend, NerLabel, NerStage, PrePipelineData,
        ProcessTagger, StageConfig, TaggedWord, TaggingResult, TextBlock, Token, ToolError,
        entity_spans,
    };

    pub use crate::{NerError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for the NER stage.
///
/// Every variant is fatal for the stage run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum NerError {
    /// Upstream pipeline data missing or of unexpected shape
    #[error("Pipeline data unavailable: {0}")]
    DataUnavailable(String),

    /// A hypothesis without tokens was handed to the stage
    #[error("Hypothesis {hypothesis} contains no tokens")]
    EmptyHypothesis { hypothesis: usize },

    /// The external tagger failed for a block
    #[error("External tagger failed on hypothesis {hypothesis}, block {block}: {source}")]
    ExternalTool {
        hypothesis: usize,
        block: usize,
        #[source]
        source: tagging::ToolError,
    },

    /// Tagger output length differs from the number of input tokens
    #[error(
        "Tagger result and hypothesis {hypothesis}{} differ in length: expected {expected} labels, got {actual}",
        block_suffix(.block)
    )]
    AlignmentMismatch {
        hypothesis: usize,
        block: Option<usize>,
        expected: usize,
        actual: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),
}

fn block_suffix(block: &Option<usize>) -> String {
    match block {
        Some(b) => format!(" (block {b})"),
        None => String::new(),
    }
}

impl From<crate::config::ConfigError> for NerError {
    fn from(err: crate::config::ConfigError) -> Self {
        NerError::Configuration(err.to_string())
    }
}

/// Result type for stage operations
pub type Result<T> = std::result::Result<T, NerError>;

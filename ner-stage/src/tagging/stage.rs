//! The NER pipeline stage: batch, tag, align.

use super::{Hypothesis, NerBackend, PrePipelineData, ProcessTagger, TaggingResult, aligner, batcher};
use crate::config::{NerConfig, validate_config};
use crate::{NerError, Result};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, error, info};

/// Identifier of this stage within a host pipeline
pub const STAGE_ID: &str = "ner";

/// Name of the token attribute written by this stage
pub const NER_ATTRIBUTE_NAME: &str = "ner";

/// Runtime settings of the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageConfig {
    /// Tag each instruction as its own block
    pub parse_per_instruction: bool,
    /// Hypotheses tagged at the same time
    pub max_concurrent_hypotheses: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            parse_per_instruction: false,
            max_concurrent_hypotheses: 1,
        }
    }
}

impl From<&NerConfig> for StageConfig {
    fn from(config: &NerConfig) -> Self {
        Self {
            parse_per_instruction: config.parse_per_instruction,
            max_concurrent_hypotheses: config.max_concurrent_hypotheses,
        }
    }
}

/// Attaches NER labels to the tokens of every hypothesis.
pub struct NerStage {
    backend: Box<dyn NerBackend>,
    config: StageConfig,
}

impl std::fmt::Debug for NerStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NerStage")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl NerStage {
    /// Create a new stage builder
    pub fn builder() -> NerStageBuilder {
        NerStageBuilder::new()
    }

    /// Create a stage running the configured external tagger.
    pub fn from_config(config: &NerConfig) -> Result<Self> {
        validate_config(config)?;

        Self::builder()
            .backend(Box::new(ProcessTagger::new(config.tagger.clone())))
            .config(config.into())
            .build()
    }

    pub fn id(&self) -> &'static str {
        STAGE_ID
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run the stage on data handed over by the host pipeline.
    pub async fn exec(&self, data: &mut PrePipelineData) -> Result<()> {
        let hypotheses = data.hypotheses_mut().inspect_err(|e| {
            error!(error = %e, "No tagged hypotheses provided");
        })?;

        self.tag_hypotheses(hypotheses).await
    }

    /// Tag every hypothesis and write the labels onto its tokens.
    ///
    /// All hypotheses are tagged and checked before any token is written, so
    /// on error every token is left as it was.
    pub async fn tag_hypotheses(&self, hypotheses: &mut [Hypothesis]) -> Result<()> {
        if self.config.parse_per_instruction {
            info!(
                hypotheses = hypotheses.len(),
                "parsing NER for each instruction independently"
            );
        } else {
            info!(hypotheses = hypotheses.len(), "parsing NER without instructions");
        }

        let results: Vec<TaggingResult> = stream::iter(hypotheses.iter().enumerate())
            .map(|(index, hypothesis)| self.parse(index, hypothesis))
            .buffered(self.config.max_concurrent_hypotheses)
            .try_collect()
            .await
            .inspect_err(|e| log_failure(e))?;

        for (index, (hypothesis, result)) in hypotheses.iter().zip(&results).enumerate() {
            aligner::check(&hypothesis.tokens, result, index).inspect_err(|e| log_failure(e))?;
        }

        for (index, (hypothesis, result)) in hypotheses.iter_mut().zip(&results).enumerate() {
            aligner::align(&mut hypothesis.tokens, result, index)?;
        }

        debug!(hypotheses = hypotheses.len(), "NER labels assigned");
        Ok(())
    }

    /// Batch one hypothesis and tag its blocks in order.
    ///
    /// Returns the concatenated tagger output; each block's output must have
    /// exactly as many entries as the block has words.
    pub async fn parse(&self, index: usize, hypothesis: &Hypothesis) -> Result<TaggingResult> {
        let blocks = batcher::batch(&hypothesis.tokens, self.config.parse_per_instruction, index)?;
        let mut result = Vec::with_capacity(hypothesis.len());

        for (block_index, block) in blocks.iter().enumerate() {
            debug!(
                hypothesis = index,
                block = block_index,
                words = block.len(),
                backend = self.backend.name(),
                "tagging block"
            );

            let tagged = self
                .backend
                .tag(block)
                .await
                .map_err(|source| NerError::ExternalTool {
                    hypothesis: index,
                    block: block_index,
                    source,
                })?;

            if tagged.len() != block.len() {
                return Err(NerError::AlignmentMismatch {
                    hypothesis: index,
                    block: Some(block_index),
                    expected: block.len(),
                    actual: tagged.len(),
                });
            }

            result.extend(tagged);
        }

        Ok(result)
    }
}

fn log_failure(err: &NerError) {
    match err {
        NerError::ExternalTool { .. } => error!(error = %err, "The external tagger failed"),
        NerError::AlignmentMismatch { .. } => {
            error!(error = %err, "Tagger result does not line up with the hypothesis")
        }
        _ => error!(error = %err, "Cannot process hypotheses"),
    }
}

/// Builder for [`NerStage`]
pub struct NerStageBuilder {
    backend: Option<Box<dyn NerBackend>>,
    config: StageConfig,
}

impl NerStageBuilder {
    /// Create a new stage builder
    pub fn new() -> Self {
        Self {
            backend: None,
            config: StageConfig::default(),
        }
    }

    /// Set the tagger backend
    pub fn backend(mut self, backend: Box<dyn NerBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replace all runtime settings
    pub fn config(mut self, config: StageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parse_per_instruction(mut self, enabled: bool) -> Self {
        self.config.parse_per_instruction = enabled;
        self
    }

    pub fn max_concurrent_hypotheses(mut self, limit: usize) -> Self {
        self.config.max_concurrent_hypotheses = limit;
        self
    }

    /// Build the stage
    pub fn build(self) -> Result<NerStage> {
        let backend = self
            .backend
            .ok_or_else(|| NerError::Configuration("NER stage requires a backend".to_string()))?;

        if self.config.max_concurrent_hypotheses == 0 {
            return Err(NerError::Configuration(
                "max_concurrent_hypotheses must be at least 1".to_string(),
            ));
        }

        Ok(NerStage {
            backend,
            config: self.config,
        })
    }
}

impl Default for NerStageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Integration tests for the NER stage
//!
//! Tests cover:
//! - Block construction per instruction and per hypothesis
//! - Positional alignment of tagger output
//! - Failure handling (length mismatch, tagger errors, missing data)
//! - Concurrent tagging of hypotheses

use async_trait::async_trait;
use mockall::{Sequence, mock};
use ner_stage::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

mock! {
    pub Tagger {}

    #[async_trait]
    impl NerBackend for Tagger {
        async fn tag(&self, block: &TextBlock) -> std::result::Result<TaggingResult, ToolError>;
    }
}

fn open_the_door() -> Hypothesis {
    Hypothesis::from_words(&[
        ("Open", 0),
        ("the", 0),
        ("door", 0),
        ("Close", 1),
        ("it", 1),
    ])
}

fn outside(block: &TextBlock) -> TaggingResult {
    block
        .words()
        .iter()
        .map(|w| TaggedWord::new(w.as_str(), "O"))
        .collect()
}

/// Labels known names, everything else `O`.
#[derive(Default)]
struct Gazetteer {
    names: HashMap<&'static str, &'static str>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Gazetteer {
    fn new() -> Self {
        let names = HashMap::from([
            ("John", "S-PER"),
            ("Smith", "E-PER"),
            ("Paris", "S-LOC"),
            ("New", "B-LOC"),
            ("York", "E-LOC"),
            ("Google", "S-ORG"),
        ]);
        Self {
            names,
            ..Self::default()
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl NerBackend for Gazetteer {
    async fn tag(&self, block: &TextBlock) -> std::result::Result<TaggingResult, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(block
            .words()
            .iter()
            .map(|w| TaggedWord::new(w.as_str(), *self.names.get(w.as_str()).unwrap_or(&"O")))
            .collect())
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

#[cfg(test)]
mod alignment_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_per_instruction_round_trip() {
        let mut tagger = MockTagger::new();
        let mut seq = Sequence::new();
        tagger
            .expect_tag()
            .withf(|block| block.text() == "Open the door ")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|block| Ok(outside(block)));
        tagger
            .expect_tag()
            .withf(|block| block.text() == "Close it ")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|block| Ok(outside(block)));

        let stage = NerStage::builder()
            .backend(Box::new(tagger))
            .parse_per_instruction(true)
            .build()
            .unwrap();

        let mut hypotheses = vec![open_the_door()];
        stage.tag_hypotheses(&mut hypotheses).await.unwrap();

        assert!(hypotheses[0].tokens.iter().all(|t| t.ner.as_deref() == Some("O")));
    }

    #[tokio::test]
    async fn test_whole_hypothesis_round_trip() {
        let mut tagger = MockTagger::new();
        tagger
            .expect_tag()
            .withf(|block| block.text() == "Open the door Close it " && block.len() == 5)
            .times(1)
            .returning(|block| Ok(outside(block)));

        let stage = NerStage::builder()
            .backend(Box::new(tagger))
            .parse_per_instruction(false)
            .build()
            .unwrap();

        let mut hypotheses = vec![open_the_door()];
        stage.tag_hypotheses(&mut hypotheses).await.unwrap();

        assert_eq!(hypotheses[0].labels(), vec![Some("O"); 5]);
    }

    #[tokio::test]
    async fn test_short_result_fails_without_mutation() {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().times(1).returning(|block| {
            let mut result = outside(block);
            result.pop();
            Ok(result)
        });

        let stage = NerStage::builder().backend(Box::new(tagger)).build().unwrap();

        let mut hypotheses = vec![open_the_door()];
        let before = hypotheses.clone();
        let err = stage.tag_hypotheses(&mut hypotheses).await.unwrap_err();

        assert!(matches!(
            err,
            NerError::AlignmentMismatch {
                hypothesis: 0,
                block: Some(0),
                expected: 5,
                actual: 4
            }
        ));
        assert_eq!(hypotheses, before);
    }

    #[tokio::test]
    async fn test_later_failure_leaves_earlier_hypotheses_untouched() {
        let mut tagger = MockTagger::new();
        tagger
            .expect_tag()
            .returning(|block| {
                if block.words().iter().any(|w| w == "broken") {
                    Ok(vec![TaggedWord::new("broken", "O")])
                } else {
                    Ok(outside(block))
                }
            });

        let stage = NerStage::builder().backend(Box::new(tagger)).build().unwrap();

        let mut hypotheses = vec![
            open_the_door(),
            Hypothesis::from_words(&[("broken", 0), ("input", 0)]),
        ];
        let before = hypotheses.clone();

        let err = stage.tag_hypotheses(&mut hypotheses).await.unwrap_err();
        assert!(matches!(err, NerError::AlignmentMismatch { hypothesis: 1, .. }));
        assert_eq!(hypotheses, before);
    }

    #[tokio::test]
    async fn test_alignment_is_repeatable() {
        let stage = NerStage::builder()
            .backend(Box::new(Gazetteer::new()))
            .build()
            .unwrap();

        let mut hypotheses = vec![Hypothesis::from_words(&[
            ("John", 0),
            ("Smith", 0),
            ("left", 0),
            ("Paris", 0),
        ])];

        stage.tag_hypotheses(&mut hypotheses).await.unwrap();
        let first = hypotheses.clone();
        stage.tag_hypotheses(&mut hypotheses).await.unwrap();

        assert_eq!(hypotheses, first);
        assert_eq!(
            hypotheses[0].labels(),
            vec![Some("S-PER"), Some("E-PER"), Some("O"), Some("S-LOC")]
        );
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_tool_failure_names_hypothesis_and_block() {
        let mut tagger = MockTagger::new();
        tagger
            .expect_tag()
            .withf(|block| block.text() == "Open the door ")
            .returning(|block| Ok(outside(block)));
        tagger
            .expect_tag()
            .withf(|block| block.text() == "Close it ")
            .returning(|_| {
                Err(ToolError::NonZeroExit {
                    program: "senna".to_string(),
                    code: 1,
                    stderr: "hash file missing".to_string(),
                })
            });

        let stage = NerStage::builder()
            .backend(Box::new(tagger))
            .parse_per_instruction(true)
            .build()
            .unwrap();

        let mut hypotheses = vec![open_the_door()];
        let err = stage.tag_hypotheses(&mut hypotheses).await.unwrap_err();

        match err {
            NerError::ExternalTool {
                hypothesis,
                block,
                source,
            } => {
                assert_eq!(hypothesis, 0);
                assert_eq!(block, 1);
                assert!(matches!(source, ToolError::NonZeroExit { code: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(hypotheses[0].tokens.iter().all(|t| t.ner.is_none()));
    }

    #[tokio::test]
    async fn test_empty_hypothesis_is_rejected_before_tagging() {
        let mut tagger = MockTagger::new();
        tagger.expect_tag().never();

        let stage = NerStage::builder().backend(Box::new(tagger)).build().unwrap();

        let mut hypotheses = vec![Hypothesis::default()];
        let err = stage.tag_hypotheses(&mut hypotheses).await.unwrap_err();
        assert!(matches!(err, NerError::EmptyHypothesis { hypothesis: 0 }));
    }

    #[tokio::test]
    async fn test_missing_pipeline_data() {
        let stage = NerStage::builder()
            .backend(Box::new(Gazetteer::new()))
            .build()
            .unwrap();

        let mut data = PrePipelineData::default();
        let err = stage.exec(&mut data).await.unwrap_err();
        assert!(matches!(err, NerError::DataUnavailable(_)));
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_exec_on_host_data() {
        let stage = NerStage::builder()
            .backend(Box::new(Gazetteer::new()))
            .parse_per_instruction(true)
            .build()
            .unwrap();

        let mut data = PrePipelineData::from_json(
            r#"{"tagged_hypotheses": [[
                {"word": "Fly", "instruction_number": 0},
                {"word": "to", "instruction_number": 0},
                {"word": "New", "instruction_number": 0},
                {"word": "York", "instruction_number": 0},
                {"word": "then", "instruction_number": 1},
                {"word": "call", "instruction_number": 1},
                {"word": "Google", "instruction_number": 1}
            ]]}"#,
        )
        .unwrap();

        stage.exec(&mut data).await.unwrap();

        let hypotheses = data.tagged_hypotheses.as_ref().unwrap();
        let spans = entity_spans(&hypotheses[0].tokens);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "New York");
        assert_eq!(spans[0].kind, EntityKind::Location);
        assert_eq!(spans[1].text, "Google");
        assert_eq!(spans[1].kind, EntityKind::Organization);

        let json = data.to_json().unwrap();
        assert!(json.contains(r#""ner":"E-LOC""#));
    }

    #[tokio::test]
    async fn test_concurrent_hypotheses_keep_order() {
        let backend = Gazetteer::new().with_delay(Duration::from_millis(20));
        let peak = backend.peak.clone();
        let calls = backend.calls.clone();

        let stage = NerStage::builder()
            .backend(Box::new(backend))
            .max_concurrent_hypotheses(4)
            .build()
            .unwrap();

        let mut hypotheses: Vec<Hypothesis> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    Hypothesis::from_words(&[("John", 0), ("waved", 0)])
                } else {
                    Hypothesis::from_words(&[("visit", 0), ("Paris", 0), ("now", 0)])
                }
            })
            .collect();

        stage.tag_hypotheses(&mut hypotheses).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 8);
        assert!(peak.load(Ordering::SeqCst) > 1);
        for (i, hypothesis) in hypotheses.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(hypothesis.labels(), vec![Some("S-PER"), Some("O")]);
            } else {
                assert_eq!(hypothesis.labels(), vec![Some("O"), Some("S-LOC"), Some("O")]);
            }
        }
    }

    #[tokio::test]
    async fn test_sequential_by_default() {
        let backend = Gazetteer::new().with_delay(Duration::from_millis(5));
        let peak = backend.peak.clone();

        let stage = NerStage::builder()
            .backend(Box::new(backend))
            .build()
            .unwrap();

        let mut hypotheses = vec![open_the_door(), open_the_door(), open_the_door()];
        stage.tag_hypotheses(&mut hypotheses).await.unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}

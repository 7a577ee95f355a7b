//! Interpretation of the labels written onto tokens.
//!
//! SENNA uses the IOBES scheme (`O`, `B-ORG`, `I-ORG`, `E-ORG`, `S-PER`);
//! plain IOB and bare type names are accepted as well.

use super::Token;
use serde::{Deserialize, Serialize};

/// Entity categories found in NER labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Person names
    Person,
    /// Organizations/institutions
    Organization,
    /// Geographic locations
    Location,
    /// Miscellaneous entities
    Miscellaneous,
    /// Any other category, kept verbatim
    Other(String),
}

impl EntityKind {
    /// Map a label's type part to a kind.
    pub fn from_label(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PERSON" | "PER" => EntityKind::Person,
            "ORGANIZATION" | "ORG" => EntityKind::Organization,
            "LOCATION" | "LOC" => EntityKind::Location,
            "MISCELLANEOUS" | "MISC" => EntityKind::Miscellaneous,
            _ => EntityKind::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Organization => "organization",
            EntityKind::Location => "location",
            EntityKind::Miscellaneous => "miscellaneous",
            EntityKind::Other(name) => name,
        }
    }
}

/// Position of a word inside an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Outside,
    Begin,
    Inside,
    End,
    Single,
}

/// A parsed NER label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NerLabel {
    pub scheme: Scheme,
    pub kind: Option<EntityKind>,
}

impl NerLabel {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case("O") {
            return Self {
                scheme: Scheme::Outside,
                kind: None,
            };
        }

        let scheme = label.split_once('-').and_then(|(prefix, kind)| {
            let scheme = match prefix.to_ascii_uppercase().as_str() {
                "B" => Scheme::Begin,
                "I" => Scheme::Inside,
                "E" => Scheme::End,
                "S" => Scheme::Single,
                _ => return None,
            };
            Some((scheme, kind))
        });

        match scheme {
            Some((scheme, kind)) => Self {
                scheme,
                kind: Some(EntityKind::from_label(kind)),
            },
            None => Self {
                scheme: Scheme::Single,
                kind: Some(EntityKind::from_label(label)),
            },
        }
    }

    pub fn is_entity(&self) -> bool {
        self.scheme != Scheme::Outside
    }
}

/// A run of tokens forming one named entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitySpan {
    pub kind: EntityKind,
    /// Index of the first token
    pub start: usize,
    /// Index one past the last token
    pub end: usize,
    /// The entity's words joined by single spaces
    pub text: String,
}

/// Decode entity spans from the labels assigned to `tokens`.
///
/// Unlabelled tokens count as outside. Broken sequences (an `I-` or `E-`
/// without a matching opener) start a new span rather than being dropped.
pub fn entity_spans(tokens: &[Token]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut open: Option<(EntityKind, usize)> = None;

    let span = |kind: EntityKind, start: usize, end: usize| EntitySpan {
        kind,
        start,
        end,
        text: tokens[start..end]
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };

    for (i, token) in tokens.iter().enumerate() {
        let label = token
            .ner
            .as_deref()
            .map(NerLabel::parse)
            .unwrap_or(NerLabel {
                scheme: Scheme::Outside,
                kind: None,
            });

        let Some(kind) = label.kind else {
            if let Some((kind, start)) = open.take() {
                spans.push(span(kind, start, i));
            }
            continue;
        };

        let continues = matches!(&open, Some((open_kind, _)) if *open_kind == kind);

        match label.scheme {
            Scheme::Inside if continues => {}
            Scheme::End if continues => {
                if let Some((kind, start)) = open.take() {
                    spans.push(span(kind, start, i + 1));
                }
            }
            Scheme::Begin | Scheme::Inside => {
                if let Some((kind, start)) = open.take() {
                    spans.push(span(kind, start, i));
                }
                open = Some((kind, i));
            }
            Scheme::End | Scheme::Single | Scheme::Outside => {
                if let Some((kind, start)) = open.take() {
                    spans.push(span(kind, start, i));
                }
                spans.push(span(kind, i, i + 1));
            }
        }
    }

    if let Some((kind, start)) = open {
        spans.push(span(kind, start, tokens.len()));
    }

    spans
}

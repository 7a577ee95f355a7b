//! Positional merge of tagger output back onto tokens.

use super::{TaggedWord, Token};
use crate::{NerError, Result};

/// Verify that `result` can be aligned with `tokens` without touching them.
pub fn check(tokens: &[Token], result: &[TaggedWord], hypothesis: usize) -> Result<()> {
    if result.len() != tokens.len() {
        return Err(NerError::AlignmentMismatch {
            hypothesis,
            block: None,
            expected: tokens.len(),
            actual: result.len(),
        });
    }
    Ok(())
}

/// Assign `result[i].label` to `tokens[i]`.
///
/// Alignment is purely positional; the tagger's word is not compared against
/// the token's word beyond a debug log. On length mismatch nothing is mutated.
pub fn align(tokens: &mut [Token], result: &[TaggedWord], hypothesis: usize) -> Result<()> {
    check(tokens, result, hypothesis)?;

    for (position, (token, tagged)) in tokens.iter_mut().zip(result).enumerate() {
        if token.word != tagged.word {
            tracing::debug!(
                hypothesis,
                position,
                token = %token.word,
                tagged = %tagged.word,
                "tagger word differs from token word"
            );
        }
        token.ner = Some(tagged.label.clone());
    }

    Ok(())
}

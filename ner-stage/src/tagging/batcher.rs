//! Splits a hypothesis into the text blocks handed to the tagger.

use super::{TextBlock, Token};
use crate::{NerError, Result};

/// Build the text blocks for one hypothesis.
///
/// With `per_instruction` unset the whole hypothesis becomes a single block.
/// Otherwise a new block starts every time the instruction number strictly
/// increases; the last block is always emitted.
///
/// `hypothesis` is the index reported when `tokens` is empty.
pub fn batch(tokens: &[Token], per_instruction: bool, hypothesis: usize) -> Result<Vec<TextBlock>> {
    let Some(first) = tokens.first() else {
        return Err(NerError::EmptyHypothesis { hypothesis });
    };

    if !per_instruction {
        return Ok(vec![tokens.iter().map(|t| t.word.as_str()).collect()]);
    }

    let mut blocks = Vec::new();
    let mut current = TextBlock::new();
    let mut instruction = first.instruction_number;

    for token in tokens {
        if token.instruction_number > instruction {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(token.word.as_str());
        instruction = token.instruction_number;
    }
    blocks.push(current);

    Ok(blocks)
}

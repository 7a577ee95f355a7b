//! Named-entity tagging of tokenised hypotheses.
//!
//! A hypothesis is split into text blocks ([`batcher`]), each block is handed
//! to a [`NerBackend`] (by default an external program, see [`process`]), and
//! the returned labels are written back onto the tokens by position
//! ([`aligner`]). [`NerStage`] ties these together.

pub mod aligner;
pub mod batcher;
mod error;
mod labels;
pub mod process;
mod stage;
mod traits;
mod types;

pub use error::ToolError;
pub use labels::*;
pub use process::ProcessTagger;
pub use stage::*;
pub use traits::NerBackend;
pub use types::*;

//! Traits for tagger backends.

use super::{TaggingResult, TextBlock, ToolError};
use async_trait::async_trait;

/// Anything that can assign one NER label to each word of a block.
///
/// Implementations must return exactly one [`super::TaggedWord`] per input
/// word, in input order, or fail. The stage rejects results of any other
/// length, so backends do not need to check it themselves.
#[async_trait]
pub trait NerBackend: Send + Sync {
    /// Tag the words of `block`.
    async fn tag(&self, block: &TextBlock) -> Result<TaggingResult, ToolError>;

    /// Get the name of this backend for identification purposes.
    fn name(&self) -> &str {
        "external"
    }
}

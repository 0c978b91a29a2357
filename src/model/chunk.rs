//! Content chunks and their ranked views.

use serde::{Deserialize, Serialize};

/// The text content bounded between one heading and the next (or page end).
///
/// `relevance_score` starts at zero and is assigned exactly once by the
/// ranker; chunks are otherwise immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identifier (filename)
    pub document: String,

    /// Page index (0-based)
    pub page: u32,

    /// Title of the heading that opens this chunk
    pub section_title: String,

    /// Extracted content text
    pub content: String,

    /// Cosine similarity to the persona/task query, assigned by the ranker
    pub relevance_score: f32,
}

impl Chunk {
    /// Create a new unscored chunk.
    pub fn new(
        document: impl Into<String>,
        page: u32,
        section_title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            page,
            section_title: section_title.into(),
            content: content.into(),
            relevance_score: 0.0,
        }
    }
}

/// A ranked section entry of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    /// Source document identifier
    pub document: String,

    /// Section title
    pub section_title: String,

    /// 1-based rank in descending relevance order
    pub importance_rank: u32,

    /// Page index (0-based)
    pub page_number: u32,
}

/// The distilled single-sentence view of one top-ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Source document identifier
    pub document: String,

    /// The most relevant sentence, or a truncated fallback
    pub refined_text: String,

    /// Page index (0-based)
    pub page_number: u32,
}

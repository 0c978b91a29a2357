//! Persona-driven chunk ranking.

mod stopwords;
pub mod tfidf;

pub use stopwords::STOP_WORDS;
pub use tfidf::MAX_VOCABULARY;

use crate::model::Chunk;

/// Synthesize the query sentence anchoring relevance for chunk ranking.
pub fn build_query(persona: &str, task: &str) -> String {
    format!("As a {}, I need to {}", persona, task)
}

/// Score every chunk against the persona/task query and sort descending.
///
/// The vector space is fitted over the query plus each chunk's
/// "{section_title}. {content}" text, fresh for this call. The sort is
/// stable, so chunks with equal scores keep their pooled order. An empty
/// pool returns empty without touching the vectorizer.
pub fn rank_chunks(mut chunks: Vec<Chunk>, persona: &str, task: &str) -> Vec<Chunk> {
    if chunks.is_empty() {
        return chunks;
    }

    let query = build_query(persona, task);
    let corpus: Vec<String> = chunks
        .iter()
        .map(|c| format!("{}. {}", c.section_title, c.content))
        .collect();

    let scores = tfidf::relevance_scores(&query, &corpus);
    for (chunk, score) in chunks.iter_mut().zip(&scores) {
        chunk.relevance_score = *score;
    }

    chunks.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    chunks
}

//! Sentence-level distillation of top-ranked chunks.
//!
//! Each top chunk is reduced to the single sentence most similar to the
//! persona/task query. Sentences are verbatim contiguous slices of the
//! chunk content; only the no-sentences fallback truncates.

use crate::model::{Chunk, SubsectionAnalysis};
use crate::rank::tfidf;

/// How many top-ranked chunks are distilled and reported.
pub const TOP_SECTIONS: usize = 15;

/// Fallback length when no sentence boundary is found.
const FALLBACK_CHARS: usize = 300;

/// Dotted tokens that end with a period without ending a sentence.
/// Compared lowercased, without the trailing period.
const ABBREVIATIONS: &[&str] = &[
    "al", "dr", "e.g", "etc", "fig", "i.e", "jr", "mr", "mrs", "ms", "no", "prof",
    "sec", "sr", "st", "vs",
];

/// Split text into sentences on terminator punctuation followed by
/// whitespace and an uppercase letter or digit. Common abbreviations and
/// dotted numbers ("3.4.5") do not split. Every returned sentence is a
/// trimmed contiguous slice of the input.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    for (k, &(byte_idx, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        // Closing quotes or brackets stay with the sentence.
        let mut close = k + 1;
        while close < chars.len() && matches!(chars[close].1, '"' | '\'' | ')' | ']') {
            close += 1;
        }

        if close < chars.len() && !chars[close].1.is_whitespace() {
            continue;
        }

        // The next sentence must open with an uppercase letter or digit.
        let mut next = close;
        while next < chars.len() && chars[next].1.is_whitespace() {
            next += 1;
        }
        if next < chars.len() {
            let opener = chars[next].1;
            if !(opener.is_uppercase() || opener.is_ascii_digit()) {
                continue;
            }
        }

        if c == '.' && ends_with_abbreviation(&text[start..byte_idx]) {
            continue;
        }

        let end = chars.get(close).map(|&(b, _)| b).unwrap_or(text.len());
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = chars.get(next).map(|&(b, _)| b).unwrap_or(text.len());
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Whether the text before a period ends in a known abbreviation or a
/// single capital initial ("J.").
fn ends_with_abbreviation(prefix: &str) -> bool {
    let last_word = prefix
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("");
    if last_word.is_empty() {
        return false;
    }

    if last_word.chars().count() == 1
        && last_word.chars().all(|c| c.is_alphabetic() && c.is_uppercase())
    {
        return true;
    }

    let lowered = last_word.to_lowercase();
    ABBREVIATIONS.contains(&lowered.as_str())
}

/// Select the sentence of `chunk` most similar to `query`.
///
/// Fallbacks: no sentences → first [`FALLBACK_CHARS`] chars with an
/// ellipsis marker; collapsed per-chunk vocabulary → first sentence
/// verbatim. Score ties resolve to the earliest sentence.
pub fn refine_chunk(chunk: &Chunk, query: &str) -> String {
    let sentences = split_sentences(&chunk.content);
    if sentences.is_empty() {
        let truncated: String = chunk.content.chars().take(FALLBACK_CHARS).collect();
        return format!("{}...", truncated);
    }

    match tfidf::try_relevance_scores(query, &sentences, tfidf::MAX_VOCABULARY) {
        Some(scores) => {
            let mut best = 0usize;
            for (i, score) in scores.iter().enumerate() {
                if *score > scores[best] {
                    best = i;
                }
            }
            sentences[best].clone()
        }
        None => sentences[0].clone(),
    }
}

/// Distill every chunk of the top-ranked set.
///
/// The distillation query concatenates persona and task plainly, unlike
/// the ranking query sentence.
pub fn distill_sections(chunks: &[Chunk], persona: &str, task: &str) -> Vec<SubsectionAnalysis> {
    let query = format!("{} {}", persona, task);
    chunks
        .iter()
        .map(|chunk| SubsectionAnalysis {
            document: chunk.document.clone(),
            refined_text: refine_chunk(chunk, &query),
            page_number: chunk.page,
        })
        .collect()
}

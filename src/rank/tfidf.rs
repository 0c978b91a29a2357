//! Lexical vector space: term frequency × inverse document frequency.
//!
//! Every scoring call fits a fresh vocabulary over exactly the texts it is
//! given and throws it away afterward. Reusing a fitted vocabulary across
//! calls would let one corpus leak into another's scores, so the whole
//! module is pure functions over (query, corpus).

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use super::stopwords::is_stop_word;

/// Vocabulary cap: the most frequent terms across the fitted corpus.
pub const MAX_VOCABULARY: usize = 500;

fn token_re() -> &'static Regex {
    // Words of two or more word characters.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid regex"))
}

/// Lowercase, tokenize, and drop stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Cosine similarity of `query` against each entry of `docs`, under a
/// vocabulary fitted jointly over the query and all docs.
///
/// Returns one score in [0, 1] per doc, in doc order. A degenerate corpus
/// (every token filtered out) yields all-zero scores rather than an error.
pub fn relevance_scores(query: &str, docs: &[String]) -> Vec<f32> {
    try_relevance_scores(query, docs, MAX_VOCABULARY)
        .unwrap_or_else(|| vec![0.0; docs.len()])
}

/// Like [`relevance_scores`], but reports a collapsed vocabulary as `None`
/// so callers with a better fallback (e.g. "first sentence") can take it.
pub fn try_relevance_scores(
    query: &str,
    docs: &[String],
    max_vocabulary: usize,
) -> Option<Vec<f32>> {
    if docs.is_empty() {
        return Some(Vec::new());
    }

    let mut token_lists: Vec<Vec<String>> = Vec::with_capacity(docs.len() + 1);
    token_lists.push(tokenize(query));
    token_lists.extend(docs.iter().map(|d| tokenize(d)));

    let vocabulary = build_vocabulary(&token_lists, max_vocabulary);
    if vocabulary.is_empty() {
        return None;
    }

    let idf = inverse_document_frequencies(&token_lists, &vocabulary);
    let vectors: Vec<Vec<f32>> = token_lists
        .iter()
        .map(|tokens| tfidf_vector(tokens, &vocabulary, &idf))
        .collect();

    let query_vec = &vectors[0];
    Some(
        vectors[1..]
            .iter()
            .map(|doc_vec| dot(query_vec, doc_vec))
            .collect(),
    )
}

/// Select up to `max_vocabulary` terms by corpus-wide frequency (ties
/// alphabetical) and index them in alphabetical order, so the fitted space
/// is fully determined by its input.
fn build_vocabulary(
    token_lists: &[Vec<String>],
    max_vocabulary: usize,
) -> HashMap<String, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tokens in token_lists {
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(&str, usize)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    terms.truncate(max_vocabulary);

    let mut selected: Vec<&str> = terms.into_iter().map(|(t, _)| t).collect();
    selected.sort_unstable();

    selected
        .into_iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect()
}

/// Smoothed idf per vocabulary term: ln((1 + n) / (1 + df)) + 1.
fn inverse_document_frequencies(
    token_lists: &[Vec<String>],
    vocabulary: &HashMap<String, usize>,
) -> Vec<f32> {
    let n = token_lists.len() as f32;
    let mut df = vec![0usize; vocabulary.len()];

    for tokens in token_lists {
        let mut seen = vec![false; vocabulary.len()];
        for token in tokens {
            if let Some(&idx) = vocabulary.get(token) {
                if !seen[idx] {
                    seen[idx] = true;
                    df[idx] += 1;
                }
            }
        }
    }

    df.into_iter()
        .map(|d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
        .collect()
}

/// L2-normalized tf·idf vector for one document.
fn tfidf_vector(
    tokens: &[String],
    vocabulary: &HashMap<String, usize>,
    idf: &[f32],
) -> Vec<f32> {
    let mut vec = vec![0f32; vocabulary.len()];
    for token in tokens {
        if let Some(&idx) = vocabulary.get(token) {
            vec[idx] += 1.0;
        }
    }

    for (value, weight) in vec.iter_mut().zip(idf) {
        *value *= weight;
    }

    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vec {
            *value /= norm;
        }
    }
    vec
}

/// Dot product of two L2-normalized vectors = their cosine similarity.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        let tokens = tokenize("The cat sat on a mat");
        assert_eq!(tokens, vec!["cat", "sat", "mat"]);
    }

    #[test]
    fn test_empty_docs_short_circuit() {
        assert_eq!(relevance_scores("anything", &[]), Vec::<f32>::new());
    }

    #[test]
    fn test_matching_doc_scores_higher() {
        let corpus = docs(&[
            "hiking trails and mountain views for outdoor trips",
            "quarterly financial statements and audit procedures",
        ]);
        let scores = relevance_scores("plan an outdoor hiking trip", &corpus);
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
        for s in &scores {
            assert!((0.0..=1.0 + 1e-6).contains(s));
        }
    }

    #[test]
    fn test_identical_text_scores_near_one() {
        let corpus = docs(&["wine tasting tours in coastal villages"]);
        let scores = relevance_scores("wine tasting tours in coastal villages", &corpus);
        assert!((scores[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_disjoint_text_scores_zero() {
        let corpus = docs(&["photosynthesis chlorophyll biology"]);
        let scores = relevance_scores("database indexing performance", &corpus);
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_determinism() {
        let corpus = docs(&[
            "packing lists for summer beach holidays",
            "nightlife bars and live music venues",
            "regional cuisine and cooking classes",
        ]);
        let a = relevance_scores("food lover planning meals", &corpus);
        let b = relevance_scores("food lover planning meals", &corpus);
        assert_eq!(a, b);
    }

    #[test]
    fn test_collapsed_vocabulary_is_none() {
        // Stop words only: nothing survives tokenization.
        let corpus = docs(&["the and of", "was were been"]);
        assert!(try_relevance_scores("is are", &corpus, MAX_VOCABULARY).is_none());
        // The lenient wrapper degrades to zeros instead.
        assert_eq!(relevance_scores("is are", &corpus), vec![0.0, 0.0]);
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent() {
        let lists = vec![
            tokenize("apple apple apple banana banana cherry"),
            tokenize("apple banana date"),
        ];
        let vocab = build_vocabulary(&lists, 2);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains_key("apple"));
        assert!(vocab.contains_key("banana"));
        assert!(!vocab.contains_key("cherry"));
    }

    #[test]
    fn test_vocabulary_tie_breaks_alphabetical() {
        let lists = vec![tokenize("zebra apple")];
        let vocab = build_vocabulary(&lists, 1);
        assert!(vocab.contains_key("apple"));
    }
}

//! Span feature extraction.
//!
//! Converts raw per-page text spans into the fixed feature table the
//! structure classifier was trained on. Rows stay in stable (page, then
//! extraction) order so classifier output can be zipped back onto spans.

use std::sync::OnceLock;

use ndarray::Array2;
use regex::Regex;

use crate::model::TextSpan;

/// Feature column order shared with the frozen classifier artifact.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "char_count",
    "word_count",
    "is_all_caps",
    "size_ratio",
    "size_rank",
    "is_bold",
    "is_numbered_list",
];

/// Guards the size_ratio divisor against an all-zero size document.
const MEDIAN_EPSILON: f32 = 1e-6;

/// Derived per-span features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Length of the trimmed text in characters
    pub char_count: usize,

    /// Number of whitespace-separated tokens (0 if text empties after trim)
    pub word_count: usize,

    /// True only for texts longer than 2 chars with cased letters and no
    /// lowercase (single letters and initials excluded)
    pub is_all_caps: bool,

    /// Font size over the document-wide median size; always > 0
    pub size_ratio: f32,

    /// Dense rank of the font size, descending; largest size is rank 1,
    /// equal sizes share a rank
    pub size_rank: u32,

    /// Font name contains "bold" (case-insensitive)
    pub is_bold: bool,

    /// Text begins with a dotted numeric prefix ("1", "1.2", "3.4.5")
    pub is_numbered_list: bool,
}

fn numbered_list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)*").expect("valid regex"))
}

/// Font sizes are compared at 0.1pt precision so that float noise from
/// text-matrix scaling does not split ranks.
pub(crate) fn size_key(size: f32) -> i32 {
    (size * 10.0) as i32
}

/// Document-wide median font size.
fn median_size(spans: &[TextSpan]) -> f32 {
    let mut sizes: Vec<f32> = spans.iter().map(|s| s.font_size).collect();
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sizes.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sizes[n / 2]
    } else {
        (sizes[n / 2 - 1] + sizes[n / 2]) / 2.0
    }
}

/// Extract one [`FeatureRow`] per span, in the spans' order.
///
/// Returns an empty table for zero spans; callers treat that as
/// "structure extraction failed" for the document rather than an error.
pub fn extract_features(spans: &[TextSpan]) -> Vec<FeatureRow> {
    if spans.is_empty() {
        return Vec::new();
    }

    let median = median_size(spans);

    // Dense descending rank over distinct sizes: largest size → rank 1.
    let mut distinct_keys: Vec<i32> = spans.iter().map(|s| size_key(s.font_size)).collect();
    distinct_keys.sort_unstable_by(|a, b| b.cmp(a));
    distinct_keys.dedup();

    spans
        .iter()
        .map(|span| {
            let trimmed = span.text.trim();
            let key = size_key(span.font_size);
            let rank = distinct_keys
                .iter()
                .position(|&k| k == key)
                .map(|p| p as u32 + 1)
                .unwrap_or(1);

            FeatureRow {
                char_count: trimmed.chars().count(),
                word_count: trimmed.split_whitespace().count(),
                is_all_caps: is_all_caps(&span.text),
                size_ratio: span.font_size / (median + MEDIAN_EPSILON),
                size_rank: rank,
                is_bold: span.bold,
                is_numbered_list: numbered_list_re().is_match(trimmed),
            }
        })
        .collect()
}

/// True when the text has at least one cased letter, no lowercase letters,
/// and more than two characters.
fn is_all_caps(text: &str) -> bool {
    let has_cased = text.chars().any(|c| c.is_uppercase() || c.is_lowercase());
    has_cased
        && !text.chars().any(|c| c.is_lowercase())
        && text.chars().count() > 2
}

/// Assemble rows into the inference matrix, columns in [`FEATURE_COLUMNS`]
/// order. The row type is total, so every expected column is always
/// present (absent measurements appear as zero).
pub fn feature_matrix(rows: &[FeatureRow]) -> Array2<f32> {
    let mut data = Vec::with_capacity(rows.len() * FEATURE_COLUMNS.len());
    for row in rows {
        data.push(row.char_count as f32);
        data.push(row.word_count as f32);
        data.push(row.is_all_caps as u8 as f32);
        data.push(row.size_ratio);
        data.push(row.size_rank as f32);
        data.push(row.is_bold as u8 as f32);
        data.push(row.is_numbered_list as u8 as f32);
    }
    Array2::from_shape_vec((rows.len(), FEATURE_COLUMNS.len()), data)
        .expect("row-major feature data matches shape")
}

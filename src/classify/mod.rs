//! Structure derivation: from span features and classifier probabilities
//! to a document title and heading outline.

pub mod model;

pub use model::{LinearModel, StructureModel, CLASS_BODY, CLASS_HEADING, CLASS_TITLE};

use ndarray::Array2;

use crate::error::Result;
use crate::features::{self, size_key, FeatureRow};
use crate::model::{DocumentStructure, HeadingLevel, OutlineEntry, TextSpan};

/// Minimum title probability for a page-0 span to become the title.
pub const TITLE_THRESHOLD: f32 = 0.5;

/// Minimum heading probability for a span to enter the outline.
pub const HEADING_THRESHOLD: f32 = 0.6;

/// Number of distinct font sizes mapped to their own heading level;
/// smaller sizes collapse into the lowest level.
const LEVEL_SIZES: usize = 3;

/// Run feature extraction and one classifier invocation, then derive the
/// document structure.
///
/// A document yielding zero spans returns the empty-structure sentinel
/// rather than an error, so a bad document degrades instead of aborting
/// the batch.
pub fn classify_document(
    spans: &[TextSpan],
    model: &dyn StructureModel,
) -> Result<DocumentStructure> {
    let rows = features::extract_features(spans);
    if rows.is_empty() {
        return Ok(DocumentStructure::empty());
    }

    let matrix = features::feature_matrix(&rows);
    let probs = model.predict_proba(&matrix)?;
    Ok(derive_structure(spans, &rows, &probs))
}

/// Derive title and outline from per-span class probabilities.
///
/// `spans`, `rows`, and `probs` rows are parallel, all in stable
/// (page, extraction) order.
pub fn derive_structure(
    spans: &[TextSpan],
    rows: &[FeatureRow],
    probs: &Array2<f32>,
) -> DocumentStructure {
    let title = select_title(spans, rows, probs);
    let outline = select_outline(spans, probs, &title);
    DocumentStructure { title, outline }
}

/// Title: among page-0 spans above the title threshold, the one with the
/// smallest size_rank (visually largest distinguishing font). Ties on
/// size_rank resolve to the earliest span in stable order.
fn select_title(spans: &[TextSpan], rows: &[FeatureRow], probs: &Array2<f32>) -> String {
    let mut best: Option<(u32, usize)> = None;

    for (i, span) in spans.iter().enumerate() {
        if span.page != 0 || probs[[i, CLASS_TITLE]] <= TITLE_THRESHOLD {
            continue;
        }
        let rank = rows[i].size_rank;
        if best.map_or(true, |(best_rank, _)| rank < best_rank) {
            best = Some((rank, i));
        }
    }

    match best {
        Some((_, i)) => spans[i].text.trim().to_string(),
        None => String::new(),
    }
}

/// Outline: spans above the heading threshold, sorted into reading order,
/// leveled by font size, with degenerate and title-duplicate texts removed.
fn select_outline(spans: &[TextSpan], probs: &Array2<f32>, title: &str) -> Vec<OutlineEntry> {
    let mut heading_idx: Vec<usize> = (0..spans.len())
        .filter(|&i| probs[[i, CLASS_HEADING]] > HEADING_THRESHOLD)
        .collect();

    // (page asc, y0 asc) is the canonical reading order; the chunk builder
    // relies on it for boundary computation. The sort is stable, so spans
    // sharing a position keep extraction order.
    heading_idx.sort_by(|&a, &b| {
        spans[a].page.cmp(&spans[b].page).then(
            spans[a]
                .y0()
                .partial_cmp(&spans[b].y0())
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    // Top distinct font sizes in the heading set, largest first.
    let mut sizes: Vec<i32> = heading_idx
        .iter()
        .map(|&i| size_key(spans[i].font_size))
        .collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes.dedup();

    let title_lower = title.to_lowercase();
    let mut outline = Vec::new();

    for &i in &heading_idx {
        let text = spans[i].text.trim();
        if text.chars().count() <= 1 {
            continue;
        }
        if text.to_lowercase() == title_lower {
            continue;
        }

        let level = sizes
            .iter()
            .position(|&k| k == size_key(spans[i].font_size))
            .filter(|&p| p < LEVEL_SIZES)
            .map(HeadingLevel::from_size_rank)
            .unwrap_or(HeadingLevel::H3);

        outline.push(OutlineEntry::new(level, text, spans[i].page, spans[i].bbox));
    }

    outline
}

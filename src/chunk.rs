//! Chunk construction from the heading outline.
//!
//! Each outline entry claims the vertical band from the bottom edge of its
//! own bounding box down to the top edge of the next entry on the same
//! page, or to the page bottom when it is the last entry on its page. The
//! bands of consecutive same-page entries tile the page with no gap and
//! no overlap.

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::extract::DocumentSource;
use crate::model::{BoundingBox, Chunk, DocumentStructure};

/// Build one chunk per outline entry with non-empty bounded content.
///
/// Entries whose region holds only whitespace are dropped; an extraction
/// error on one entry is logged and skipped without affecting the rest.
pub fn build_chunks(
    source: &dyn DocumentSource,
    document: &str,
    structure: &DocumentStructure,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for i in 0..structure.outline.len() {
        let entry = &structure.outline[i];
        match entry_content(source, structure, i) {
            Ok(Some(content)) => {
                chunks.push(Chunk::new(document, entry.page, entry.text.clone(), content));
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!(
                    "could not extract section '{}' (page {}): {}",
                    entry.text,
                    entry.page,
                    e
                );
            }
        }
    }

    chunks
}

/// The region of one outline entry, per the boundary rule.
pub fn entry_region(
    structure: &DocumentStructure,
    index: usize,
    page_width: f32,
    page_height: f32,
) -> BoundingBox {
    let entry = &structure.outline[index];
    let start_y = entry.bbox.y1;
    let end_y = match structure.outline.get(index + 1) {
        Some(next) if next.page == entry.page => next.bbox.y0,
        _ => page_height,
    };
    BoundingBox::new(0.0, start_y, page_width, end_y)
}

fn entry_content(
    source: &dyn DocumentSource,
    structure: &DocumentStructure,
    index: usize,
) -> Result<Option<String>> {
    let entry = &structure.outline[index];
    let (width, height) = source.page_size(entry.page)?;
    let region = entry_region(structure, index, width, height);

    let text = source.text_in_region(entry.page, region)?;
    let text = normalize(&text);
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// NFKC-normalize and trim extracted region text.
fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_string()
}

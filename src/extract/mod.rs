//! Document access layer.
//!
//! [`DocumentSource`] isolates the concrete PDF library from the analysis
//! pipeline: page enumeration, positioned span extraction, and clip-region
//! text retrieval, without exposing any PDF library types. Tests substitute
//! an in-memory implementation.

mod lopdf_source;

pub use lopdf_source::LopdfSource;

use crate::error::Result;
use crate::model::{BoundingBox, TextSpan};

/// Abstract interface for positioned text access to one document.
pub trait DocumentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Page dimensions (width, height) in points.
    fn page_size(&self, page: u32) -> Result<(f32, f32)>;

    /// All positioned text spans on a page, in extraction order.
    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>>;

    /// Plain text inside a rectangular clip region of a page, assembled
    /// in reading order.
    fn text_in_region(&self, page: u32, region: BoundingBox) -> Result<String>;

    /// All spans of the document in page order.
    ///
    /// A page that fails span extraction is logged and skipped; a document
    /// where every page fails simply yields an empty list, which callers
    /// treat as "structure extraction failed".
    fn all_spans(&self) -> Vec<TextSpan> {
        let mut spans = Vec::new();
        for page in 0..self.page_count() {
            match self.page_spans(page) {
                Ok(page_spans) => spans.extend(page_spans),
                Err(e) => {
                    log::warn!("failed to extract spans from page {}: {}", page, e);
                }
            }
        }
        spans
    }
}

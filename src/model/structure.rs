//! Document structure types: title and heading outline.

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Heading level, ordered by decreasing font size.
///
/// `H1` maps to the largest distinct heading font size in a document,
/// `H3` to the third-largest; sizes below the top three collapse into `H3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a 0-based size rank to a level; ranks beyond the defined set
    /// fall back to the lowest level.
    pub fn from_size_rank(rank: usize) -> Self {
        match rank {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Level label as it appears in serialized outlines.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Assigned heading level
    pub level: HeadingLevel,

    /// Trimmed heading text
    pub text: String,

    /// Page index (0-based)
    pub page: u32,

    /// Heading bounding box; its bottom edge is the chunk region start
    pub bbox: BoundingBox,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(
        level: HeadingLevel,
        text: impl Into<String>,
        page: u32,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            bbox,
        }
    }
}

/// Title and heading outline of one document.
///
/// Created once by the structure classifier; read-only afterward. The
/// outline is sorted by (page index, vertical position) — canonical
/// reading order, which chunk boundary computation relies on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Detected title; empty when no candidate exceeded the threshold
    pub title: String,

    /// Detected headings in reading order
    pub outline: Vec<OutlineEntry>,
}

impl DocumentStructure {
    /// Sentinel for a document whose extraction yielded no usable spans.
    /// Downstream stages treat an empty outline as "no chunks available"
    /// and continue with other documents.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the structure carries no outline entries.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_size_rank() {
        assert_eq!(HeadingLevel::from_size_rank(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_size_rank(1), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_size_rank(2), HeadingLevel::H3);
        // Sizes outside the top three collapse into the lowest level
        assert_eq!(HeadingLevel::from_size_rank(7), HeadingLevel::H3);
    }

    #[test]
    fn test_level_ordering() {
        assert!(HeadingLevel::H1 < HeadingLevel::H2);
        assert!(HeadingLevel::H2 < HeadingLevel::H3);
    }

    #[test]
    fn test_empty_sentinel() {
        let structure = DocumentStructure::empty();
        assert!(structure.is_empty());
        assert!(structure.title.is_empty());
    }
}

//! Positioned text spans and page geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in top-down page coordinates.
///
/// `y0` is the top edge and `y1` the bottom edge, so `y0 <= y1` for any
/// box produced by a document source. Backends working in PDF's native
/// bottom-up space are responsible for the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Vertical center of the box.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Check whether a point lies inside the box (edges inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// One atomic styled run of text on a page.
///
/// Produced by a [`DocumentSource`](crate::extract::DocumentSource);
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSpan {
    /// Page index (0-based)
    pub page: u32,

    /// The text content
    pub text: String,

    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,

    /// Font size in points
    pub font_size: f32,

    /// Whether the font name marks the span as bold
    pub bold: bool,

    /// Span bounding box in top-down page coordinates
    pub bbox: BoundingBox,
}

impl TextSpan {
    /// Create a new text span. Boldness is derived from the font name.
    pub fn new(
        page: u32,
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        bbox: BoundingBox,
    ) -> Self {
        let font_name = font_name.into();
        let bold = font_name.to_lowercase().contains("bold");
        Self {
            page,
            text: text.into(),
            font_name,
            font_size,
            bold,
            bbox,
        }
    }

    /// Top edge y-coordinate, the vertical sort key for reading order.
    pub fn y0(&self) -> f32 {
        self.bbox.y0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BoundingBox::new(10.0, 20.0, 110.0, 40.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 20.0);
        assert_eq!(bbox.center_y(), 30.0);
        assert!(bbox.contains(50.0, 30.0));
        assert!(!bbox.contains(50.0, 50.0));
    }

    #[test]
    fn test_span_bold_from_font_name() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let span = TextSpan::new(0, "Title", "Helvetica-Bold", 18.0, bbox);
        assert!(span.bold);

        let span = TextSpan::new(0, "body", "Times-Roman", 10.0, bbox);
        assert!(!span.bold);

        let span = TextSpan::new(0, "head", "ARIALBOLD", 12.0, bbox);
        assert!(span.bold);
    }
}

//! lopdf-backed document source.
//!
//! Walks page content streams to recover positioned text spans with font
//! and size attributes, and assembles clip-region text in reading order.
//! Span positions come from the text matrix (Tm/Td/TD/T*); glyph-level
//! advances are approximated, which is sufficient for the vertical banding
//! the chunk builder needs.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::DocumentSource;
use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, TextSpan};

/// Approximate ascender height as a fraction of font size.
const ASCENDER_RATIO: f32 = 0.8;
/// Approximate descender depth as a fraction of font size.
const DESCENDER_RATIO: f32 = 0.2;
/// Fallback average glyph width as a fraction of font size.
const CHAR_WIDTH_RATIO: f32 = 0.5;

/// Concrete [`DocumentSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    /// Page object ids in document order; index = 0-based page number.
    pages: Vec<ObjectId>,
}

impl LopdfSource {
    /// Open a PDF file. The file's magic bytes are verified first so that
    /// non-PDF documents fail fast with [`Error::UnknownFormat`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;

        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Open a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(page as usize)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Page dimensions from the MediaBox, defaulting to Letter size.
    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        if let Ok(page_dict) = self.doc.get_dictionary(page_id) {
            if let Ok(media_box) = page_dict.get(b"MediaBox") {
                if let Ok(array) = media_box.as_array() {
                    if array.len() >= 4 {
                        let width = array[2].as_float().unwrap_or(612.0);
                        let height = array[3].as_float().unwrap_or(792.0);
                        return (width, height);
                    }
                }
            }
        }
        (612.0, 792.0)
    }

    /// Raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = page_dict
            .get(b"Contents")
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return s
                        .decompressed_content()
                        .map_err(|e| Error::PdfParse(e.to_string()));
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Walk a page's content stream and produce raw spans with baseline
    /// positions in PDF's bottom-up coordinate space.
    fn raw_spans(&self, page_id: ObjectId) -> Result<Vec<RawSpan>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let base_fonts: BTreeMap<Vec<u8>, String> = lopdf_fonts
            .iter()
            .map(|(name, font)| {
                let base = font
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                (name.clone(), base)
            })
            .collect();

        let content_bytes = self.page_content(page_id)?;
        let content = lopdf::content::Content::decode(&content_bytes)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut current_font = String::new();
        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                            current_font = base_fonts
                                .get(font_name.as_slice())
                                .cloned()
                                .unwrap_or_else(|| {
                                    String::from_utf8_lossy(font_name.as_slice()).to_string()
                                });
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => {
                    text_matrix.next_line();
                }
                "Tj" | "TJ" => {
                    if in_text_block {
                        let text = if op.operator == "TJ" {
                            self.decode_tj_array(page_id, &current_font_name, &op.operands)
                        } else if let Some(Object::String(bytes, _)) = op.operands.first() {
                            self.decode_with_font(page_id, &current_font_name, bytes)
                        } else {
                            String::new()
                        };

                        if !text.trim().is_empty() {
                            let (x, y) = text_matrix.get_position();
                            let effective_size = current_font_size * text_matrix.get_scale();
                            spans.push(RawSpan {
                                text,
                                x,
                                y,
                                font_size: effective_size,
                                font_name: current_font.clone(),
                            });
                        }
                    }
                }
                "'" | "\"" => {
                    text_matrix.next_line();
                    if in_text_block {
                        let text_idx = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                            let text = self.decode_with_font(page_id, &current_font_name, bytes);
                            if !text.trim().is_empty() {
                                let (x, y) = text_matrix.get_position();
                                let effective_size = current_font_size * text_matrix.get_scale();
                                spans.push(RawSpan {
                                    text,
                                    x,
                                    y,
                                    font_size: effective_size,
                                    font_name: current_font.clone(),
                                });
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Decode a TJ array: strings interleaved with kerning adjustments in
    /// 1/1000 text space units. Large negative adjustments act as spaces.
    fn decode_tj_array(&self, page_id: ObjectId, font_name: &[u8], operands: &[Object]) -> String {
        let space_threshold = 200.0;
        let mut combined = String::new();

        if let Some(Object::Array(arr)) = operands.first() {
            for item in arr {
                match item {
                    Object::String(bytes, _) => {
                        combined.push_str(&self.decode_with_font(page_id, font_name, bytes));
                    }
                    Object::Integer(i) => {
                        if (*i as f32) < -space_threshold && !combined.ends_with(' ') {
                            combined.push(' ');
                        }
                    }
                    Object::Real(r) => {
                        if *r < -space_threshold && !combined.ends_with(' ') {
                            combined.push(' ');
                        }
                    }
                    _ => {}
                }
            }
        }

        combined
    }

    /// Decode a text byte sequence using the font's encoding on the given
    /// page, falling back to simple decoding when unavailable.
    fn decode_with_font(&self, page_id: ObjectId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page_id) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }
}

impl DocumentSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page)?;
        Ok(self.page_dimensions(page_id))
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        let page_id = self.page_id(page)?;
        let (_, height) = self.page_dimensions(page_id);
        let raw = self.raw_spans(page_id)?;

        Ok(raw
            .into_iter()
            .map(|span| {
                // PDF positions are bottom-up from the baseline; the model
                // wants a top-down box spanning ascender to descender.
                let top = height - (span.y + span.font_size * ASCENDER_RATIO);
                let bottom = height - (span.y - span.font_size * DESCENDER_RATIO);
                let width =
                    span.text.chars().count() as f32 * span.font_size * CHAR_WIDTH_RATIO;
                let bbox = BoundingBox::new(span.x, top, span.x + width, bottom);
                TextSpan::new(page, span.text, span.font_name, span.font_size, bbox)
            })
            .collect())
    }

    fn text_in_region(&self, page: u32, region: BoundingBox) -> Result<String> {
        let spans = self.page_spans(page)?;

        let mut clipped: Vec<TextSpan> = spans
            .into_iter()
            .filter(|s| {
                let cy = s.bbox.center_y();
                let cx = s.bbox.center_x();
                cy >= region.y0 && cy <= region.y1 && cx >= region.x0 && cx <= region.x1
            })
            .collect();

        if clipped.is_empty() {
            return Ok(String::new());
        }

        // Reading order: top-down, then left-to-right.
        clipped.sort_by(|a, b| {
            let y_cmp = a
                .bbox
                .y0
                .partial_cmp(&b.bbox.y0)
                .unwrap_or(std::cmp::Ordering::Equal);
            if y_cmp == std::cmp::Ordering::Equal {
                a.bbox
                    .x0
                    .partial_cmp(&b.bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            } else {
                y_cmp
            }
        });

        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_y: Option<f32> = None;

        for span in clipped {
            let tolerance = span.font_size * 0.3;
            let same_line = current_y
                .map(|y| (span.bbox.y0 - y).abs() <= tolerance)
                .unwrap_or(false);

            if same_line {
                if !current.ends_with(' ') && !span.text.starts_with(' ') {
                    current.push(' ');
                }
                current.push_str(&span.text);
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(span.bbox.y0);
                current.push_str(&span.text);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }

        Ok(lines.join("\n"))
    }
}

/// A span in PDF-native coordinates, before bbox conversion.
struct RawSpan {
    text: String,
    x: f32,
    /// Baseline y, bottom-up
    y: f32,
    font_size: f32,
    font_name: String,
}

/// Text positioning state from BT/Tm/Td/TD/T* operators.
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default line leading (could be set by TL operator)
        self.f -= 12.0 * self.d;
    }

    fn get_position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn get_scale(&self) -> f32 {
        // Vertical scale factor
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    // Try UTF-8
    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

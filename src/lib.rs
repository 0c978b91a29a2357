//! # pdfsift
//!
//! Persona-driven PDF section extraction, ranking, and distillation.
//!
//! pdfsift turns a collection of PDF documents into a prioritized digest
//! for a specific reader and goal: it recovers each document's structure
//! (title and heading outline) with a frozen classifier over layout
//! features, slices pages into per-heading content chunks, ranks the
//! pooled chunks against a persona/task query in a TF-IDF vector space,
//! and reduces each top chunk to its single most relevant sentence.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsift::PersonaAnalyzer;
//!
//! fn main() -> pdfsift::Result<()> {
//!     let analyzer = PersonaAnalyzer::from_model_file("models/structure.json")?;
//!
//!     // The request JSON lists documents living next to it.
//!     let output = analyzer.analyze_file("input/request.json");
//!     println!("{}", output.to_json_pretty()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Data flows strictly downstream, one stage per module:
//!
//! - [`features`]: per-span layout feature table
//! - [`classify`]: frozen classifier → title + leveled heading outline
//! - [`chunk`]: outline boundaries → contiguous content chunks
//! - [`rank`]: TF-IDF cosine relevance against the persona/task query
//! - [`distill`]: most relevant sentence per top chunk
//! - [`pipeline`]: orchestration and report assembly
//!
//! Failures local to one document or one heading degrade that piece only;
//! a run produces best-effort output unless nothing at all is extractable.

pub mod chunk;
pub mod classify;
pub mod detect;
pub mod distill;
pub mod error;
pub mod extract;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod rank;

// Re-export commonly used types
pub use classify::{LinearModel, StructureModel};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{DocumentSource, LopdfSource};
pub use features::{FeatureRow, FEATURE_COLUMNS};
pub use model::{
    AnalysisFailure, AnalysisOutput, AnalysisReport, AnalysisRequest, BoundingBox, Chunk,
    DocumentRef, DocumentStructure, HeadingLevel, JobToBeDone, OutlineEntry, Persona,
    RankedSection, RunMetadata, SubsectionAnalysis, TextSpan,
};
pub use pipeline::PersonaAnalyzer;

use std::path::Path;

/// Analyze a request file with a classifier artifact loaded from
/// `model_path`. Documents are resolved next to the request file.
///
/// # Example
///
/// ```no_run
/// use pdfsift::analyze_file;
///
/// let output = analyze_file("input/request.json", "models/structure.json").unwrap();
/// assert!(!output.is_failure() || output.to_json_pretty().is_ok());
/// ```
pub fn analyze_file<P: AsRef<Path>, M: AsRef<Path>>(
    input_json_path: P,
    model_path: M,
) -> Result<AnalysisOutput> {
    let analyzer = PersonaAnalyzer::from_model_file(model_path)?;
    Ok(analyzer.analyze_file(input_json_path))
}

/// Extract the title and heading outline of a single PDF.
///
/// # Example
///
/// ```no_run
/// use pdfsift::document_structure;
///
/// let structure = document_structure("report.pdf", "models/structure.json").unwrap();
/// println!("{}", structure.title);
/// for entry in &structure.outline {
///     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
/// }
/// ```
pub fn document_structure<P: AsRef<Path>, M: AsRef<Path>>(
    pdf_path: P,
    model_path: M,
) -> Result<DocumentStructure> {
    let analyzer = PersonaAnalyzer::from_model_file(model_path)?;
    let source = LopdfSource::open(pdf_path)?;
    analyzer.document_structure(&source)
}

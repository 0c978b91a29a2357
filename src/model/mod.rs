//! Data model types for the analysis pipeline.

mod chunk;
mod report;
mod request;
mod span;
mod structure;

pub use chunk::{Chunk, RankedSection, SubsectionAnalysis};
pub use report::{AnalysisFailure, AnalysisOutput, AnalysisReport, RunMetadata};
pub use request::{AnalysisRequest, DocumentRef, JobToBeDone, Persona};
pub use span::{BoundingBox, TextSpan};
pub use structure::{DocumentStructure, HeadingLevel, OutlineEntry};

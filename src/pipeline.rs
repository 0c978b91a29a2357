//! End-to-end persona analysis pipeline.
//!
//! One request — a document set plus persona and task — is processed
//! start-to-finish, single-threaded. Failures local to one document or one
//! outline entry degrade that piece and the run continues; only the total
//! absence of extractable content, or an error escaping the pipeline, is
//! surfaced, and both become structured failure objects rather than
//! panics.

use std::path::Path;

use chrono::Local;

use crate::chunk;
use crate::classify::{self, LinearModel, StructureModel};
use crate::distill::{self, TOP_SECTIONS};
use crate::error::{Error, Result};
use crate::extract::{DocumentSource, LopdfSource};
use crate::model::{
    AnalysisFailure, AnalysisOutput, AnalysisReport, AnalysisRequest, Chunk, DocumentStructure,
    RankedSection, RunMetadata,
};
use crate::rank;

/// Error string reported when an unexpected error escapes the pipeline.
const PROCESSING_ERROR: &str = "An exception occurred during processing.";

/// Persona-driven document analyzer.
///
/// Owns the frozen structure classifier; each call to an `analyze_*`
/// method builds its vector spaces from scratch, so an analyzer can be
/// reused across requests without state leaking between them.
pub struct PersonaAnalyzer {
    model: Box<dyn StructureModel>,
    top_k: usize,
}

impl PersonaAnalyzer {
    /// Create an analyzer around any frozen classifier.
    pub fn new(model: Box<dyn StructureModel>) -> Self {
        Self {
            model,
            top_k: TOP_SECTIONS,
        }
    }

    /// Create an analyzer by loading the classifier artifact from a file.
    pub fn from_model_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model = LinearModel::from_file(path)?;
        Ok(Self::new(Box::new(model)))
    }

    /// Override how many top-ranked sections are reported.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Run the full pipeline for a request file whose documents live in
    /// the same directory.
    ///
    /// Never returns an error: any failure is folded into the output
    /// object, matching the boundary contract.
    pub fn analyze_file<P: AsRef<Path>>(&self, input_json_path: P) -> AnalysisOutput {
        let path = input_json_path.as_ref();
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        match AnalysisRequest::from_file(path) {
            Ok(request) => self.analyze_request(&request, base_dir),
            Err(e) => AnalysisOutput::Failure(AnalysisFailure::with_details(
                PROCESSING_ERROR,
                e.to_string(),
            )),
        }
    }

    /// Run the full pipeline for an already-parsed request, resolving
    /// document filenames against `base_dir`.
    pub fn analyze_request(&self, request: &AnalysisRequest, base_dir: &Path) -> AnalysisOutput {
        match self.run(request, base_dir) {
            Ok(report) => AnalysisOutput::Report(Box::new(report)),
            Err(Error::NoContent) => {
                AnalysisOutput::Failure(AnalysisFailure::new(Error::NoContent.to_string()))
            }
            Err(e) => AnalysisOutput::Failure(AnalysisFailure::with_details(
                PROCESSING_ERROR,
                e.to_string(),
            )),
        }
    }

    fn run(&self, request: &AnalysisRequest, base_dir: &Path) -> Result<AnalysisReport> {
        let persona = &request.persona.role;
        let task = &request.job_to_be_done.task;
        log::info!("analyzing for persona '{}', task '{}'", persona, task);

        let mut all_chunks: Vec<Chunk> = Vec::new();
        for doc_ref in &request.documents {
            let path = base_dir.join(&doc_ref.filename);
            if !path.exists() {
                log::warn!("file not found, skipping: {}", path.display());
                continue;
            }

            match self.document_chunks(&path, &doc_ref.filename) {
                Ok(chunks) => {
                    log::debug!(
                        "extracted {} chunks from {}",
                        chunks.len(),
                        doc_ref.filename
                    );
                    all_chunks.extend(chunks);
                }
                Err(e) => {
                    log::warn!("skipping {}: {}", doc_ref.filename, e);
                }
            }
        }

        if all_chunks.is_empty() {
            return Err(Error::NoContent);
        }

        let ranked = rank::rank_chunks(all_chunks, persona, task);
        log::debug!("ranked {} total chunks", ranked.len());

        let top = &ranked[..ranked.len().min(self.top_k)];
        Ok(compose_report(request, top, persona, task))
    }

    fn document_chunks(&self, path: &Path, name: &str) -> Result<Vec<Chunk>> {
        let source = LopdfSource::open(path)?;
        Ok(self.chunks_from_source(&source, name))
    }

    /// Structure extraction and chunking over any document source.
    ///
    /// A document whose extraction fails outright contributes an empty
    /// chunk set; the caller decides whether the whole pool ended up
    /// empty.
    pub fn chunks_from_source(&self, source: &dyn DocumentSource, name: &str) -> Vec<Chunk> {
        let structure = match self.document_structure(source) {
            Ok(structure) => structure,
            Err(e) => {
                log::warn!("structure extraction failed for {}: {}", name, e);
                return Vec::new();
            }
        };

        if structure.is_empty() {
            log::warn!("no outline detected in {}; no chunks available", name);
            return Vec::new();
        }

        chunk::build_chunks(source, name, &structure)
    }

    /// Derive title and outline for one document.
    pub fn document_structure(&self, source: &dyn DocumentSource) -> Result<DocumentStructure> {
        let spans = source.all_spans();
        classify::classify_document(&spans, self.model.as_ref())
    }
}

/// Assemble the final report from the top-ranked chunks. Pure assembly:
/// no scoring or filtering happens here.
fn compose_report(
    request: &AnalysisRequest,
    top: &[Chunk],
    persona: &str,
    task: &str,
) -> AnalysisReport {
    let extracted_sections = top
        .iter()
        .enumerate()
        .map(|(i, chunk)| RankedSection {
            document: chunk.document.clone(),
            section_title: chunk.section_title.clone(),
            importance_rank: i as u32 + 1,
            page_number: chunk.page,
        })
        .collect();

    let subsection_analysis = distill::distill_sections(top, persona, task);

    AnalysisReport {
        metadata: RunMetadata {
            input_documents: request.document_names(),
            persona: persona.to_string(),
            job_to_be_done: task.to_string(),
            processing_timestamp: Local::now().to_rfc3339(),
        },
        extracted_sections,
        subsection_analysis,
    }
}

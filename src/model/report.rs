//! Final analysis result types, mirroring the output JSON produced at the
//! boundary.

use serde::{Deserialize, Serialize};

use super::{RankedSection, SubsectionAnalysis};
use crate::error::{Error, Result};

/// Run metadata carried in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Input document filenames in request order
    pub input_documents: Vec<String>,

    /// The literal persona role string from the request
    pub persona: String,

    /// The literal task string from the request
    pub job_to_be_done: String,

    /// ISO-8601 generation timestamp
    pub processing_timestamp: String,
}

/// A successful analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: RunMetadata,
    pub extracted_sections: Vec<RankedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// A degraded outcome: either nothing was extractable, or an unexpected
/// error escaped the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AnalysisFailure {
    /// Failure without diagnostic details (total extraction failure).
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Failure carrying the underlying error's message.
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// The terminal, externally visible artifact of one analysis run.
///
/// Serializes as either the report object or the failure object; there is
/// no wrapper key, matching the consumer-facing JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    Report(Box<AnalysisReport>),
    Failure(AnalysisFailure),
}

impl AnalysisOutput {
    /// Whether this outcome is a failure object.
    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisOutput::Failure(_))
    }

    /// The report, if the run succeeded.
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutput::Report(report) => Some(report.as_ref()),
            AnalysisOutput::Failure(_) => None,
        }
    }

    /// Serialize to pretty-printed JSON for the output file.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }
}

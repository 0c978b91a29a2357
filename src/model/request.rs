//! Analysis request types, mirroring the input JSON consumed at the boundary.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A reference to one input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Filename, resolved relative to the request file's directory
    pub filename: String,

    /// Display title from the request; not used by processing
    #[serde(default)]
    pub title: String,
}

/// The reader the digest is produced for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

/// The goal the reader wants to accomplish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

/// A full analysis request: a document set plus persona and task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Opaque challenge bookkeeping, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<serde_json::Value>,

    pub documents: Vec<DocumentRef>,
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
}

impl AnalysisRequest {
    /// Parse a request from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidRequest(e.to_string()))
    }

    /// Read and parse a request file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Filenames of all referenced documents, in request order.
    pub fn document_names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_JSON: &str = r#"{
        "challenge_info": {"challenge_id": "round_1b_002"},
        "documents": [
            {"filename": "guide.pdf", "title": "Guide"},
            {"filename": "notes.pdf"}
        ],
        "persona": {"role": "Travel Planner"},
        "job_to_be_done": {"task": "plan a trip for college friends"}
    }"#;

    #[test]
    fn test_request_from_json() {
        let request = AnalysisRequest::from_json(REQUEST_JSON).unwrap();
        assert_eq!(request.documents.len(), 2);
        assert_eq!(request.persona.role, "Travel Planner");
        assert_eq!(request.job_to_be_done.task, "plan a trip for college friends");
        assert_eq!(request.document_names(), vec!["guide.pdf", "notes.pdf"]);
    }

    #[test]
    fn test_request_missing_title_defaults_empty() {
        let request = AnalysisRequest::from_json(REQUEST_JSON).unwrap();
        assert_eq!(request.documents[1].title, "");
    }

    #[test]
    fn test_request_invalid_json() {
        let result = AnalysisRequest::from_json("{not json");
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_request_missing_persona_is_invalid() {
        let result = AnalysisRequest::from_json(r#"{"documents": []}"#);
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }
}

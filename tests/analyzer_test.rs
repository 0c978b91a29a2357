//! Integration tests for the full analysis pipeline.
//!
//! These build small real PDFs with lopdf, write a request file next to
//! them, and drive `PersonaAnalyzer` end-to-end through the public API.

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdfsift::{AnalysisOutput, LinearModel, PersonaAnalyzer};

/// Classifier keyed on size_rank alone: the largest distinct font size on
/// a page scores title, the second scores heading, everything below scores
/// body.
fn rank_model() -> LinearModel {
    LinearModel::new(
        vec![
            vec![0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0],  // body: 2r - 4.5
            vec![0.0, 0.0, 0.0, 0.0, -5.0, 0.0, 0.0], // title: -5r + 8
            vec![0.0, 0.0, 0.0, 0.0, -0.5, 0.0, 0.0], // heading: -0.5r + 1.5
        ],
        vec![-4.5, 8.0, 1.5],
    )
    .unwrap()
}

fn analyzer() -> PersonaAnalyzer {
    PersonaAnalyzer::new(Box::new(rank_model()))
}

/// Append one text showing block to a content stream.
fn text_block(ops: &mut Vec<Operation>, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec!["F1".into(), Object::Real(size)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![Object::Real(x), Object::Real(y)],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}

/// Write a one-page PDF: a 24pt title line, then alternating 18pt section
/// headings and 10pt body lines walking down the page.
fn write_pdf(path: &Path, title: &str, sections: &[(&str, &str)]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut ops = Vec::new();
    text_block(&mut ops, 24.0, 72.0, 745.0, title);
    let mut y = 700.0;
    for (heading, body) in sections {
        text_block(&mut ops, 18.0, 72.0, y, heading);
        text_block(&mut ops, 10.0, 72.0, y - 25.0, body);
        y -= 60.0;
    }

    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(612.0),
            Object::Real(792.0),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

fn write_request(dir: &Path, filenames: &[&str], persona: &str, task: &str) -> std::path::PathBuf {
    let request = serde_json::json!({
        "documents": filenames.iter()
            .map(|f| serde_json::json!({"filename": f, "title": ""}))
            .collect::<Vec<_>>(),
        "persona": {"role": persona},
        "job_to_be_done": {"task": task},
    });
    let path = dir.join("request.json");
    fs::write(&path, serde_json::to_string_pretty(&request).unwrap()).unwrap();
    path
}

#[test]
fn test_single_heading_document_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("doc.pdf"),
        "Quarterly Results",
        &[("Overview", "Revenue grew steadily over the quarter.")],
    );
    let request = write_request(dir.path(), &["doc.pdf"], "Analyst", "summarize");

    let output = analyzer().analyze_file(&request);
    let report = output.report().expect("expected a successful report");

    assert_eq!(report.extracted_sections.len(), 1);
    let section = &report.extracted_sections[0];
    assert_eq!(section.importance_rank, 1);
    assert_eq!(section.section_title, "Overview");
    assert_eq!(section.page_number, 0);
    assert_eq!(section.document, "doc.pdf");

    assert_eq!(report.subsection_analysis.len(), 1);
    assert_eq!(report.metadata.persona, "Analyst");
    assert_eq!(report.metadata.job_to_be_done, "summarize");
    assert_eq!(report.metadata.input_documents, vec!["doc.pdf"]);
}

#[test]
fn test_title_detected_and_excluded_from_sections() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("doc.pdf"),
        "Annual Review",
        &[("Findings", "The findings are summarized below.")],
    );
    let request = write_request(dir.path(), &["doc.pdf"], "Auditor", "check findings");

    let output = analyzer().analyze_file(&request);
    let report = output.report().expect("expected a successful report");
    for section in &report.extracted_sections {
        assert_ne!(section.section_title.to_lowercase(), "annual review");
    }
}

#[test]
fn test_top_k_truncation_across_documents() {
    let dir = tempfile::tempdir().unwrap();

    // 4 documents x 5 sections = 20 chunks; only 15 survive the cut.
    let mut filenames = Vec::new();
    for d in 0..4 {
        let name = format!("doc{}.pdf", d);
        let sections: Vec<(String, String)> = (0..5)
            .map(|s| {
                (
                    format!("Topic {} {}", d, s),
                    format!("Details about travel destination number {} {}.", d, s),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = sections
            .iter()
            .map(|(h, b)| (h.as_str(), b.as_str()))
            .collect();
        write_pdf(&dir.path().join(&name), "Travel Guide", &borrowed);
        filenames.push(name);
    }

    let names: Vec<&str> = filenames.iter().map(|s| s.as_str()).collect();
    let request = write_request(dir.path(), &names, "Travel Planner", "plan a trip");

    let output = analyzer().analyze_file(&request);
    let report = output.report().expect("expected a successful report");

    assert_eq!(report.extracted_sections.len(), 15);
    assert_eq!(report.subsection_analysis.len(), 15);

    // Ranks are dense 1..=15 in descending score order.
    for (i, section) in report.extracted_sections.iter().enumerate() {
        assert_eq!(section.importance_rank, i as u32 + 1);
    }
}

#[test]
fn test_runs_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("doc.pdf"),
        "City Guide",
        &[
            ("Beaches", "Sandy beaches line the coast for miles."),
            ("Museums", "The museum quarter hosts art and history."),
            ("Nightlife", "Bars and clubs stay open late downtown."),
        ],
    );
    let request = write_request(dir.path(), &["doc.pdf"], "Tourist", "relax on the beach");

    let first = analyzer().analyze_file(&request);
    let second = analyzer().analyze_file(&request);

    let sections = |output: &AnalysisOutput| output.report().unwrap().extracted_sections.clone();
    assert_eq!(sections(&first), sections(&second));
}

#[test]
fn test_refined_text_is_verbatim_substring() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("doc.pdf"),
        "Field Notes",
        &[(
            "Wildlife",
            "Deer graze at dawn. Foxes hunt near the treeline. Owls call at night.",
        )],
    );
    let request = write_request(dir.path(), &["doc.pdf"], "Ranger", "track foxes");

    let output = analyzer().analyze_file(&request);
    let report = output.report().expect("expected a successful report");
    let refined = &report.subsection_analysis[0].refined_text;
    assert!(
        refined.contains("Foxes"),
        "expected the fox sentence, got {:?}",
        refined
    );
}

#[test]
fn test_all_documents_missing_produces_error_object() {
    let dir = tempfile::tempdir().unwrap();
    let request = write_request(
        dir.path(),
        &["ghost1.pdf", "ghost2.pdf"],
        "Analyst",
        "summarize",
    );

    let output = analyzer().analyze_file(&request);
    assert!(output.is_failure());

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(
        json["error"],
        "No text chunks could be extracted from the documents."
    );
    // The degraded response carries no report keys at all.
    assert!(json.get("extracted_sections").is_none());
    assert!(json.get("subsection_analysis").is_none());
    assert!(json.get("metadata").is_none());
}

#[test]
fn test_non_pdf_document_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fake.pdf"), "just some text").unwrap();
    write_pdf(
        &dir.path().join("real.pdf"),
        "Real Document",
        &[("Summary", "This document parses fine.")],
    );
    let request = write_request(
        dir.path(),
        &["fake.pdf", "real.pdf"],
        "Analyst",
        "summarize",
    );

    let output = analyzer().analyze_file(&request);
    let report = output.report().expect("the valid document should carry the run");
    assert!(report
        .extracted_sections
        .iter()
        .all(|s| s.document == "real.pdf"));
}

#[test]
fn test_model_artifact_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("structure.json");
    fs::write(
        &model_path,
        serde_json::to_string(&rank_model()).unwrap(),
    )
    .unwrap();

    write_pdf(
        &dir.path().join("doc.pdf"),
        "Loaded Model",
        &[("Section", "Content for the loaded model test.")],
    );
    let request = write_request(dir.path(), &["doc.pdf"], "Analyst", "summarize");

    let output = pdfsift::analyze_file(&request, &model_path).unwrap();
    assert!(!output.is_failure());
}

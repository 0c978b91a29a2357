//! pdfsift CLI - persona-driven document analysis tool

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;

use pdfsift::{LopdfSource, PersonaAnalyzer};

/// Default request filename looked up inside the input directory.
const REQUEST_FILE: &str = "request.json";

/// Default output filename written inside the output directory.
const OUTPUT_FILE: &str = "analysis.json";

#[derive(Parser)]
#[command(name = "pdfsift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract and rank PDF sections for a persona and task", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full analysis for a request file and its documents
    Analyze {
        /// Directory holding the request file and the referenced PDFs
        #[arg(short, long, value_name = "DIR", env = "PDFSIFT_INPUT_DIR", default_value = "input")]
        input_dir: PathBuf,

        /// Directory the result JSON is written to
        #[arg(short, long, value_name = "DIR", env = "PDFSIFT_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Classifier artifact; if a directory, the first *.json inside is used
        #[arg(short, long, value_name = "PATH", env = "PDFSIFT_MODEL", default_value = "models")]
        model: PathBuf,

        /// Request file name inside the input directory
        #[arg(long, value_name = "FILE", default_value = REQUEST_FILE)]
        request: String,
    },

    /// Print the detected structure (title + outline) of one PDF
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Classifier artifact; if a directory, the first *.json inside is used
        #[arg(short, long, value_name = "PATH", env = "PDFSIFT_MODEL", default_value = "models")]
        model: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Analyze {
        input_dir: PathBuf::from("input"),
        output_dir: PathBuf::from("output"),
        model: PathBuf::from("models"),
        request: REQUEST_FILE.to_string(),
    }) {
        Commands::Analyze {
            input_dir,
            output_dir,
            model,
            request,
        } => cmd_analyze(&input_dir, &output_dir, &model, &request),
        Commands::Info { input, model } => cmd_info(&input, &model),
    };

    if let Err(message) = result {
        eprintln!("{} {}", "error:".red().bold(), message);
        process::exit(1);
    }
}

fn cmd_analyze(
    input_dir: &Path,
    output_dir: &Path,
    model: &Path,
    request: &str,
) -> Result<(), String> {
    let request_path = input_dir.join(request);
    if !request_path.exists() {
        return Err(format!(
            "request file '{}' not found in {}",
            request,
            input_dir.display()
        ));
    }

    let model_path = resolve_model(model)?;
    println!(
        "{} {}",
        "model:".cyan(),
        model_path.display().to_string().dimmed()
    );

    let analyzer = PersonaAnalyzer::from_model_file(&model_path).map_err(|e| e.to_string())?;
    let output = analyzer.analyze_file(&request_path);

    fs::create_dir_all(output_dir)
        .map_err(|e| format!("cannot create {}: {}", output_dir.display(), e))?;
    let output_path = output_dir.join(OUTPUT_FILE);

    let json = output.to_json_pretty().map_err(|e| e.to_string())?;
    fs::write(&output_path, json)
        .map_err(|e| format!("cannot write {}: {}", output_path.display(), e))?;

    if output.is_failure() {
        // The failure object still lands in the output file; report it
        // on the terminal too, but do not fail the process.
        println!("{} analysis degraded, see output file", "warning:".yellow().bold());
    } else if let Some(report) = output.report() {
        println!(
            "{} {} sections, {} refined subsections",
            "done:".green().bold(),
            report.extracted_sections.len(),
            report.subsection_analysis.len()
        );
    }
    println!("{} {}", "saved:".green(), output_path.display());

    Ok(())
}

fn cmd_info(input: &Path, model: &Path) -> Result<(), String> {
    let model_path = resolve_model(model)?;
    let analyzer = PersonaAnalyzer::from_model_file(&model_path).map_err(|e| e.to_string())?;

    let source = LopdfSource::open(input).map_err(|e| e.to_string())?;
    let structure = analyzer
        .document_structure(&source)
        .map_err(|e| e.to_string())?;

    if structure.title.is_empty() {
        println!("{} {}", "title:".cyan(), "(none detected)".dimmed());
    } else {
        println!("{} {}", "title:".cyan(), structure.title.bold());
    }

    if structure.outline.is_empty() {
        println!("{}", "no headings detected".dimmed());
    } else {
        for entry in &structure.outline {
            println!(
                "  {} {} {}",
                entry.level.to_string().yellow(),
                entry.text,
                format!("(p. {})", entry.page).dimmed()
            );
        }
    }

    Ok(())
}

/// Accept either a model file or a directory containing one; inside a
/// directory the first `*.json` entry (alphabetically) is used.
fn resolve_model(path: &Path) -> Result<PathBuf, String> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    if path.is_dir() {
        let mut candidates: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| format!("cannot read model directory {}: {}", path.display(), e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        candidates.sort();

        return candidates
            .into_iter()
            .next()
            .ok_or_else(|| format!("no *.json model file found in {}", path.display()));
    }

    Err(format!("model path '{}' does not exist", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model_picks_first_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_model.json"), "{}").unwrap();
        fs::write(dir.path().join("a_model.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.txt"), "x").unwrap();

        let resolved = resolve_model(dir.path()).unwrap();
        assert!(resolved.ends_with("a_model.json"));
    }

    #[test]
    fn test_resolve_model_missing_dir() {
        assert!(resolve_model(Path::new("/nonexistent/models")).is_err());
    }

    #[test]
    fn test_resolve_model_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_model(dir.path()).is_err());
    }
}

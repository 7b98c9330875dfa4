// src/output.rs
//! Writes the cover letter and analysis files for one generated application.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use tokio::fs;
use tracing::{info, warn};

use crate::error::OutputError;
use crate::extraction::JobPosting;
use crate::generation::{FitAnalysis, GeneratedApplication};

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub cover_letter: PathBuf,
    pub analysis: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRecord<'a> {
    #[serde(flatten)]
    analysis: &'a FitAnalysis,
    source_url: &'a str,
    generated_at: String,
    template_id: &'a str,
    job: &'a JobPosting,
}

/// Longest company segment kept in a filename, in characters.
pub const MAX_COMPANY_CHARS: usize = 50;

/// Company name made safe for a filename: word characters only, runs of spaces and
/// hyphens collapsed to `_`, at most `MAX_COMPANY_CHARS` characters.
pub fn sanitize_company(company: &str) -> String {
    let cleaned = DISALLOWED_CHARS.replace_all(company, "");
    let collapsed = SEPARATOR_RUNS.replace_all(cleaned.trim(), "_");
    let truncated: String = collapsed.chars().take(MAX_COMPANY_CHARS).collect();
    let truncated = truncated.trim_end_matches('_');
    if truncated.is_empty() {
        "unknown".to_string()
    } else {
        truncated.to_string()
    }
}

pub fn file_stem(company: &str, generated_at: &DateTime<Utc>) -> String {
    format!(
        "application_{}_{}",
        sanitize_company(company),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

pub fn analysis_json(job: &JobPosting, app: &GeneratedApplication) -> Result<String, OutputError> {
    let record = AnalysisRecord {
        analysis: &app.analysis,
        source_url: &job.source_url,
        generated_at: app.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        template_id: &app.template_id,
        job,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Writes both files or neither: a failed analysis write removes the cover letter.
pub async fn write_application(
    output_dir: &Path,
    job: &JobPosting,
    app: &GeneratedApplication,
) -> Result<WrittenFiles, OutputError> {
    let json = analysis_json(job, app)?;

    fs::create_dir_all(output_dir)
        .await
        .map_err(|source| OutputError::Write {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let stem = file_stem(&job.company, &app.generated_at);
    let cover_letter = output_dir.join(format!("{}_cover_letter.txt", stem));
    let analysis = output_dir.join(format!("{}_analysis.json", stem));

    write_file(&cover_letter, &app.cover_letter_text).await?;
    if let Err(e) = write_file(&analysis, &json).await {
        if let Err(cleanup) = fs::remove_file(&cover_letter).await {
            warn!(
                "Failed to remove partial output {}: {}",
                cover_letter.display(),
                cleanup
            );
        }
        return Err(e);
    }

    info!(
        "Written application files: {} and {}",
        cover_letter.display(),
        analysis.display()
    );
    Ok(WrittenFiles {
        cover_letter,
        analysis,
    })
}

async fn write_file(path: &Path, content: &str) -> Result<(), OutputError> {
    fs::write(path, content)
        .await
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })
}

// src/extraction/mod.rs
use serde::{Deserialize, Serialize};

use crate::error::{JobField, ParseError};

pub mod job_scraper;
pub mod page_signals;
pub mod platform;

pub use job_scraper::{extract_html, parse_job_url, JobScraper, ScraperSettings};
pub use page_signals::{contains_phrase, WorkArrangement};
pub use platform::{ruleset_for, Ruleset, SourcePlatform};

/// A scraped job posting. Immutable once the extractor hands it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub description: String,
    pub source_platform: SourcePlatform,
    pub source_url: String,
    pub location: String,
    pub salary: Option<String>,
    pub work_arrangement: WorkArrangement,
    pub requirements: Vec<String>,
    /// Known technology keywords mentioned in the description.
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl JobPosting {
    pub fn field(&self, field: JobField) -> &str {
        match field {
            JobField::Title => &self.title,
            JobField::Company => &self.company,
            JobField::Description => &self.description,
        }
    }
}

/// Best-effort extraction result: the posting plus every field that could not be located.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub posting: JobPosting,
    pub issues: Vec<ParseError>,
}

impl Extraction {
    /// Returns the field value, or the `ParseError` for it when the page did not provide one.
    pub fn require(&self, field: JobField) -> Result<&str, ParseError> {
        let value = self.posting.field(field);
        if value.is_empty() {
            Err(ParseError { field })
        } else {
            Ok(value)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

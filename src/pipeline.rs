// src/pipeline.rs
//! URL → extraction → generation → files on disk.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::environment::EnvironmentConfig;
use crate::error::{AppError, ParseError};
use crate::extraction::{JobPosting, JobScraper};
use crate::generation::{ContentGenerator, GeneratedApplication, ScoreWeighting, TemplateLibrary};
use crate::output::{write_application, WrittenFiles};
use crate::profile::ApplicantProfile;

/// Read-only state shared by every run.
pub struct PipelineContext {
    pub scraper: JobScraper,
    pub profile: ApplicantProfile,
    pub library: TemplateLibrary,
    pub weighting: ScoreWeighting,
    pub output_dir: PathBuf,
}

#[derive(Debug)]
pub struct ApplicationReport {
    pub posting: JobPosting,
    /// Fields the page did not provide; the run still completed.
    pub issues: Vec<ParseError>,
    pub application: GeneratedApplication,
    pub files: WrittenFiles,
}

impl PipelineContext {
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self, AppError> {
        let profile = match &config.profile_path {
            Some(path) => ApplicantProfile::load(path)?,
            None => {
                info!("No profile configured, using built-in profile");
                ApplicantProfile::builtin()
            }
        };

        let library = match &config.templates_path {
            Some(dir) => TemplateLibrary::from_dir(dir)?,
            None => TemplateLibrary::builtin()?,
        };

        Ok(Self {
            scraper: JobScraper::new(&config.scraper_settings())?,
            profile,
            library,
            weighting: config.weighting(),
            output_dir: config.output_path.clone(),
        })
    }
}

pub async fn run(url: &str, ctx: &PipelineContext) -> Result<ApplicationReport, AppError> {
    info!("Processing job application for: {}", url);

    let extraction = ctx.scraper.extract(url).await?;
    for issue in &extraction.issues {
        warn!("Continuing with partial posting: {}", issue);
    }

    let generator = ContentGenerator::new(&ctx.library).with_weighting(ctx.weighting);
    let application = generator.generate(&extraction.posting, &ctx.profile);
    let files = write_application(&ctx.output_dir, &extraction.posting, &application).await?;

    Ok(ApplicationReport {
        posting: extraction.posting,
        issues: extraction.issues,
        application,
        files,
    })
}

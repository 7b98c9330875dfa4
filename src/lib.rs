pub mod environment;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod output;
pub mod pipeline;
pub mod profile;

pub use environment::EnvironmentConfig;
pub use error::{AppError, FetchError, JobField, ParseError, RenderError};
pub use extraction::{Extraction, JobPosting, JobScraper, SourcePlatform};
pub use generation::{ContentGenerator, FitAnalysis, GeneratedApplication, TemplateLibrary};
pub use pipeline::{ApplicationReport, PipelineContext};
pub use profile::ApplicantProfile;

/// Convenience function for a one-off run with configuration from `config.yaml`.
pub async fn generate_application(
    url: &str,
    output_dir: Option<std::path::PathBuf>,
) -> Result<ApplicationReport, AppError> {
    let mut config =
        EnvironmentConfig::load(std::path::Path::new(environment::DEFAULT_CONFIG_FILE))?;
    if let Some(dir) = output_dir {
        config.output_path = dir;
    }

    let ctx = PipelineContext::from_config(&config)?;
    pipeline::run(url, &ctx).await
}

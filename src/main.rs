use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use tailored_apply::environment::DEFAULT_CONFIG_FILE;
use tailored_apply::pipeline::{self, ApplicationReport, PipelineContext};
use tailored_apply::EnvironmentConfig;

const PREVIEW_CHARS: usize = 500;

#[derive(Parser)]
#[command(name = "tailored-apply")]
#[command(about = "Turn a job posting URL into a tailored cover letter and fit analysis")]
struct Cli {
    /// Job posting URL. Prompts for URLs interactively when omitted
    #[arg(long)]
    url: Option<String>,

    /// Directory for the generated files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Applicant profile TOML file
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Directory of *.txt letter templates (must contain default.txt)
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Retry once on timeout or connection failure
    #[arg(long)]
    retry: bool,

    /// Weight the fit score by per-skill weights from the profile
    #[arg(long)]
    weighted: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let mut config = EnvironmentConfig::load(&cli.config).context("Failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_path = dir;
    }
    if let Some(profile) = cli.profile {
        config.profile_path = Some(profile);
    }
    if let Some(templates) = cli.templates_dir {
        config.templates_path = Some(templates);
    }
    config.retry_once |= cli.retry;
    config.weighted_scoring |= cli.weighted;

    let ctx = Arc::new(
        PipelineContext::from_config(&config).context("Failed to prepare profile and templates")?,
    );

    match cli.url {
        Some(url) => {
            if !run_job(ctx, url).await {
                std::process::exit(1);
            }
        }
        None => interactive(ctx).await?,
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
}

async fn interactive(ctx: Arc<PipelineContext>) -> Result<()> {
    println!("TailoredApply - job application content generator");
    println!("{}", "=".repeat(60));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nJob posting URL (blank or 'quit' to exit): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let url = line.trim();
        if url.is_empty() || url.eq_ignore_ascii_case("quit") || url.eq_ignore_ascii_case("exit")
        {
            break;
        }

        run_job(Arc::clone(&ctx), url.to_string()).await;
    }

    println!("Goodbye!");
    Ok(())
}

/// Runs one job on a background task and ticks progress until it finishes.
async fn run_job(ctx: Arc<PipelineContext>, url: String) -> bool {
    let mut job = tokio::spawn(async move { pipeline::run(&url, &ctx).await });
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    ticker.tick().await;

    eprint!("Working");
    let outcome = loop {
        tokio::select! {
            result = &mut job => break result,
            _ = ticker.tick() => {
                eprint!(".");
                let _ = std::io::stderr().flush();
            }
        }
    };
    eprintln!();

    match outcome {
        Ok(Ok(report)) => {
            print_report(&report);
            true
        }
        Ok(Err(e)) => {
            println!("❌ {}: {}", e.kind(), e);
            println!("No files were written.");
            false
        }
        Err(e) => {
            error!("Job task failed: {}", e);
            false
        }
    }
}

fn print_report(report: &ApplicationReport) {
    let posting = &report.posting;
    let analysis = &report.application.analysis;

    println!("✅ {} at {}", posting.title, posting.company);
    println!(
        "   Fit score: {:.0}% ({} template)",
        analysis.fit_score * 100.0,
        report.application.template_id
    );
    if !analysis.matched_skills.is_empty() {
        println!("   Matched skills: {}", analysis.matched_skills.join(", "));
    }
    for issue in &report.issues {
        println!("   ⚠ {}", issue);
    }

    let letter = &report.application.cover_letter_text;
    println!("\n{}", "=".repeat(60));
    if letter.chars().count() > PREVIEW_CHARS {
        let preview: String = letter.chars().take(PREVIEW_CHARS).collect();
        println!("{}...", preview);
    } else {
        println!("{}", letter);
    }
    println!("{}", "=".repeat(60));

    println!("Cover letter: {}", report.files.cover_letter.display());
    println!("Analysis:     {}", report.files.analysis.display());
}

mod analyze;
mod app;
mod classify;
mod config;
mod errors;
mod export;
mod registry;
mod results;
mod selection;
mod session;
mod submit;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyze::HttpAnalyzeClient;
use crate::app::Shortlist;
use crate::classify::ClassifiedEntry;
use crate::config::Config;
use crate::errors::AppError;
use crate::registry::{CandidateDocument, JobDescriptor};
use crate::selection::FeedbackDimension;
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shortlist v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();

    let backend = Arc::new(HttpAnalyzeClient::new(config.analysis_url.clone()));

    // SESSION_FILE="" opts out of persistence for a throwaway run.
    let session: Arc<dyn SessionStore> = if config.session_path.is_empty() {
        Arc::new(MemorySessionStore::default())
    } else {
        Arc::new(FileSessionStore::new(config.session_path.clone()))
    };
    let mut app = Shortlist::new(backend.clone(), session);

    // `shortlist clear` ends the session: every persisted facet is erased.
    if args.first().map(String::as_str) == Some("clear") {
        app.end_session().await?;
        info!("Session cleared");
        return Ok(());
    }

    let restored = app.restore().await;
    if !restored.file_names.is_empty() || restored.job_name.is_some() {
        info!(
            "Restored session: {} CVs, job '{}', {} results",
            restored.file_names.len(),
            restored.job_name.as_deref().unwrap_or("<none>"),
            restored.results.len()
        );
    }

    let cli = parse_args(&args)?;
    app.set_cutoff(cli.cutoff)?;

    if let Some(show) = &cli.show {
        for token in show.split(',') {
            let dimension = FeedbackDimension::from_wire(token.trim())
                .with_context(|| format!("Unknown feedback dimension '{token}'"))?;
            app.toggle_dimension(dimension, true)?;
        }
    }

    // With no inputs, just render the restored results at the chosen cutoff.
    if cli.paths.is_empty() {
        if app.results().is_empty() {
            bail!(
                "Usage: shortlist <job-description> <cv>... [--cutoff N] [--show d1,d2] | shortlist clear"
            );
        }
        print_table(&app.classified());
        return Ok(());
    }

    if cli.paths.len() < 2 {
        bail!("Provide the job description followed by at least one CV");
    }

    if !backend.health().await {
        warn!(
            "Analysis service at {} did not answer the health probe",
            config.analysis_url
        );
    }

    let mut paths = cli.paths.into_iter();
    let jd = read_document(&paths.next().unwrap_or_default()).await?;
    app.set_job_description(JobDescriptor {
        display_name: jd.name,
        content: jd.content,
    })
    .await?;

    let mut documents = Vec::new();
    for path in paths {
        documents.push(read_document(&path).await?);
    }
    app.add_documents(documents).await?;

    let count = app.submit().await?;
    info!("Analyzed {count} CVs");

    print_table(&app.classified());

    match app.export() {
        Ok(bundle) => {
            tokio::fs::write(&bundle.filename, &bundle.bytes).await?;
            info!("Wrote {} ({} bytes)", bundle.filename, bundle.bytes.len());
        }
        Err(e @ (AppError::NothingAnalyzed | AppError::NoMatchesAboveCutoff)) => warn!("{e}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

struct CliArgs {
    paths: Vec<String>,
    cutoff: i64,
    show: Option<String>,
}

/// Usage: shortlist <job-description> <cv>... [--cutoff N] [--show d1,d2]
fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cutoff: i64 = 70;
    let mut show = None;
    let mut paths = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cutoff" => {
                let value = iter.next().context("--cutoff requires a value")?;
                cutoff = value.parse().context("--cutoff must be an integer")?;
            }
            "--show" => {
                show = Some(iter.next().context("--show requires a value")?.clone());
            }
            _ => paths.push(arg.clone()),
        }
    }

    Ok(CliArgs {
        paths,
        cutoff,
        show,
    })
}

async fn read_document(path: &str) -> Result<CandidateDocument> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {path}"))?;
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    Ok(CandidateDocument::new(name, bytes))
}

fn print_table(entries: &[ClassifiedEntry]) {
    for entry in entries {
        let marker = if entry.passes { "PASS" } else { "    " };
        match &entry.record.error {
            Some(error) => println!("{marker}    err   {}  ({error})", entry.filename),
            None => println!("{marker}  {:>5.1}%  {}", entry.score, entry.filename),
        }
    }
}

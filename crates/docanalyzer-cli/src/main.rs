use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;

use docanalyzer::broadcast::{ItemPhase, ItemProgressBroadcaster, ItemProgressEvent};
use docanalyzer::config::{apply_env_overrides, load_config, Config};
use docanalyzer::export;
use docanalyzer::observability::init_tracing;
use docanalyzer::pipeline::{BroadcastProgress, Pipeline, PipelineConfig, RunSummary};
use docanalyzer::session::{AnalysisMode, Session};

#[derive(Parser, Debug)]
#[command(name = "docanalyzer", author, version, about, long_about = None)]
struct Cli {
    /// JSON config file; built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize each document on its own.
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Answer the configured checklist from the attached documents.
    Check {
        /// Attach a document to a question, as ID=PATH.
        #[arg(long = "file", value_name = "ID=PATH", value_parser = parse_file_arg)]
        files: Vec<(u32, PathBuf)>,

        /// Additional context for a question, as ID=TEXT.
        #[arg(long = "context", value_name = "ID=TEXT", value_parser = parse_context_arg)]
        contexts: Vec<(u32, String)>,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Print the configured checklist.
    Questions,
    /// Serve the HTTP routes.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Directory for the exported report (default: the configured one).
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print results instead of writing a report.
    #[arg(long)]
    no_export: bool,
}

fn split_id(value: &str) -> Result<(u32, &str), String> {
    let (id, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{}'", value))?;
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid question id '{}'", id))?;
    Ok((id, rest))
}

fn parse_file_arg(value: &str) -> Result<(u32, PathBuf), String> {
    let (id, path) = split_id(value)?;
    if path.is_empty() {
        return Err("missing file path".to_string());
    }
    Ok((id, PathBuf::from(path)))
}

fn parse_context_arg(value: &str) -> Result<(u32, String), String> {
    let (id, text) = split_id(value)?;
    Ok((id, text.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config).context("Invalid environment override")?;
    init_tracing(&config.logging).context("Failed to initialize tracing")?;

    match cli.command {
        Command::Analyze { files, export } => run_analyze(&config, &files, &export).await,
        Command::Check {
            files,
            contexts,
            export,
        } => run_check(&config, &files, &contexts, &export).await,
        Command::Questions => {
            for question in &config.checklist.questions {
                println!("{:>3}. {}", question.id, question.text);
            }
            Ok(())
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            docanalyzer::server::serve(&config)
                .await
                .with_context(|| format!("Server on {} stopped", config.server.bind))
        }
    }
}

async fn run_analyze(config: &Config, files: &[PathBuf], export_args: &ExportArgs) -> Result<()> {
    let mut session = Session::documents();

    let report = session.admit_files(files);
    for rejection in &report.rejected {
        eprintln!("Skipped {}: {}", rejection.name, rejection.reason);
    }
    if report.admitted.is_empty() {
        bail!("None of the given files can be analyzed");
    }

    analyze_and_export(config, &mut session, export_args).await
}

async fn run_check(
    config: &Config,
    files: &[(u32, PathBuf)],
    contexts: &[(u32, String)],
    export_args: &ExportArgs,
) -> Result<()> {
    let mut session = Session::checklist(&config.checklist);

    for (id, path) in files {
        if let Err(e) = session.admit_for_question(*id, path, None) {
            eprintln!("Skipped {} for question {}: {}", path.display(), id, e);
        }
    }
    for (id, text) in contexts {
        session
            .set_context(*id, text)
            .with_context(|| format!("Cannot set context for question {}", id))?;
    }

    analyze_and_export(config, &mut session, export_args).await
}

async fn analyze_and_export(
    config: &Config,
    session: &mut Session,
    export_args: &ExportArgs,
) -> Result<()> {
    let summary = run_pipeline(config, session).await?;
    print_summary(session, &summary);

    if session.results().is_empty() {
        eprintln!("No results to export");
        return Ok(());
    }

    if export_args.no_export {
        print!("{}", export::format_results(session.results())?);
        return Ok(());
    }

    let directory = export_args
        .export_dir
        .clone()
        .unwrap_or_else(|| config.export.resolve_directory());
    let path = export::write_report(
        session,
        &config.export,
        &directory,
        chrono::Local::now().date_naive(),
    )?;
    println!("Exported results to {}", path.display());

    Ok(())
}

async fn run_pipeline(config: &Config, session: &mut Session) -> Result<RunSummary> {
    let broadcaster = ItemProgressBroadcaster::default();
    let mut receiver = broadcaster.subscribe();

    let printer = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Progress output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let pipeline = Pipeline::from_config(&PipelineConfig::from_config(config));
    let progress = BroadcastProgress::new(broadcaster);
    let result = pipeline.run(session, &progress).await;

    // Closing the channel ends the printer once it has drained.
    drop(progress);
    printer.await.context("Progress printer panicked")?;

    Ok(result?)
}

fn print_event(event: &ItemProgressEvent) {
    match event.phase {
        ItemPhase::Completed => {
            let verdict = match event.confirmed {
                Some(true) => " (confirmed)",
                Some(false) => " (not confirmed)",
                None => "",
            };
            eprintln!(
                "[{:>3.0}%] {}: completed{}",
                event.progress.unwrap_or_default(),
                event.name,
                verdict
            );
        }
        ItemPhase::Failed => eprintln!(
            "[{:>3.0}%] {}: failed: {}",
            event.progress.unwrap_or_default(),
            event.name,
            event.error.as_deref().unwrap_or("unknown error")
        ),
        ItemPhase::Warning => eprintln!("       {}: warning: {}", event.name, event.message),
        _ => eprintln!("       {}: {}", event.name, event.message),
    }
}

fn print_summary(session: &Session, summary: &RunSummary) {
    println!(
        "Analyzed {} {}: {} completed, {} failed",
        summary.total,
        match session.mode() {
            AnalysisMode::Documents => "document(s)",
            AnalysisMode::Checklist => "question(s)",
        },
        summary.completed,
        summary.failed
    );

    if session.mode() == AnalysisMode::Checklist {
        let confirmed = session
            .questions()
            .iter()
            .filter(|q| q.confirmed == Some(true))
            .count();
        let not_confirmed = session
            .questions()
            .iter()
            .filter(|q| q.confirmed == Some(false))
            .count();
        println!("Confirmed: {}, not confirmed: {}", confirmed, not_confirmed);
    }
}

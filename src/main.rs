use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Instrument};
use tracing_subscriber::EnvFilter;

mod analysis;
mod catalog;
mod chart;
mod client;
mod config;
mod error;
mod export;
mod heatmap;
mod intake;
mod models;
mod pareto;
mod plan;
mod prompt;
mod report;

use analysis::{ParetoRun, PlanRequest};
use client::OpenAiClient;
use config::AiConfig;
use error::AnalysisError;
use models::ProblemEntry;
use prompt::PlanShape;

#[derive(Parser)]
#[command(name = "defect-pareto")]
#[command(about = "Pareto analysis and AI action plans for PVC pipe production defects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known problems and machine parts
    Catalog,
    /// Rank problems and show the Pareto chart
    Summary {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        exports: ExportArgs,
    },
    /// Rank problems and ask the AI expert for an action plan
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        exports: ExportArgs,
        #[arg(long, value_enum, default_value_t = PlanShape::Table)]
        shape: PlanShape,
        #[arg(long, default_value_t = pareto::DEFAULT_TOP_N)]
        top: usize,
        /// Also request an illustration (narrative plans only)
        #[arg(long)]
        image: bool,
        #[arg(long, default_value = "pareto_report.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// CSV with problem,count[,machine_number,machine_part,date] columns
    #[arg(long)]
    csv: Option<PathBuf>,
    /// A single entry as NAME=COUNT, may be repeated
    #[arg(long = "entry", value_name = "NAME=COUNT")]
    entries: Vec<String>,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long)]
    export_summary: Option<PathBuf>,
    #[arg(long)]
    export_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Catalog => {
            println!("Problems:");
            for problem in catalog::PROBLEM_OPTIONS {
                println!("- {problem} (parts: {})", catalog::parts_for(problem).join(", "));
            }
            println!("Machine parts:");
            for part in catalog::MACHINE_PARTS {
                println!("- {part}");
            }
        }
        Commands::Summary { input, exports } => {
            let Some(run) = prepare_run(&input, today)? else {
                return Ok(());
            };
            println!("{}", report::summary_table(&run));
            println!("{}", chart::render_pareto(&run.summary, &run.partition));
            println!("{}", chart::render_heatmap(&run.heatmap));
            write_exports(&run, &exports)?;
        }
        Commands::Analyze {
            input,
            exports,
            shape,
            top,
            image,
            out,
        } => {
            let config = AiConfig::from_env()?;
            let client = OpenAiClient::new(config)?;

            let Some(run) = prepare_run(&input, today)? else {
                return Ok(());
            };
            let span = tracing::info_span!("analysis", run_id = %run.run_id);
            async {
                println!("{}", chart::render_pareto(&run.summary, &run.partition));
                write_exports(&run, &exports)?;

                let request = PlanRequest {
                    shape,
                    top_n: top,
                    with_image: image,
                };
                let outcome = analysis::request_plan(&client, &run, request).await;
                if let Err(err) = &outcome.plan {
                    eprintln!("Error: {err}");
                    if let Some(raw) = err.raw_response() {
                        eprintln!("Raw response:\n{raw}");
                    }
                }

                let document = report::build_report(&run, Some(&outcome), today);
                std::fs::write(&out, document)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                info!(path = %out.display(), "report written");
                anyhow::Ok(())
            }
            .instrument(span)
            .await?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_entries(input: &InputArgs, today: NaiveDate) -> anyhow::Result<Vec<ProblemEntry>> {
    let mut entries = match &input.csv {
        Some(path) => intake::read_csv(path, today)?,
        None => Vec::new(),
    };
    for raw in &input.entries {
        entries.push(intake::parse_entry_arg(raw, today)?);
    }
    Ok(entries)
}

/// Input problems end the run with a warning; anything else is an error.
fn prepare_run(input: &InputArgs, today: NaiveDate) -> anyhow::Result<Option<ParetoRun>> {
    let entries = match load_entries(input, today) {
        Ok(entries) => entries,
        Err(err) => {
            let is_warning = err
                .downcast_ref::<AnalysisError>()
                .is_some_and(|cause| cause.is_input_warning());
            if !is_warning {
                return Err(err);
            }
            warn!(error = %err, "input rejected");
            println!("Warning: {err:#}");
            return Ok(None);
        }
    };

    match ParetoRun::prepare(entries) {
        Ok(run) => Ok(Some(run)),
        Err(err) if err.is_input_warning() => {
            warn!(error = %err, "input rejected");
            println!("Warning: {err}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn write_exports(run: &ParetoRun, exports: &ExportArgs) -> anyhow::Result<()> {
    if let Some(path) = &exports.export_summary {
        export::export_summary(path, &run.summary, &run.partition)?;
        println!("Pareto data written to {}.", path.display());
    }
    if let Some(path) = &exports.export_log {
        export::export_entry_log(path, &run.entries)?;
        println!("Entry log written to {}.", path.display());
    }
    Ok(())
}

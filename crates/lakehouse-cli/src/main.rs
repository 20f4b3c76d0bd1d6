mod logging;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lakehouse_eval::render_markdown;
use lakehouse_pipeline::{Pipeline, PipelineConfig, PipelineError};
use thiserror::Error;

use logging::{LoggingError, init_logging};

#[derive(Debug, Error)]
enum CliError {
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
    #[error("quality checks failed: {}", .0.join(", "))]
    QualityFailed(Vec<String>),
}

#[derive(Parser, Debug)]
#[command(name = "lakehouse", version, about = "Synthetic SaaS analytics lakehouse pipeline")]
struct Cli {
    /// Also write JSON logs to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate, load, transform, check and export.
    Run(RunArgs),
    /// Generate the raw files only.
    Generate(GenerateArgs),
    /// Run the quality checks against the existing warehouse.
    Check(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Pipeline configuration file.
    #[arg(long, default_value = "configs/pipeline.toml")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Delete the warehouse before loading.
    #[arg(long, conflicts_with = "no_reset")]
    reset: bool,
    /// Keep the existing warehouse file.
    #[arg(long)]
    no_reset: bool,
    /// Stop before export when a quality check fails.
    #[arg(long, default_value_t = false)]
    halt_on_quality_failure: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Write raw files here instead of `<data_dir>/raw`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::Generate(args) => generate(args),
        Command::Check(args) => check(args).await,
    };
    if let Err(err) = &result {
        tracing::error!(event = "command_failed", error = %err);
    }
    result
}

async fn run(args: RunArgs) -> Result<(), CliError> {
    let mut config = PipelineConfig::load(&args.config.config).map_err(PipelineError::from)?;
    if args.reset {
        config.pipeline.reset_database = true;
    }
    if args.no_reset {
        config.pipeline.reset_database = false;
    }
    if args.halt_on_quality_failure {
        config.pipeline.halt_on_quality_failure = true;
    }

    let outcome = Pipeline::new(config).run().await?;
    for table in &outcome.exported {
        println!("{}\t{} rows", table.path.display(), table.rows);
    }
    println!("{}", outcome.quality_files.markdown_path.display());
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<(), CliError> {
    let config = PipelineConfig::load(&args.config.config).map_err(PipelineError::from)?;
    let result = Pipeline::new(config).generate(args.out_dir.as_deref())?;
    for table in &result.report.tables {
        println!(
            "{}\t{} rows",
            result.raw_dir.join(&table.file).display(),
            table.rows
        );
    }
    Ok(())
}

async fn check(args: ConfigArgs) -> Result<(), CliError> {
    let config = PipelineConfig::load(&args.config).map_err(PipelineError::from)?;
    let report = Pipeline::new(config).check().await?;
    print!("{}", render_markdown(&report));
    if report.passed() {
        Ok(())
    } else {
        Err(CliError::QualityFailed(
            report
                .failed_checks()
                .into_iter()
                .map(str::to_string)
                .collect(),
        ))
    }
}

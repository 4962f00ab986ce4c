use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_signatures::app::{
    App, LogSink, PrepareRequest, PrepareResult, VisualizeRequest, VisualizeResult,
};
use kira_signatures::config::ConfigLoader;
use kira_signatures::domain::OutputFormat;
use kira_signatures::error::SignatureError;
use kira_signatures::output::{JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "kira-sig")]
#[command(about = "Compare mutational signature activities of a query cohort against a reference")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(short, long, global = true, help = "Use verbose logging")]
    verbose: bool,

    #[arg(long, global = true, help = "Config file (default: ./kira-sig.json if present)")]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Render reconciled signature activities of a query and a reference matrix")]
    Visualize(VisualizeArgs),
    #[command(about = "Build a disease-annotated reference matrix from raw activity files")]
    Prepare(PrepareArgs),
}

#[derive(Args)]
struct VisualizeArgs {
    #[arg(help = "Query signature activities (tsv, optionally gzipped)")]
    input: Utf8PathBuf,

    #[arg(long, value_name = "file", help = "Reference signature activities")]
    reference: Utf8PathBuf,

    #[arg(short, long, value_name = "file", help = "Output pathname")]
    output: Utf8PathBuf,

    #[arg(long, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
}

#[derive(Args)]
struct PrepareArgs {
    #[arg(long, value_name = "file", help = "Sample metadata table")]
    sample_info: Utf8PathBuf,

    #[arg(required = true, help = "Raw signature activity files")]
    activities: Vec<Utf8PathBuf>,

    #[arg(short, long, value_name = "file", help = "Output pathname (default: stdout)")]
    output: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SignatureError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SignatureError) -> u8 {
    match error {
        SignatureError::EmptyHeader
        | SignatureError::MissingHeaders(_)
        | SignatureError::InvalidSignatureName(_)
        | SignatureError::InvalidSampleName(_)
        | SignatureError::RowLength { .. }
        | SignatureError::MissingMetadataColumn(_)
        | SignatureError::Csv(_) => 2,
        SignatureError::InvalidContribution { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "warn,kira_signatures=info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let app = App::new(config);

    match cli.command {
        Commands::Visualize(args) => run_visualize(args, &app, output_mode),
        Commands::Prepare(args) => run_prepare(args, &app, output_mode),
    }
}

fn run_visualize(args: VisualizeArgs, app: &App, output_mode: OutputMode) -> miette::Result<()> {
    let request = VisualizeRequest {
        query: args.input,
        reference: args.reference,
        output: args.output,
        format: args.format,
    };

    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.visualize(request, &JsonOutput)?;
            JsonOutput::print_visualize(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result = app.visualize(request, &LogSink)?;
            print_visualize_summary(&result);
        }
    }
    Ok(())
}

fn run_prepare(args: PrepareArgs, app: &App, output_mode: OutputMode) -> miette::Result<()> {
    if args.output.is_none() && matches!(output_mode, OutputMode::NonInteractive) {
        return Err(miette::Report::msg(
            "--non-interactive prints a JSON summary on stdout; pass --output for the matrix",
        ));
    }

    let request = PrepareRequest {
        sample_info: args.sample_info,
        activities: args.activities,
        output: args.output,
    };

    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.prepare(request, &JsonOutput)?;
            JsonOutput::print_prepare(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result = app.prepare(request, &LogSink)?;
            print_prepare_summary(&result);
        }
    }
    Ok(())
}

fn print_visualize_summary(result: &VisualizeResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    eprintln!("{cyan}kira-sig visualize{reset}");
    eprintln!(
        "{green}signatures: {}, reference samples: {}, query samples: {}{reset}",
        result.signatures, result.reference_samples, result.query_samples
    );
    eprintln!("{green}wrote {} ({}){reset}", result.output, result.format);
}

fn print_prepare_summary(result: &PrepareResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    eprintln!("{cyan}kira-sig prepare{reset}");
    eprintln!(
        "{green}inputs: {}, samples: {}, signatures: {}{reset}",
        result.inputs, result.samples, result.signatures
    );
    if !result.unmatched.is_empty() {
        eprintln!(
            "{yellow}samples without metadata: {}{reset}",
            result.unmatched.len()
        );
    }
    if let Some(path) = &result.output {
        eprintln!("{green}wrote {path}{reset}");
    }
}

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use commandr::{
    Commandr, OnMissingRequired, ProcessEnvironment, ResolveError, ResolveOptions,
};
use commandr_loader::{load_schema, save_schema};
use serde_json::json;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "commandr")]
#[command(about = "Resolve parameters from CLI flags, environment variables, and defaults")]
struct Cli {
    /// Log resolution decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a schema against arguments and the process environment.
    Resolve(ResolveArgs),
    /// Validate one or more schema definition files.
    Validate(ValidateArgs),
    /// Rewrite a schema definition in another format (JSON or YAML).
    Convert(ConvertArgs),
    /// Print the help text generated for a schema.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Schema definition file (.json, .yaml or .yml).
    #[arg(long)]
    schema: PathBuf,
    /// Report the source tier (CLI, ENV, DEFAULT, NONE) next to each value.
    #[arg(long)]
    include_source: bool,
    /// Print usage and exit with status 1 when a required value is missing.
    #[arg(long)]
    exit_on_missing: bool,
    /// Arguments for the schema's own parser, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Source definition file.
    input: PathBuf,
    /// Destination file; its extension selects the format.
    output: PathBuf,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Schema definition file.
    #[arg(long)]
    schema: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(args),
        Command::Validate(args) => run_validate(args),
        Command::Convert(args) => run_convert(args),
        Command::Show(args) => run_show(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

// RUST_LOG directives win; without them --verbose picks DEBUG over WARN.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn load_app(path: &Path) -> Result<Commandr, String> {
    load_schema(path)
        .map(Commandr::new)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let mode = if args.exit_on_missing {
        OnMissingRequired::Terminate
    } else {
        OnMissingRequired::Raise
    };
    let app = load_app(&args.schema)?
        .with_options(ResolveOptions::new().on_missing_required(mode));

    let argv = std::iter::once(app.schema().name().to_string()).chain(args.args);
    let resolution = match app.parse_from(argv, &ProcessEnvironment) {
        Ok(resolution) => resolution,
        Err(ResolveError::Cli(err)) => err.exit(),
        Err(err) => return Err(err.to_string()),
    };

    let output = json!({
        "values": resolution.to_json(args.include_source),
        "configs": resolution.configs(),
    });
    let text = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("JSON serialization failed: {err}"))?;
    println!("{text}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failed = 0usize;
    for path in &args.inputs {
        match load_schema(path) {
            Ok(schema) => println!(
                "ok      {} ({}: {} parameters)",
                path.display(),
                schema.name(),
                schema.len()
            ),
            Err(err) => {
                failed += 1;
                println!("invalid {}: {err}", path.display());
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} definitions failed validation",
            args.inputs.len()
        ));
    }
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), String> {
    let schema = load_schema(&args.input)
        .map_err(|err| format!("Failed to load schema '{}': {err}", args.input.display()))?;
    save_schema(&schema, &args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let app = load_app(&args.schema)?;
    print!("{}", app.surface().render_help());
    Ok(())
}

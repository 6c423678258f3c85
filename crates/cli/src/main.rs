mod render;
mod session;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use irlab_core::{parse_pass_list, Config, DisplayMode, ExecutionResult, PassCatalog};
use irlab_toy::{toy_engine, ToyPass};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Interactive compiler pass pipeline explorer.
#[derive(Parser)]
#[command(name = "irlab", version, about = "Interactive compiler pass pipeline explorer")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to an irlab.toml config file (default: ./irlab.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available passes
    Passes,

    /// Run a pass pipeline over an IR file once
    Run {
        /// Path to the IR source file, or '-' for stdin
        file: PathBuf,
        /// Comma-separated pass pipeline, applied left to right
        #[arg(short, long, default_value = "")]
        passes: String,
    },

    /// Render a pass pipeline as a reproducible command line
    Query {
        /// Comma-separated pass pipeline
        #[arg(short, long)]
        passes: String,
        /// Collapse consecutive repeats of the same pass
        #[arg(long)]
        condensed: bool,
    },

    /// Start an interactive pipeline session
    Session {
        /// Optional IR file to load as the initial input
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(cli.config.as_deref(), cli.output, cli.quiet);

    match cli.command {
        Commands::Passes => {
            cmd_passes(cli.output);
        }
        Commands::Run { file, passes } => {
            cmd_run(&file, &passes, cli.output, cli.quiet);
        }
        Commands::Query { passes, condensed } => {
            cmd_query(&passes, condensed, &config, cli.output);
        }
        Commands::Session { file } => {
            session::run_session(file.as_deref(), &config, cli.output, cli.quiet);
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(explicit: Option<&Path>, output: OutputFormat, quiet: bool) -> Config {
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match Config::discover(explicit, &dir) {
        Ok(config) => config,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// Read an input file, treating `-` as stdin.
pub(crate) fn read_source(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

fn cmd_passes(output: OutputFormat) {
    let engine = toy_engine();
    let available = engine.catalog().list_available();
    match output {
        OutputFormat::Text => {
            let width = available.iter().map(|p| p.as_str().len()).max().unwrap_or(0);
            for pass in &available {
                let summary = ToyPass::from_name(pass.as_str())
                    .map(ToyPass::summary)
                    .unwrap_or("");
                println!("{:<width$}  {}", pass.as_str(), summary, width = width);
            }
        }
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = available
                .iter()
                .map(|pass| {
                    serde_json::json!({
                        "name": pass,
                        "summary": ToyPass::from_name(pass.as_str()).map(ToyPass::summary),
                    })
                })
                .collect();
            print_json(&rows);
        }
    }
}

fn cmd_run(file: &Path, passes: &str, output: OutputFormat, quiet: bool) {
    let input = match read_source(file) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let sequence = parse_pass_list(passes);
    let engine = toy_engine();
    let result = engine.run(&input, sequence.as_slice());

    match output {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => match &result {
            ExecutionResult::Success { output: text } => print!("{}", text),
            ExecutionResult::Failure(failure) => {
                report_error(&render::failure_report(failure), output, quiet);
            }
        },
    }
    if !result.is_success() {
        process::exit(1);
    }
}

fn cmd_query(passes: &str, condensed: bool, config: &Config, output: OutputFormat) {
    let sequence = parse_pass_list(passes);
    let mode = if condensed {
        DisplayMode::Condensed
    } else {
        config.session.display_mode
    };
    let query = sequence.to_query(&config.query.tool);
    let projected = sequence.project(mode);

    match output {
        OutputFormat::Text => {
            println!("{}", query);
            println!("{}", render::pass_list(&projected));
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "query": query,
                "passes": sequence,
                "display_mode": mode,
                "style_class": mode.style_class(),
                "projected": projected,
            }));
        }
    }
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization error: {}\"}}", e));
    println!("{}", pretty);
}

/// Report an error respecting output format and quiet mode.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

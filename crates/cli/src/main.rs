mod commands;
mod outline;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use commands::parse::cmd_parse;
use commands::render::cmd_render;

/// Exit code for malformed input and I/O failures.
pub(crate) const EXIT_FAILURE: i32 = 1;
/// Exit code when the dump has no header line to parse.
pub(crate) const EXIT_NOTHING_PARSED: i32 = 3;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Mono exception dump parser.
#[derive(Parser)]
#[command(name = "monotrace", version, about = "Mono exception dump parser")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an exception dump and print its exception chain
    Parse {
        /// Path to the dump file; reads stdin when omitted or "-"
        file: Option<PathBuf>,
        /// Convert CRLF line endings to LF before parsing
        #[arg(long)]
        crlf: bool,
    },

    /// Parse an exception dump and print it back in canonical Mono form
    Render {
        /// Path to the dump file; reads stdin when omitted or "-"
        file: Option<PathBuf>,
        /// Convert CRLF line endings to LF before parsing
        #[arg(long)]
        crlf: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Parse { file, crlf } => {
            cmd_parse(file.as_deref(), crlf, cli.output, cli.quiet);
        }
        Commands::Render { file, crlf } => {
            cmd_render(file.as_deref(), crlf, cli.output, cli.quiet);
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Read the dump from `file`, or from stdin for `None` and `-`.
pub(crate) fn read_input(file: Option<&Path>, crlf: bool) -> std::io::Result<String> {
    let mut text = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if crlf {
        text = text.replace("\r\n", "\n");
    }
    log::debug!("read {} bytes of input", text.len());
    Ok(text)
}

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

pub(crate) mod parse;
pub(crate) mod render;

use std::path::Path;
use std::process;

use monotrace_core::ExceptionResult;

use crate::{read_input, report_error, OutputFormat, EXIT_FAILURE, EXIT_NOTHING_PARSED};

/// Read and parse a dump, exiting the process on any non-success outcome.
pub(crate) fn load(
    file: Option<&Path>,
    crlf: bool,
    output: OutputFormat,
    quiet: bool,
) -> ExceptionResult {
    let source = file.map_or_else(|| "<stdin>".to_owned(), |p| p.display().to_string());

    let text = match read_input(file, crlf) {
        Ok(t) => t,
        Err(e) => {
            let msg = format!("error reading '{}': {}", source, e);
            report_error(&msg, output, quiet);
            process::exit(EXIT_FAILURE);
        }
    };

    match monotrace_core::parse(&text) {
        Ok(Some(root)) => root,
        Ok(None) => {
            report_error(
                &format!("exception could not be parsed: '{}' has no header line", source),
                output,
                quiet,
            );
            process::exit(EXIT_NOTHING_PARSED);
        }
        Err(e) => {
            match output {
                // Machine consumers get the error object even under --quiet.
                OutputFormat::Json => {
                    let err_json = serde_json::to_string_pretty(&e.to_json_value())
                        .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
                    eprintln!("{}", err_json);
                }
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("error: {}", e);
                    }
                }
            }
            process::exit(EXIT_FAILURE);
        }
    }
}

use std::path::Path;

use crate::outline::outline;
use crate::OutputFormat;

pub(crate) fn cmd_parse(file: Option<&Path>, crlf: bool, output: OutputFormat, quiet: bool) {
    let root = super::load(file, crlf, output, quiet);
    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&root)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => print!("{}", outline(&root)),
    }
}

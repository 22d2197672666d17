use std::path::Path;

use crate::OutputFormat;

pub(crate) fn cmd_render(file: Option<&Path>, crlf: bool, output: OutputFormat, quiet: bool) {
    let root = super::load(file, crlf, output, quiet);
    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({ "text": root.to_string() });
            println!("{}", value);
        }
        OutputFormat::Text => print!("{}", root),
    }
}

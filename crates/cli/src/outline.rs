//! Human-readable outline of a parsed exception chain.

use monotrace_core::{ExceptionMethod, ExceptionResult};

/// One block per exception, outermost first, frames numbered from the
/// entry point.
pub(crate) fn outline(root: &ExceptionResult) -> String {
    let mut out = String::new();
    if let Some(log) = &root.log_message {
        out.push_str(&format!("log: {}\n", log));
    }
    for (depth, node) in root.chain().enumerate() {
        let indent = "  ".repeat(depth);
        let label = if depth == 0 { "exception" } else { "inner" };
        out.push_str(&format!("{}{}: {}\n", indent, label, node.type_name));
        out.push_str(&format!("{}  message: {}\n", indent, node.message));
        if node.stacktrace.is_empty() {
            out.push_str(&format!("{}  (no frames)\n", indent));
        }
        for (i, frame) in node.stacktrace.iter().enumerate() {
            out.push_str(&format!("{}  #{:<2} {}\n", indent, i, call_site(frame)));
        }
    }
    out
}

/// The frame's bare call site, tagged with the wrapper kind it came from.
fn call_site(frame: &ExceptionMethod) -> String {
    let tag = if frame.is_native_wrapper {
        " <native>"
    } else if frame.is_dynamic_method {
        " <dynamic>"
    } else {
        ""
    };
    format!("{:#}{}", frame, tag)
}

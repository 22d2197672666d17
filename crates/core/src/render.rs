//! Canonical Mono-dialect text for a parsed tree.
//!
//! Source locations are not kept by the parser, so frames that carry an IL
//! offset are printed with Mono's placeholder location. Parsing the output
//! again yields an equal tree, provided the dump names an exception in its
//! header: lines the parser skipped are not reproduced, so a dump whose
//! only mention of `Exception` sat on such a line renders to text that
//! [`crate::parse`] rejects.
//!
//! The alternate form of a frame (`{:#}`) is the bare call site: no wrapper
//! marker and no placeholder location.

use std::fmt;

use crate::frame::{split_type_modifiers, DYNAMIC_METHOD, NATIVE_WRAPPER};
use crate::header::INNER_EXCEPTION_MARKER;
use crate::model::{ExceptionMethod, ExceptionParameter, ExceptionResult};
use crate::parse::INNER_BOUNDARY;

const UNKNOWN_LOCATION: &str = "<filename unknown>:0";

impl fmt::Display for ExceptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(log) = &self.log_message {
            write!(f, "{}: ", log)?;
        }
        for (i, node) in self.chain().enumerate() {
            if i > 0 {
                write!(f, " {} ", INNER_EXCEPTION_MARKER)?;
            }
            write!(f, "{}: {}", node.type_name, node.message)?;
        }
        writeln!(f)?;

        // Innermost section first, each printed throw site first.
        let sections: Vec<&ExceptionResult> = self.chain().collect();
        for (i, node) in sections.iter().rev().enumerate() {
            if i > 0 {
                writeln!(f, "   {}", INNER_BOUNDARY)?;
            }
            for frame in node.stacktrace.iter().rev() {
                writeln!(f, "  at {}", frame)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ExceptionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let call_site_only = f.alternate();
        if !call_site_only {
            if self.is_native_wrapper {
                write!(f, "{} ", NATIVE_WRAPPER)?;
            } else if self.is_dynamic_method {
                write!(f, "{} ", DYNAMIC_METHOD)?;
            }
        }
        // `.ctor` and `.cctor` bring their own dot: `Type..cctor`.
        if let Some(type_name) = &self.type_name {
            write!(f, "{}.", type_name)?;
        }
        write!(f, "{}", self.method)?;
        if !self.generic_parameters.is_empty() {
            write!(f, "[{}]", self.generic_parameters.join(","))?;
        }
        f.write_str(" (")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        match &self.il_offset {
            Some(offset) if call_site_only => write!(f, " [{}]", offset)?,
            Some(offset) => write!(f, " [{}] in {}", offset, UNKNOWN_LOCATION)?,
            None => {}
        }
        Ok(())
    }
}

impl fmt::Display for ExceptionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic_parameters.is_empty() {
            f.write_str(&self.type_name)?;
        } else {
            // `List`1&` with `[T]` prints as `List`1[T]&`.
            let (base, modifiers) = split_type_modifiers(&self.type_name);
            write!(f, "{}[{}]{}", base, self.generic_parameters.join(","), modifiers)?;
        }
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn frame_renders_in_mono_form() {
        let frame = ExceptionMethod {
            type_name: Some("System.Linq.Enumerable".to_owned()),
            method: "ToList".to_owned(),
            il_offset: Some("0x0001f".to_owned()),
            parameters: vec![ExceptionParameter {
                name: Some("source".to_owned()),
                type_name: "System.Collections.Generic.IEnumerable`1".to_owned(),
                generic_parameters: vec!["T".to_owned()],
            }],
            generic_parameters: vec!["TSource".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            frame.to_string(),
            "System.Linq.Enumerable.ToList[TSource] (System.Collections.Generic.IEnumerable`1[T] source) [0x0001f] in <filename unknown>:0"
        );
    }

    #[test]
    fn wrapper_frame_has_no_location() {
        let frame = ExceptionMethod {
            type_name: Some("System.Object".to_owned()),
            method: "Init".to_owned(),
            parameters: vec![ExceptionParameter {
                type_name: "intptr".to_owned(),
                ..Default::default()
            }],
            is_native_wrapper: true,
            ..Default::default()
        };
        assert_eq!(
            frame.to_string(),
            "(wrapper managed-to-native) System.Object.Init (intptr)"
        );
    }

    #[test]
    fn constructor_keeps_double_dot() {
        let frame = ExceptionMethod {
            type_name: Some("Project.Mod.Data".to_owned()),
            method: ".cctor".to_owned(),
            ..Default::default()
        };
        assert_eq!(frame.to_string(), "Project.Mod.Data..cctor ()");
    }

    #[test]
    fn alternate_form_is_the_bare_call_site() {
        let frame = ExceptionMethod {
            type_name: Some("App.Patches".to_owned()),
            method: "Load_Patch0".to_owned(),
            il_offset: Some("0x00004".to_owned()),
            is_dynamic_method: true,
            ..Default::default()
        };
        assert_eq!(format!("{:#}", frame), "App.Patches.Load_Patch0 () [0x00004]");
    }

    #[test]
    fn by_ref_generic_parameter_renders_marker_last() {
        let param = ExceptionParameter {
            name: Some("list".to_owned()),
            type_name: "System.Collections.Generic.List`1&".to_owned(),
            generic_parameters: vec!["T".to_owned()],
        };
        assert_eq!(param.to_string(), "System.Collections.Generic.List`1[T]& list");
    }

    #[test]
    fn empty_log_field_survives_a_round_trip() {
        let text = ": Mod.Failure: disk: gone\n  at A.OnException () [0x1] in <a>:0\n";
        let first = parse(text).unwrap().unwrap();
        assert_eq!(first.log_message.as_deref(), Some(""));
        let rendered = first.to_string();
        assert!(rendered.starts_with(": Mod.Failure: disk: gone\n"));
        assert_eq!(parse(&rendered).unwrap().unwrap(), first);
    }

    #[test]
    fn by_ref_generic_frame_survives_a_round_trip() {
        let text = "System.Exception: boom\n  at Patches.Prefix (System.Collections.Generic.List`1[T]& list, System.Int32& count) [0x00002] in <a>:0\n";
        let first = parse(text).unwrap().unwrap();
        assert_eq!(parse(&first.to_string()).unwrap().unwrap(), first);
    }

    #[test]
    fn rendered_chain_parses_back_to_the_same_tree() {
        let text = "Loading failed: System.Exception: outer ---> System.IO.IOException: disk: gone\n  at Io.File.Read (System.Byte[] buffer, System.Int32 count) [0x00010] in <a>:0\n   --- End of inner exception stack trace ---\n  at (wrapper dynamic-method) App.Patches.Load_Patch0(App.Loader)\n  at App.Program.Main () [0x00003] in <a>:0\n";
        let first = parse(text).unwrap().unwrap();
        let rendered = first.to_string();
        let second = parse(&rendered).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(second.innermost().message, "disk: gone");
    }
}

//! Stack frame parsing for the Mono trace dialect:
//!
//! ```text
//!   at [(wrapper <kind>)] <Type>.<Method>[<Generics>] (<Params>) [<IL offset>] in <file>:<line>
//! ```
//!
//! The qualified `Type.Method` prefix is ambiguous until the method name's
//! end is known, while the suffix (IL offset, parameter list, method
//! generics) is unambiguous read right to left. [`TailScanner`] peels those
//! suffix segments off one at a time; whatever remains is the call site.

use crate::model::{ExceptionMethod, ExceptionParameter};

pub const NATIVE_WRAPPER: &str = "(wrapper managed-to-native)";
pub const DYNAMIC_METHOD: &str = "(wrapper dynamic-method)";
const WRAPPER_PREFIX: &str = "(wrapper ";

/// Parse one physical trace line into a frame.
///
/// Returns `None` for blank lines and for anything that does not end in a
/// parameter list once the IL offset and location are removed.
pub fn parse_frame(line: &str) -> Option<ExceptionMethod> {
    let body = line.trim();
    if body.is_empty() {
        return None;
    }
    let body = body.strip_prefix("at ").map_or(body, str::trim_start);

    let (wrapper, body) = split_wrapper(body);
    let mut frame = ExceptionMethod {
        is_native_wrapper: wrapper == Some(NATIVE_WRAPPER),
        is_dynamic_method: wrapper == Some(DYNAMIC_METHOD),
        ..Default::default()
    };

    let mut call_site = None;
    for segment in TailScanner::new(strip_location(body)) {
        match segment {
            Segment::IlOffset(token) => {
                frame.il_offset = Some(token.to_owned()).filter(|t| !t.is_empty());
            }
            Segment::Parameters(list) => {
                frame.parameters = split_top_level(list, b',')
                    .into_iter()
                    .filter(|p| !p.is_empty())
                    .map(parse_parameter)
                    .collect();
            }
            Segment::Generics(list) => frame.generic_parameters = split_generic_list(list),
            Segment::CallSite(site) => call_site = Some(site),
        }
    }

    let (type_name, method) = split_call_site(call_site?)?;
    frame.type_name = type_name;
    frame.method = method;
    log::trace!(
        "frame {}.{} ({} params)",
        frame.type_name.as_deref().unwrap_or("?"),
        frame.method,
        frame.parameters.len()
    );
    Some(frame)
}

/// Parse a single `Type[Generics] name` declaration from a parameter list.
/// Declarations without a space are type-only.
pub fn parse_parameter(declaration: &str) -> ExceptionParameter {
    let declaration = declaration.trim();
    let (type_part, name) = match rfind_top_level(declaration, b' ') {
        Some(space) => (
            declaration[..space].trim_end(),
            Some(declaration[space + 1..].to_owned()),
        ),
        None => (declaration, None),
    };

    // By-ref (`&`) and pointer (`*`) markers follow the generic list.
    let (base, modifiers) = split_type_modifiers(type_part);
    let (type_name, generic_parameters) = match take_enclosed(base, b'[', b']') {
        // `[]` and `[,]` are array ranks, not generic arguments.
        Some((head, inner))
            if !head.is_empty() && inner.bytes().any(|b| b != b',' && b != b' ') =>
        {
            (format!("{}{}", head, modifiers), split_generic_list(inner))
        }
        _ => (type_part.to_owned(), Vec::new()),
    };

    ExceptionParameter {
        name,
        type_name,
        generic_parameters,
    }
}

/// Split trailing `&` / `*` markers off a type name: `List`1[T]&` gives
/// `("List`1[T]", "&")`.
pub(crate) fn split_type_modifiers(type_name: &str) -> (&str, &str) {
    let base = type_name.trim_end_matches(|c| c == '&' || c == '*');
    (base, &type_name[base.len()..])
}

/// Split a generic argument list such as `TKey, TValue` into names.
pub fn split_generic_list(list: &str) -> Vec<String> {
    split_top_level(list, b',')
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// A piece of a frame line, recognized from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    IlOffset(&'a str),
    Parameters(&'a str),
    Generics(&'a str),
    CallSite(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    IlOffset,
    Parameters,
    Generics,
    CallSite,
    Done,
}

struct TailScanner<'a> {
    rest: &'a str,
    expect: Expect,
}

impl<'a> TailScanner<'a> {
    fn new(body: &'a str) -> Self {
        TailScanner {
            rest: body.trim_end(),
            expect: Expect::IlOffset,
        }
    }
}

impl<'a> Iterator for TailScanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        loop {
            match self.expect {
                Expect::IlOffset => {
                    self.expect = Expect::Parameters;
                    if let Some((head, token)) = take_enclosed(self.rest, b'[', b']') {
                        self.rest = head.trim_end();
                        return Some(Segment::IlOffset(token.trim()));
                    }
                }
                Expect::Parameters => {
                    // No parameter list, no frame: stop before the call site.
                    let Some((head, list)) = take_enclosed(self.rest, b'(', b')') else {
                        self.expect = Expect::Done;
                        return None;
                    };
                    self.rest = head.trim_end();
                    self.expect = Expect::Generics;
                    return Some(Segment::Parameters(list));
                }
                Expect::Generics => {
                    self.expect = Expect::CallSite;
                    if let Some((head, list)) = take_enclosed(self.rest, b'[', b']') {
                        self.rest = head;
                        return Some(Segment::Generics(list));
                    }
                }
                Expect::CallSite => {
                    self.expect = Expect::Done;
                    return Some(Segment::CallSite(self.rest.trim()));
                }
                Expect::Done => return None,
            }
        }
    }
}

/// Strip a leading `(wrapper <kind>)` marker, returning the marker.
fn split_wrapper(body: &str) -> (Option<&str>, &str) {
    if body.starts_with(WRAPPER_PREFIX) {
        if let Some(end) = body.find(')') {
            return (Some(&body[..=end]), body[end + 1..].trim_start());
        }
    }
    (None, body)
}

/// Drop a trailing ` in <file>:<line>` annotation.
fn strip_location(body: &str) -> &str {
    if let Some(idx) = body.rfind(" in ") {
        let is_location = body[idx + 4..].rsplit_once(':').is_some_and(|(_, line)| {
            !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
        });
        if is_location {
            return body[..idx].trim_end();
        }
    }
    body
}

/// Split `Type.Method` at the last top-level dot. In `Type..ctor` the
/// second dot starts the method name.
fn split_call_site(site: &str) -> Option<(Option<String>, String)> {
    let (type_part, method) = match rfind_top_level(site, b'.') {
        Some(dot) if dot > 0 && site.as_bytes()[dot - 1] == b'.' => {
            (&site[..dot - 1], &site[dot..])
        }
        Some(dot) => (&site[..dot], &site[dot + 1..]),
        None => ("", site),
    };

    let method = method.trim();
    let method = method.strip_suffix("()").unwrap_or(method).trim_end();
    if method.is_empty() {
        return None;
    }
    let type_part = type_part.trim();
    let type_name = (!type_part.is_empty()).then(|| type_part.to_owned());
    Some((type_name, method.to_owned()))
}

/// If `s` ends with `close`, split off the balanced `open ... close` group
/// and return `(before, inside)`.
fn take_enclosed(s: &str, open: u8, close: u8) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    if bytes.last() != Some(&close) {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().rev() {
        if b == close {
            depth += 1;
        } else if b == open {
            depth -= 1;
            if depth == 0 {
                return Some((&s[..i], &s[i + 1..s.len() - 1]));
            }
        }
    }
    None
}

/// Byte offset of the last `needle` outside `[...]` and `<...>` groups.
fn rfind_top_level(s: &str, needle: u8) -> Option<usize> {
    let mut depth = 0i32;
    for (i, &b) in s.as_bytes().iter().enumerate().rev() {
        match b {
            b']' | b'>' => depth += 1,
            b'[' | b'<' => depth -= 1,
            _ if b == needle && depth <= 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside `[...]` and `<...>` groups, trimming each part.
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, &b) in s.as_bytes().iter().enumerate() {
        match b {
            b'[' | b'<' => depth += 1,
            b']' | b'>' => depth -= 1,
            _ if b == sep && depth <= 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(type_name: &str, generics: &[&str], name: Option<&str>) -> ExceptionParameter {
        ExceptionParameter {
            name: name.map(str::to_owned),
            type_name: type_name.to_owned(),
            generic_parameters: generics.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn full_frame_with_generic_parameter() {
        let frame = parse_frame("Type.Method (A.B`1[T] x, C y) [0x0001f] in <f>:0").unwrap();
        assert_eq!(frame.type_name.as_deref(), Some("Type"));
        assert_eq!(frame.method, "Method");
        assert_eq!(frame.il_offset.as_deref(), Some("0x0001f"));
        assert_eq!(
            frame.parameters,
            vec![param("A.B`1", &["T"], Some("x")), param("C", &[], Some("y"))]
        );
        assert!(frame.generic_parameters.is_empty());
        assert!(!frame.is_native_wrapper);
        assert!(!frame.is_dynamic_method);
    }

    #[test]
    fn frame_with_at_prefix_and_indent() {
        let frame = parse_frame(
            "  at Framework.WindowSettings.DoWindowContents (UnityEngine.Rect inRect) [0x000e5] in <2i3n2i23oi23oij2jo3ix>:0",
        )
        .unwrap();
        assert_eq!(frame.type_name.as_deref(), Some("Framework.WindowSettings"));
        assert_eq!(frame.method, "DoWindowContents");
        assert_eq!(frame.il_offset.as_deref(), Some("0x000e5"));
        assert_eq!(
            frame.parameters,
            vec![param("UnityEngine.Rect", &[], Some("inRect"))]
        );
    }

    #[test]
    fn empty_parameter_list() {
        let frame =
            parse_frame("  at Project.Mod.Data.DumpAllData () [0x00019] in <9283j982m938cm9283u9>:0")
                .unwrap();
        assert_eq!(frame.type_name.as_deref(), Some("Project.Mod.Data"));
        assert_eq!(frame.method, "DumpAllData");
        assert!(frame.parameters.is_empty());
    }

    #[test]
    fn static_constructor_keeps_its_dot() {
        let frame =
            parse_frame("  at Project.Mod.Data..cctor () [0x0019f] in <2938jm92j83j9283j9283>:0")
                .unwrap();
        assert_eq!(frame.type_name.as_deref(), Some("Project.Mod.Data"));
        assert_eq!(frame.method, ".cctor");
        assert_eq!(frame.il_offset.as_deref(), Some("0x0019f"));
    }

    #[test]
    fn method_generics_are_split_from_the_name() {
        let frame = parse_frame(
            "  at System.Linq.Enumerable.ToList[TSource] (System.Collections.Generic.IEnumerable`1[T] source) [0x0001f] in <23i82983m2oi3m9283>:0",
        )
        .unwrap();
        assert_eq!(frame.type_name.as_deref(), Some("System.Linq.Enumerable"));
        assert_eq!(frame.method, "ToList");
        assert_eq!(frame.generic_parameters, ["TSource"]);
        assert_eq!(
            frame.parameters,
            vec![param(
                "System.Collections.Generic.IEnumerable`1",
                &["T"],
                Some("source")
            )]
        );
    }

    #[test]
    fn generic_declaring_type_stays_on_the_type() {
        let frame = parse_frame(
            "  at System.Linq.Enumerable+WhereSelectListIterator`2[TSource,TResult].ToList () [0x00025] in <23423ebaes7878asebse3>:0",
        )
        .unwrap();
        assert_eq!(
            frame.type_name.as_deref(),
            Some("System.Linq.Enumerable+WhereSelectListIterator`2[TSource,TResult]")
        );
        assert_eq!(frame.method, "ToList");
        assert!(frame.generic_parameters.is_empty());
    }

    #[test]
    fn native_wrapper_frame() {
        let frame = parse_frame(
            "  at (wrapper managed-to-native) System.Object.__icall_wrapper_mono_generic_class_init(intptr)",
        )
        .unwrap();
        assert!(frame.is_native_wrapper);
        assert!(!frame.is_dynamic_method);
        assert_eq!(frame.type_name.as_deref(), Some("System.Object"));
        assert_eq!(frame.method, "__icall_wrapper_mono_generic_class_init");
        assert_eq!(frame.parameters, vec![param("intptr", &[], None)]);
        assert_eq!(frame.il_offset, None);
    }

    #[test]
    fn dynamic_method_frame() {
        let frame = parse_frame(
            "  at (wrapper dynamic-method) Project.Mod.Settings.Settings_Object.DoWindowContents_Patch0(UnityEngine.Rect,Framework.Listing)",
        )
        .unwrap();
        assert!(frame.is_dynamic_method);
        assert!(!frame.is_native_wrapper);
        assert_eq!(
            frame.type_name.as_deref(),
            Some("Project.Mod.Settings.Settings_Object")
        );
        assert_eq!(frame.method, "DoWindowContents_Patch0");
        assert_eq!(
            frame.parameters,
            vec![
                param("UnityEngine.Rect", &[], None),
                param("Framework.Listing", &[], None)
            ]
        );
    }

    #[test]
    fn wrapper_line_without_at_marker() {
        let frame = parse_frame("(wrapper managed-to-native) UnityEngine.Object.Destroy(UnityEngine.Object)")
            .unwrap();
        assert!(frame.is_native_wrapper);
        assert_eq!(frame.type_name.as_deref(), Some("UnityEngine.Object"));
        assert_eq!(frame.method, "Destroy");
    }

    #[test]
    fn other_wrapper_kinds_are_stripped_without_flags() {
        let frame = parse_frame(
            "  at (wrapper remoting-invoke-with-check) Foo.Bar.Baz (int) [0x00000] in <abc>:0",
        )
        .unwrap();
        assert!(!frame.is_native_wrapper);
        assert!(!frame.is_dynamic_method);
        assert_eq!(frame.type_name.as_deref(), Some("Foo.Bar"));
        assert_eq!(frame.method, "Baz");
    }

    #[test]
    fn source_path_location_is_discarded() {
        let frame = parse_frame(
            "  at Game.Player.Update (System.Single dt) [0x00012] in C:\\src\\Game\\Player.cs:118",
        )
        .unwrap();
        assert_eq!(frame.method, "Update");
        assert_eq!(frame.il_offset.as_deref(), Some("0x00012"));
        assert_eq!(frame.parameters, vec![param("System.Single", &[], Some("dt"))]);
    }

    #[test]
    fn nested_generic_parameter_keeps_inner_commas_together() {
        let frame = parse_frame(
            "  at Cache.Fill (System.Collections.Generic.Dictionary`2[TKey,TValue] map, System.Int32[] ids) [0x00001] in <x>:0",
        )
        .unwrap();
        assert_eq!(
            frame.parameters,
            vec![
                param(
                    "System.Collections.Generic.Dictionary`2",
                    &["TKey", "TValue"],
                    Some("map")
                ),
                param("System.Int32[]", &[], Some("ids")),
            ]
        );
    }

    #[test]
    fn lines_that_are_not_frames() {
        assert_eq!(parse_frame(""), None);
        assert_eq!(parse_frame("   "), None);
        assert_eq!(
            parse_frame("--- End of stack trace from previous location where exception was thrown ---"),
            None
        );
        assert_eq!(parse_frame("Rethrow as InvalidOperationException: nope"), None);
    }

    #[test]
    fn parameter_without_name() {
        assert_eq!(parse_parameter("System.String"), param("System.String", &[], None));
    }

    #[test]
    fn parameter_with_spaced_generic_list() {
        assert_eq!(
            parse_parameter("Dictionary`2[K, V] lookup"),
            param("Dictionary`2", &["K", "V"], Some("lookup"))
        );
    }

    #[test]
    fn by_ref_generic_parameter_is_stripped() {
        assert_eq!(
            parse_parameter("System.Collections.Generic.List`1[T]& list"),
            param("System.Collections.Generic.List`1&", &["T"], Some("list"))
        );
        assert_eq!(
            parse_parameter("System.Int32& count"),
            param("System.Int32&", &[], Some("count"))
        );
        assert_eq!(parse_parameter("Node`1[T]*"), param("Node`1*", &["T"], None));
    }

    #[test]
    fn multidimensional_array_is_not_generic() {
        assert_eq!(
            parse_parameter("System.Int32[,] grid"),
            param("System.Int32[,]", &[], Some("grid"))
        );
    }

    #[test]
    fn generic_list_splitting() {
        assert!(split_generic_list("").is_empty());
        assert_eq!(split_generic_list("T"), ["T"]);
        assert_eq!(split_generic_list("TSource,TResult"), ["TSource", "TResult"]);
        assert_eq!(split_generic_list("A, B, A"), ["A", "B", "A"]);
    }
}

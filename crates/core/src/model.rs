//! Result tree produced by the parser.
//!
//! Field names serialize in camelCase so the JSON matches what downstream
//! crash-report tooling already consumes (`logMessage`, `ilOffset`, ...).

use serde::{Deserialize, Serialize};

/// One exception in a chain, with the frames recorded for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionResult {
    /// Text logged ahead of the exception. Only ever set on the outermost node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_message: Option<String>,
    /// Fully qualified exception type, e.g. `System.NullReferenceException`.
    #[serde(rename = "type")]
    pub type_name: String,
    pub message: String,
    /// The exception this one wrapped, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_exception: Option<Box<ExceptionResult>>,
    /// Frames ordered from the outermost call to the throw site. In printed
    /// form that is bottom to top.
    #[serde(default)]
    pub stacktrace: Vec<ExceptionMethod>,
}

/// A single call site in a stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionMethod {
    /// Qualified name of the declaring type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub method: String,
    /// IL offset token exactly as printed, e.g. `0x0001f`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub il_offset: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ExceptionParameter>,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub is_native_wrapper: bool,
    #[serde(default)]
    pub is_dynamic_method: bool,
}

/// A parameter in a frame's signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type name with its generic argument list removed (arity suffix kept).
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
}

impl ExceptionResult {
    /// Iterate the chain from this node down to the innermost exception.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of nodes in the chain, this one included.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// The exception at the bottom of the chain (the root cause).
    pub fn innermost(&self) -> &ExceptionResult {
        let mut node = self;
        while let Some(inner) = node.inner_exception.as_deref() {
            node = inner;
        }
        node
    }
}

/// Iterator over an exception chain, outermost first.
pub struct Chain<'a> {
    next: Option<&'a ExceptionResult>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ExceptionResult;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.inner_exception.as_deref();
        Some(node)
    }
}

//! monotrace-core: parser for Mono/Unity exception dumps.
//!
//! Turns text such as
//!
//! ```text
//! Log message: System.TypeInitializationException: ... ---> System.NullReferenceException: ...
//!   at Project.Mod.Data..cctor () [0x0019f] in <2938jm92j83j9283j9283>:0
//!    --- End of inner exception stack trace ---
//!   at Framework.WindowSettings.DoWindowContents (UnityEngine.Rect inRect) [0x000e5] in <...>:0
//! ```
//!
//! into an [`ExceptionResult`] chain with one frame list per exception.
//!
//! # Public API
//!
//! - [`parse()`] -- header chain plus frames, the usual entry point
//! - [`ParseError`] -- malformed input
//! - Model types: [`ExceptionResult`], [`ExceptionMethod`], [`ExceptionParameter`]
//!
//! The component parsers ([`parse_header`], [`parse_frame`],
//! [`parse_parameter`], [`split_generic_list`]) and the line scanner are
//! public for callers that only need part of the pipeline.

pub mod error;
pub mod frame;
pub mod header;
pub mod lines;
pub mod model;
pub mod parse;
pub mod render;

// ── Convenience re-exports: key types ────────────────────────────────

pub use error::ParseError;
pub use model::{Chain, ExceptionMethod, ExceptionParameter, ExceptionResult};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use frame::{parse_frame, parse_parameter, split_generic_list};
pub use header::{parse_header, LogMessagePolicy};
pub use lines::{line_ending_at, line_starting_at, ReverseLines};
pub use parse::parse;

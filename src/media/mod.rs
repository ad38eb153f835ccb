//! Boundary to the external encoder tools (ffmpeg/ffprobe).
//!
//! The pipeline never touches compressed bitstreams itself; it builds
//! parameterized invocations and interprets their outcomes. All invocations
//! carry a wall-clock timeout, and a timeout is indistinguishable from a
//! hard failure to callers.

pub mod probe;
pub mod runner;

pub use probe::{probe_source, ProbeError, SourceInfo};
pub use runner::{locate_tool, run_with_timeout, ToolError, ToolOutput, ToolResult};

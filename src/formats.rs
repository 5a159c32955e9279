//! Output formats for compiled endpoints
//!
//! - `json`: the full [`CompiledEndpoint`](crate::compiler::CompiledEndpoint), pretty printed
//! - `yaml`: the same structure as YAML
//! - `treeviz`: one line per node, for eyeballing a tree in a terminal

pub mod registry;
pub mod serial;
pub mod treeviz;

pub use registry::{FormatError, FormatRegistry, Formatter};
pub use serial::{JsonFormatter, YamlFormatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};

//! Timeline file formats.
//!
//! - [`flat`]: the flat, delta-encoded timeline (one text document)
//! - [`authoring`]: the authoring export (a directory with a manifest and a bitmap library)
//! - [`xml`]: the tag reader both formats are built on

pub mod authoring;
pub mod flat;
mod load_config;
pub mod xml;

pub use load_config::LoadConfig;

//! Links `reanim_internal` as a dynamic library to speed up incremental builds.
//!
//! Enabled through the `dynamic_linking` feature of `reanim-rs`; not meant to be used directly.

#![allow(clippy::single_component_path_imports)]
#[allow(unused_imports)]
use reanim_internal;

//! Information extracted from the (build) environment
//!

/// The package version, as an UTF-8 string
///
/// This is of the format "<major>.<minor>.<patch> [rustc]" if built as a tagged release
/// or "<major>.<minor>.<patch> (<commit hash> <date>) [rustc]" if built from source
pub const VERSION: &str = env!("SASLPLAIND_VERSION_STRING");

//! Command implementations
//!
//! Each module exposes `execute(...) -> ExitCode`. Storage commands
//! receive the already-bound session; `profile` and `completions` run
//! without one.

pub mod bucket;
pub mod cat;
pub mod completions;
pub mod expire;
pub mod get;
pub mod profile;
pub mod put;
pub mod rm;

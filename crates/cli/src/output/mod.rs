//! Output configuration and formatting

mod formatter;

pub use formatter::Formatter;

/// Output switches shared by every command
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Strict JSON on stdout, JSON errors on stderr
    pub json: bool,
    /// Suppress non-error output
    pub quiet: bool,
    /// Disable ANSI styling
    pub no_color: bool,
}

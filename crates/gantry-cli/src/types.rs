use clap::ValueEnum;

/// How machine-facing output should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console output
    Plain,
    /// JSON on stdout, for piping into other tools
    Json,
}

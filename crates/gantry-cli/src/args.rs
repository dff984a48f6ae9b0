use crate::types::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "Reconstruct and visualize agent runtime traces", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print per-category statistics, breakdowns, and anomaly signals
    Summary {
        /// Trace file (JSONL)
        trace: PathBuf,
    },

    /// Render the reconstructed timeline as a self-contained HTML gantt chart
    Chart {
        /// Trace file (JSONL)
        trace: PathBuf,

        #[arg(short, long, default_value = "gantt_chart.html")]
        output: PathBuf,
    },

    /// Dump raw trace records as JSON, expanding nested JSON-string fields
    Extract {
        /// Trace file (JSONL)
        trace: PathBuf,

        #[arg(short, long, default_value = "parsed_trace_data.json")]
        output: PathBuf,

        /// Write only the data objects, without the event envelopes
        #[arg(long, conflicts_with = "fields")]
        data_only: bool,

        /// Project specific fields (envelope fields or data keys)
        #[arg(long, num_args = 1..)]
        fields: Vec<String>,
    },

    /// Estimate the effect of converting a split-protocol trace to fused events
    Fusion {
        /// Trace file (JSONL)
        trace: PathBuf,
    },
}

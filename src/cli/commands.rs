use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "keysweep")]
#[command(version, about = "Sweeps git history for leaked AWS credentials and confirms which are still live", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep every revision of a repository's history
    Scan {
        /// Repository to sweep (URL or local path; cloned to a temp dir)
        repo: String,

        /// Maximum concurrently in-flight validation calls
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Minimum spacing between validation calls, in milliseconds
        #[arg(long)]
        rate_limit_ms: Option<u64>,

        /// Output file for the JSON report (default: results/sweep_<timestamp>.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check whether a single access-key / secret pair is still live
    Check {
        /// The access key id
        access_key_id: String,

        /// The paired secret access key
        secret_access_key: String,
    },

    /// Render a saved report
    Report {
        /// Input report file
        #[arg(short, long)]
        input: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

//! Command-line interface definitions.
//!
//! All options can be provided via command-line flags or environment
//! variables.

use clap::Parser;

/// Command-line arguments for the harvester.
///
/// # Examples
///
/// ```sh
/// # Default config and output paths
/// feedsweep
///
/// # Explicit paths
/// feedsweep -c ./harvest.yaml -o ./report.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the harvest configuration file (YAML or JSON)
    #[arg(short, long, env = "FEEDSWEEP_CONFIG", default_value = "harvest.yaml")]
    pub config: String,

    /// Path for the CSV report
    #[arg(short, long, env = "FEEDSWEEP_OUTPUT", default_value = "harvest_report.csv")]
    pub output: String,
}

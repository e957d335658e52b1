use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cws-qc")]
#[command(about = "Quality-control processor for citizen weather station snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run quality controls over an assembled snapshot directory
    Check {
        #[arg(short, long, help = "Directory containing snapshot JSON files")]
        snapshot_dir: PathBuf,

        #[arg(long, default_value = "0.01", help = "Lower outlier tail probability")]
        low_alpha: f64,

        #[arg(long, default_value = "0.99", help = "Upper outlier tail probability")]
        high_alpha: f64,

        #[arg(
            long,
            default_value = "0.2",
            help = "Outlier reading proportion above which a station is flagged"
        )]
        station_outlier_threshold: f64,

        #[arg(
            long,
            default_value = "0.9",
            help = "Minimum correlation with the spatial-median series"
        )]
        station_indoor_corr_threshold: f64,

        #[arg(
            long,
            default_value = "0",
            help = "Location grouping tolerance in degrees (0 = exact coincidence)"
        )]
        location_tolerance: f64,

        #[arg(
            long,
            default_value = "false",
            help = "Keep stations whose indoor correlation is undefined instead of flagging them"
        )]
        keep_insufficient: bool,

        #[arg(long, default_value = "false", help = "List only the excluded stations")]
        flagged_only: bool,

        #[arg(short, long, help = "Write per-detector flags to a JSON file")]
        output_file: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display information about an assembled snapshot directory
    Info {
        #[arg(short, long, help = "Directory containing snapshot JSON files")]
        snapshot_dir: PathBuf,
    },
}

use serde_json::json;
use tracing::info;

use crate::analyzers::QcAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::QcConfig;
use crate::error::{QcError, Result};
use crate::readers::SnapshotReader;
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(&cli);

    match cli.command {
        Commands::Check {
            snapshot_dir,
            low_alpha,
            high_alpha,
            station_outlier_threshold,
            station_indoor_corr_threshold,
            location_tolerance,
            keep_insufficient,
            flagged_only,
            output_file,
            max_workers,
        } => {
            let config = QcConfig {
                low_alpha,
                high_alpha,
                station_outlier_threshold,
                station_indoor_corr_threshold,
                location_tolerance_deg: location_tolerance,
                flag_insufficient_data: !keep_insufficient,
            };
            let analyzer = QcAnalyzer::from_config(&config)?;

            let matrix = SnapshotReader::with_silent(cli.quiet).read_dir(&snapshot_dir)?;

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_workers)
                .build()
                .map_err(|e| {
                    QcError::InvalidConfig(format!("failed to build worker pool: {}", e))
                })?;

            let progress = ProgressReporter::new_spinner("Running quality controls...", cli.quiet);
            let report = pool.install(|| analyzer.analyze(&matrix))?;
            progress.finish_with_message(&format!(
                "Checked {} stations over {} snapshots",
                report.n_stations, report.n_timestamps
            ));

            println!("\n{}", report.summary());

            if flagged_only {
                for station_id in report.excluded.flagged() {
                    println!("{}", station_id);
                }
            } else {
                println!("station                      misloc outlier indoor excluded");
                for (station_id, excluded) in report.excluded.iter() {
                    println!(
                        "{:<28} {:<6} {:<7} {:<6} {}",
                        station_id,
                        report.mislocated.get(station_id).unwrap_or(false),
                        report.outlier.get(station_id).unwrap_or(false),
                        report.indoor.get(station_id).unwrap_or(false),
                        excluded
                    );
                }
            }

            if let Some(path) = output_file {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let flags = json!({
                    "mislocated": report.mislocated,
                    "outlier": report.outlier,
                    "indoor": report.indoor,
                    "excluded": report.excluded,
                });
                std::fs::write(&path, serde_json::to_string_pretty(&flags)?)?;
                info!(file = %path.display(), "flags written");
            }
        }

        Commands::Info { snapshot_dir } => {
            let matrix = SnapshotReader::with_silent(cli.quiet).read_dir(&snapshot_dir)?;

            println!("Stations: {}", matrix.n_stations());
            println!("Snapshots: {}", matrix.n_timestamps());
            if let (Some(first), Some(last)) =
                (matrix.timestamps().first(), matrix.timestamps().last())
            {
                println!("Time range: {} to {}", first, last);
            }
            println!(
                "Cell coverage: {:.1}%",
                matrix.completeness() * 100.0
            );
            if let Some(bounds) = matrix.bounds() {
                println!(
                    "Coverage: {:.4}N-{:.4}N, {:.4}E-{:.4}E",
                    bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
                );
            }
        }
    }

    Ok(())
}

/// Set up structured logging based on CLI arguments.
fn setup_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cws_qc={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

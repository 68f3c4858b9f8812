//! Gradebook report entry point.
//!
//! Seeds the local database file and prints the fixed report to stdout.
//! Any failure ends the process with a non-zero status and the raw error.

use gradebook_core::db::open_db;
use gradebook_core::{
    core_version, default_log_dir, default_log_level, init_logging, RandomSeedSource,
    ReportConfig, ReportService, SeedConfig,
};
use log::info;
use std::error::Error;
use std::io;

fn main() -> Result<(), Box<dyn Error>> {
    let log_dir = default_log_dir();
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("gradebook: file logging disabled: {err}");
    }
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let report_config = ReportConfig::default();
    let mut conn = open_db(&report_config.db_path)?;

    let mut service = ReportService::new(
        SeedConfig::default(),
        report_config,
        RandomSeedSource::from_entropy(),
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();
    service.run(&mut conn, &mut out)?;

    Ok(())
}

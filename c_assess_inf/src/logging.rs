use anyhow::Result;
use chrono::Local;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};
use std::{
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
};

/// File log at `level` under `log_dir`, warnings and errors echoed to stderr.
pub fn init_logging(log_dir: &Path, tool: &str, level: LevelFilter) -> Result<PathBuf> {
    create_dir_all(log_dir)?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("{tool}_{ts}.log"));
    CombinedLogger::init(vec![
        WriteLogger::new(level, ConfigBuilder::new().build(), File::create(&log_path)?),
        TermLogger::new(
            LevelFilter::Warn,
            ConfigBuilder::new().build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    ])?;
    Ok(log_path)
}

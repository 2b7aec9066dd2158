use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, StoreError};

pub const LOG_FILE: &str = "log.txt";

#[derive(Debug)]
struct SimpleLogger {
    log_file: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<SimpleLogger> = OnceCell::new();

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format_entry(record);
            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

fn format_entry(record: &Record) -> String {
    format!(
        "{} {} - {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// Installs the file logger, appending to `<log_dir>/log.txt`.
///
/// Fails instead of panicking when the directory cannot be created or a
/// logger is already installed.
pub fn init(log_dir: &Path, level: LevelFilter) -> Result<(), AppError> {
    create_dir_all(log_dir).map_err(StoreError::from)?;

    let logger = LOGGER.get_or_init(|| SimpleLogger {
        log_file: log_dir.join(LOG_FILE),
        level,
    });
    log::set_logger(logger).map_err(|e| AppError::Logger(e.to_string()))?;
    log::set_max_level(logger.level);
    Ok(())
}

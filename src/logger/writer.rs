//! File writer for the logger

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;

/// Log file handle usable as a `MakeWriter`.
pub type FileWriter = Mutex<File>;

/// Opens the configured log file, creating parent directories as needed.
pub fn open_file_writer(config: &FileConfig) -> Result<FileWriter, LoggerError> {
    if let Some(parent) = config.path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = open_log_file(&config.path, config.append)?;
    Ok(Mutex::new(file))
}

fn open_log_file(path: &Path, append: bool) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options.open(path)
}

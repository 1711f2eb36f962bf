use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use super::store::StudentStore;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".school-manager";
/// Roster file stored inside the application data directory.
const STORE_FILE_NAME: &str = "students.db";
/// Log file written next to the roster.
const LOG_FILE_NAME: &str = "school-manager.log";
/// Overrides the roster file location when set to a non-empty path.
pub const STORE_PATH_ENV: &str = "SCHOOL_MANAGER_FILE";

/// Resolve the roster file, make sure its directory exists, and bind a store to
/// it. The file itself is created empty on first run.
pub fn ensure_store() -> Result<StudentStore> {
    let path = store_path()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    StudentStore::open(&path).context("failed to open student file")
}

/// Absolute path of the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Roster file location, honouring [`STORE_PATH_ENV`].
pub fn store_path() -> Result<PathBuf> {
    match env::var_os(STORE_PATH_ENV) {
        Some(custom) if !custom.is_empty() => Ok(PathBuf::from(custom)),
        _ => Ok(data_dir()?.join(STORE_FILE_NAME)),
    }
}

/// Log file location: next to the roster file, so a custom
/// [`STORE_PATH_ENV`] works without a home directory. The directory is created
/// if needed.
pub fn log_path() -> Result<PathBuf> {
    let path = log_path_for(&store_path()?);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    Ok(path)
}

fn log_path_for(store: &Path) -> PathBuf {
    store.with_file_name(LOG_FILE_NAME)
}

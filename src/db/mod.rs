//! Persistence module split across logical submodules.

mod codec;
mod location;
mod store;

pub use codec::{decode, encode, sanitize, CorruptRecord, DELIMITER, FIELD_COUNT};
pub use location::{data_dir, ensure_store, log_path, store_path, STORE_PATH_ENV};
pub use store::{LoadReport, SkippedLine, StoreError, StudentStore};

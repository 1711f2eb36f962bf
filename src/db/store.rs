//! File-backed roster. Every operation re-reads the whole file and every
//! mutation rewrites it, so the file stays the only source of truth and no
//! handle outlives a call.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::codec::{decode, encode, CorruptRecord};
use crate::models::{Student, ValidationError};

/// Outcomes a caller is expected to handle, plus I/O failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A student with ID {0} already exists.")]
    DuplicateId(i64),
    #[error("No student with ID {0}.")]
    NotFound(i64),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A line that was ignored while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based position in the file.
    pub line_number: usize,
    pub error: CorruptRecord,
}

/// Result of reading the file: the good records in file order and the lines
/// that had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub students: Vec<Student>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone)]
pub struct StudentStore {
    path: PathBuf,
}

impl StudentStore {
    /// Bind to `path`, creating an empty file when nothing exists there yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| StoreError::io("create", &path, err))?;
        debug!(path = %path.display(), "opened student store");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record, skipping blank lines and logging corrupt ones.
    pub fn load_report(&self) -> Result<LoadReport, StoreError> {
        let bytes = fs::read(&self.path).map_err(|err| StoreError::io("read", &self.path, err))?;
        let text = String::from_utf8_lossy(&bytes);

        let mut report = LoadReport::default();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match decode(line) {
                Ok(student) => report.students.push(student),
                Err(error) => {
                    warn!(
                        path = %self.path.display(),
                        line = idx + 1,
                        %error,
                        "skipping line"
                    );
                    report.skipped.push(SkippedLine {
                        line_number: idx + 1,
                        error,
                    });
                }
            }
        }

        debug!(
            loaded = report.students.len(),
            skipped = report.skipped.len(),
            "loaded students"
        );
        Ok(report)
    }

    pub fn load_all(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.load_report()?.students)
    }

    /// Replace the file contents with `students`, one line each, in order. The
    /// new content is staged next to the store, synced to disk, and only then
    /// renamed over it.
    pub fn save_all(&self, students: &[Student]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged =
            NamedTempFile::new_in(dir).map_err(|err| StoreError::io("stage", &self.path, err))?;

        {
            let mut writer = BufWriter::new(staged.as_file());
            for student in students {
                writeln!(writer, "{}", encode(student))
                    .map_err(|err| StoreError::io("write", &self.path, err))?;
            }
            writer
                .flush()
                .map_err(|err| StoreError::io("write", &self.path, err))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|err| StoreError::io("sync", &self.path, err))?;

        staged
            .persist(&self.path)
            .map_err(|err| StoreError::io("replace", &self.path, err.error))?;
        Ok(())
    }

    /// Insert a new student unless its id is already taken.
    pub fn add(&self, student: Student) -> Result<(), StoreError> {
        student.validate()?;
        let mut students = self.load_all()?;
        if students.iter().any(|existing| existing.id == student.id) {
            warn!(id = student.id, "rejected duplicate id");
            return Err(StoreError::DuplicateId(student.id));
        }

        let id = student.id;
        students.push(student);
        self.save_all(&students)?;
        info!(id, "added student");
        Ok(())
    }

    /// Look up a student; `None` when the id is unknown.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Student>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|student| student.id == id))
    }

    /// Replace the record stored under `id`. The id of `student` is forced to
    /// `id`, so a record never changes its key.
    pub fn update(&self, id: i64, mut student: Student) -> Result<(), StoreError> {
        student.id = id;
        student.validate()?;
        let mut students = self.load_all()?;
        let Some(slot) = students.iter_mut().find(|existing| existing.id == id) else {
            warn!(id, "update of unknown id");
            return Err(StoreError::NotFound(id));
        };

        *slot = student;
        self.save_all(&students)?;
        info!(id, "updated student");
        Ok(())
    }

    pub fn remove(&self, id: i64) -> Result<(), StoreError> {
        let mut students = self.load_all()?;
        let before = students.len();
        students.retain(|student| student.id != id);
        if students.len() == before {
            warn!(id, "remove of unknown id");
            return Err(StoreError::NotFound(id));
        }

        self.save_all(&students)?;
        info!(id, "removed student");
        Ok(())
    }
}

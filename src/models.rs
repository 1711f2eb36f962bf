//! Domain model for a single student entry plus the semantic rules fresh input
//! has to satisfy. Records read back from disk are never re-checked here; the
//! codec only rejects structural damage so older files keep loading.

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::db::sanitize;

/// Ages accepted for new or edited students.
pub const AGE_RANGE: RangeInclusive<i32> = 3..=100;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// One row of the roster. The `id` is the business key and is supplied by the
/// user, never generated.
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i32,
    /// Class or grade label, kept as free text ("5", "KG-2", ...).
    pub grade: String,
    pub section: String,
    /// Optional contact number; empty when unknown.
    pub phone: String,
}

impl Student {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        age: i32,
        grade: impl Into<String>,
        section: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            grade: grade.into(),
            section: section.into(),
            phone: phone.into(),
        }
    }

    /// Check the rules that apply to caller-supplied data. Required text fields
    /// are judged after sanitising, since that is what ends up on disk.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !valid_id(self.id) {
            return Err(ValidationError::NonPositiveId(self.id));
        }
        if !valid_age(self.age) {
            return Err(ValidationError::AgeOutOfRange(self.age));
        }
        for (field, value) in [
            ("Name", &self.name),
            ("Grade", &self.grade),
            ("Section", &self.section),
        ] {
            if sanitize(value).is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}

/// Reasons a student cannot be accepted as new input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ID must be positive.")]
    NonPositiveId(i64),
    #[error("Age must be between {} and {}.", AGE_RANGE.start(), AGE_RANGE.end())]
    AgeOutOfRange(i32),
    #[error("{0} is required.")]
    MissingField(&'static str),
}

pub fn valid_id(id: i64) -> bool {
    id > 0
}

pub fn valid_age(age: i32) -> bool {
    AGE_RANGE.contains(&age)
}

//! Line format for the roster file: `id|name|age|grade|section|phone`.
//!
//! Decoding only fails on structural damage (wrong field count, a number that
//! does not parse). Range rules live in [`Student::validate`] and are applied to
//! fresh input only.

use thiserror::Error;

use crate::models::Student;

/// Separator between fields on a line.
pub const DELIMITER: char = '|';
/// Number of fields every line must carry.
pub const FIELD_COUNT: usize = 6;

/// A line that could not be turned back into a [`Student`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorruptRecord {
    #[error("corrupt record: expected {} fields, found {found}", FIELD_COUNT)]
    FieldCount { found: usize },
    #[error("corrupt record: {field} is not an integer ({value:?})")]
    NotAnInteger { field: &'static str, value: String },
}

/// Replace the delimiter and line breaks with a space, then trim.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            DELIMITER | '\n' | '\r' => ' ',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Render one student as a single line (without the trailing newline).
pub fn encode(student: &Student) -> String {
    let sep = DELIMITER.to_string();
    [
        student.id.to_string(),
        sanitize(&student.name),
        student.age.to_string(),
        sanitize(&student.grade),
        sanitize(&student.section),
        sanitize(&student.phone),
    ]
    .join(&sep)
}

/// Parse one line back into a student.
pub fn decode(line: &str) -> Result<Student, CorruptRecord> {
    let parts: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    let [id, name, age, grade, section, phone] = parts.as_slice() else {
        return Err(CorruptRecord::FieldCount { found: parts.len() });
    };

    Ok(Student {
        id: parse_int("id", id)?,
        name: name.to_string(),
        age: parse_int("age", age)?,
        grade: grade.to_string(),
        section: section.to_string(),
        phone: phone.to_string(),
    })
}

fn parse_int<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, CorruptRecord> {
    raw.parse().map_err(|_| CorruptRecord::NotAnInteger {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_fields_in_fixed_order() {
        let student = Student::new(7, "Ann Lee", 12, "6", "B", "555-0101");
        assert_eq!(encode(&student), "7|Ann Lee|12|6|B|555-0101");
    }

    #[test]
    fn empty_phone_leaves_a_trailing_delimiter() {
        let student = Student::new(1, "Ann", 10, "5", "A", "");
        let line = encode(&student);
        assert_eq!(line, "1|Ann|10|5|A|");
        assert_eq!(decode(&line), Ok(student));
    }

    #[test]
    fn sanitize_replaces_delimiters_and_newlines() {
        assert_eq!(sanitize("  a|b\nc\r\n "), "a b c");
        assert_eq!(sanitize("|||"), "");
    }

    #[test]
    fn dirty_fields_still_produce_six_fields() {
        let student = Student::new(3, "Jo|hn\nDoe", 9, "4|x", "\rC", "1|2|3");
        let line = encode(&student);
        assert_eq!(line.split(DELIMITER).count(), FIELD_COUNT);
        assert!(!line.contains('\n'));

        let back = decode(&line).unwrap();
        assert_eq!(back.name, "Jo hn Doe");
        assert_eq!(back.grade, "4 x");
        assert_eq!(back.section, "C");
        assert_eq!(back.phone, "1 2 3");
    }

    #[test]
    fn decode_trims_each_field() {
        let student = decode("  42 |  Mia |  8 | 3 | A |  ").unwrap();
        assert_eq!(student, Student::new(42, "Mia", 8, "3", "A", ""));
    }

    #[test]
    fn wrong_field_count_is_corrupt() {
        assert_eq!(
            decode("1|Ann|10|5|A"),
            Err(CorruptRecord::FieldCount { found: 5 })
        );
        assert_eq!(
            decode("1|Ann|10|5|A|x|y"),
            Err(CorruptRecord::FieldCount { found: 7 })
        );
    }

    #[test]
    fn non_numeric_id_or_age_is_corrupt() {
        assert_eq!(
            decode("one|Ann|10|5|A|"),
            Err(CorruptRecord::NotAnInteger {
                field: "id",
                value: "one".to_string()
            })
        );
        assert!(matches!(
            decode("1|Ann|10y|5|A|"),
            Err(CorruptRecord::NotAnInteger { field: "age", .. })
        ));
    }

    #[test]
    fn out_of_range_values_still_decode() {
        let student = decode("-3|Old Row|0|5|A|").unwrap();
        assert_eq!(student.id, -3);
        assert_eq!(student.age, 0);
    }
}

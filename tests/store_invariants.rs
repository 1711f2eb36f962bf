use std::fs;

use school_manager::db::{encode, CorruptRecord};
use school_manager::{Student, StoreError, StudentStore, ValidationError};
use tempfile::{tempdir, TempDir};

fn fresh_store() -> (TempDir, StudentStore) {
    let dir = tempdir().unwrap();
    let store = StudentStore::open(dir.path().join("students.db")).unwrap();
    (dir, store)
}

fn student(id: i64, name: &str) -> Student {
    Student::new(id, name, 10, "5", "A", "")
}

#[test]
fn open_creates_an_empty_file_and_keeps_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("students.db");

    let store = StudentStore::open(&path).unwrap();
    assert!(path.exists());
    assert!(store.load_all().unwrap().is_empty());

    store.add(student(1, "Ann")).unwrap();
    let reopened = StudentStore::open(&path).unwrap();
    assert_eq!(reopened.load_all().unwrap(), vec![student(1, "Ann")]);
}

#[test]
fn add_get_remove_scenario() {
    let (_dir, store) = fresh_store();
    let ann = Student::new(1, "Ann", 10, "5", "A", "");

    store.add(ann.clone()).unwrap();

    let duplicate = Student::new(1, "Someone Else", 12, "6", "B", "555");
    assert!(matches!(
        store.add(duplicate),
        Err(StoreError::DuplicateId(1))
    ));

    assert_eq!(store.get_by_id(1).unwrap(), Some(ann));
    store.remove(1).unwrap();
    assert_eq!(store.get_by_id(1).unwrap(), None);
}

#[test]
fn rejected_duplicate_leaves_the_file_untouched() {
    let (_dir, store) = fresh_store();
    store.add(student(1, "Ann")).unwrap();
    store.add(student(2, "Bo")).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    assert!(store.add(student(2, "Other")).is_err());

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    let ids: Vec<i64> = store.load_all().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn file_holds_one_encoded_line_per_record_in_order() {
    let (_dir, store) = fresh_store();
    let records = vec![student(3, "Cy"), student(1, "Ann"), student(2, "Bo")];
    store.save_all(&records).unwrap();

    let expected: String = records.iter().map(|s| format!("{}\n", encode(s))).collect();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), expected);
    assert_eq!(store.load_all().unwrap(), records);
}

#[test]
fn save_replaces_the_file_without_leaving_staged_copies() {
    let (dir, store) = fresh_store();
    store.save_all(&[student(1, "Ann"), student(2, "Bo")]).unwrap();
    store.save_all(&[student(2, "Bo")]).unwrap();

    assert_eq!(fs::read_to_string(store.path()).unwrap(), "2|Bo|10|5|A|\n");
    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("students.db")]);
}

#[test]
fn update_replaces_fields_and_keeps_the_id() {
    let (_dir, store) = fresh_store();
    store.add(student(7, "Ann")).unwrap();

    let replacement = Student::new(99, "Ann Lee", 11, "6", "C", "555-0101");
    store.update(7, replacement).unwrap();

    let stored = store.get_by_id(7).unwrap().unwrap();
    assert_eq!(stored, Student::new(7, "Ann Lee", 11, "6", "C", "555-0101"));
    assert_eq!(store.get_by_id(99).unwrap(), None);
    assert_eq!(store.load_all().unwrap().len(), 1);
}

#[test]
fn update_and_remove_of_unknown_ids_do_not_write() {
    let (_dir, store) = fresh_store();
    store.add(student(1, "Ann")).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    assert!(matches!(
        store.update(5, student(5, "Ghost")),
        Err(StoreError::NotFound(5))
    ));
    assert!(matches!(store.remove(5), Err(StoreError::NotFound(5))));

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn remove_takes_exactly_one_record_and_keeps_order() {
    let (_dir, store) = fresh_store();
    for (id, name) in [(4, "D"), (2, "B"), (9, "I"), (1, "A")] {
        store.add(student(id, name)).unwrap();
    }

    store.remove(9).unwrap();

    let ids: Vec<i64> = store.load_all().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![4, 2, 1]);
}

#[test]
fn corrupt_lines_are_skipped_and_reported() {
    let (_dir, store) = fresh_store();
    fs::write(
        store.path(),
        "1|Ann|10|5|A|\n\n   \n2|Bo|9|4|B\nx|Cy|8|3|C|\n3|Di|ten|3|C|\n",
    )
    .unwrap();

    let report = store.load_report().unwrap();
    assert_eq!(report.students, vec![student(1, "Ann")]);

    let skipped: Vec<(usize, CorruptRecord)> = report
        .skipped
        .into_iter()
        .map(|line| (line.line_number, line.error))
        .collect();
    assert_eq!(
        skipped,
        vec![
            (4, CorruptRecord::FieldCount { found: 5 }),
            (
                5,
                CorruptRecord::NotAnInteger {
                    field: "id",
                    value: "x".to_string()
                }
            ),
            (
                6,
                CorruptRecord::NotAnInteger {
                    field: "age",
                    value: "ten".to_string()
                }
            ),
        ]
    );
}

#[test]
fn mutation_after_a_tolerant_load_drops_corrupt_lines() {
    let (_dir, store) = fresh_store();
    fs::write(store.path(), "1|Ann|10|5|A|\n2|Bo|9|4|B\n").unwrap();

    store.add(student(3, "Cy")).unwrap();

    assert_eq!(
        fs::read_to_string(store.path()).unwrap(),
        "1|Ann|10|5|A|\n3|Cy|10|5|A|\n"
    );
}

#[test]
fn invalid_bytes_do_not_abort_the_load() {
    let (_dir, store) = fresh_store();
    fs::write(store.path(), b"1|Ann|10|5|A|\n2|B\xffo|9|4|B|\n").unwrap();

    let students = store.load_all().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[1].id, 2);
}

#[test]
fn crlf_files_load() {
    let (_dir, store) = fresh_store();
    fs::write(store.path(), "1|Ann|10|5|A|555\r\n2|Bo|9|4|B|\r\n").unwrap();

    let students = store.load_all().unwrap();
    assert_eq!(students[0].phone, "555");
    assert_eq!(students[1].name, "Bo");
}

#[test]
fn delimiters_in_input_never_break_the_line_shape() {
    let (_dir, store) = fresh_store();
    store
        .add(Student::new(1, "Ann|Lee", 10, "5\n", "A|B", "555|0101"))
        .unwrap();
    store.add(student(2, "Bo")).unwrap();

    let students = store.load_all().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].name, "Ann Lee");
    assert_eq!(students[0].grade, "5");
    assert_eq!(students[0].section, "A B");
    assert_eq!(students[0].phone, "555 0101");
}

#[test]
fn semantic_rules_are_checked_on_add_and_update() {
    let (_dir, store) = fresh_store();

    let mut young = student(1, "Ann");
    young.age = 2;
    assert!(matches!(
        store.add(young),
        Err(StoreError::Invalid(ValidationError::AgeOutOfRange(2)))
    ));
    assert!(matches!(
        store.add(student(0, "Zero")),
        Err(StoreError::Invalid(ValidationError::NonPositiveId(0)))
    ));

    store.add(student(1, "Ann")).unwrap();
    let mut nameless = student(1, "");
    nameless.name = "  ".to_string();
    assert!(matches!(
        store.update(1, nameless),
        Err(StoreError::Invalid(ValidationError::MissingField("Name")))
    ));
    assert_eq!(store.get_by_id(1).unwrap(), Some(student(1, "Ann")));
}

#[test]
fn out_of_range_rows_on_disk_still_load() {
    let (_dir, store) = fresh_store();
    fs::write(store.path(), "-1|Legacy|0|1|A|\n").unwrap();

    let students = store.load_all().unwrap();
    assert_eq!(students, vec![Student::new(-1, "Legacy", 0, "1", "A", "")]);
}

#[test]
fn io_failures_surface_as_errors() {
    let dir = tempdir().unwrap();
    let store = StudentStore::open(dir.path().join("students.db")).unwrap();
    fs::remove_file(store.path()).unwrap();
    fs::create_dir(store.path()).unwrap();

    assert!(matches!(
        store.load_all(),
        Err(StoreError::Io { action: "read", .. })
    ));
}

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Student;

/// Fields of the student form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum StudentField {
    #[default]
    Id,
    Name,
    Age,
    Grade,
    Section,
    Phone,
}

impl StudentField {
    pub(crate) const ALL: [StudentField; 6] = [
        StudentField::Id,
        StudentField::Name,
        StudentField::Age,
        StudentField::Grade,
        StudentField::Section,
        StudentField::Phone,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            StudentField::Id => "ID",
            StudentField::Name => "Name",
            StudentField::Age => "Age",
            StudentField::Grade => "Grade",
            StudentField::Section => "Section",
            StudentField::Phone => "Phone",
        }
    }

    fn numeric(self) -> bool {
        matches!(self, StudentField::Id | StudentField::Age)
    }

    fn optional(self) -> bool {
        self == StudentField::Phone
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Form state shared by the add and edit dialogs. When `original` is set the
/// form edits that student: the id is locked and a blank field keeps the
/// current value.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) age: String,
    pub(crate) grade: String,
    pub(crate) section: String,
    pub(crate) phone: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
    original: Option<Student>,
}

impl StudentForm {
    /// Blank form for a new student.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Prefilled form for editing; focus starts on the name.
    pub(crate) fn from_student(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            name: student.name.clone(),
            age: student.age.to_string(),
            grade: student.grade.clone(),
            section: student.section.clone(),
            phone: student.phone.clone(),
            active: StudentField::Name,
            error: None,
            original: Some(student.clone()),
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.original.is_some()
    }

    fn field_locked(&self, field: StudentField) -> bool {
        field == StudentField::Id && self.is_editing()
    }

    fn value(&self, field: StudentField) -> &String {
        match field {
            StudentField::Id => &self.id,
            StudentField::Name => &self.name,
            StudentField::Age => &self.age,
            StudentField::Grade => &self.grade,
            StudentField::Section => &self.section,
            StudentField::Phone => &self.phone,
        }
    }

    fn value_mut(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::Id => &mut self.id,
            StudentField::Name => &mut self.name,
            StudentField::Age => &mut self.age,
            StudentField::Grade => &mut self.grade,
            StudentField::Section => &mut self.section,
            StudentField::Phone => &mut self.phone,
        }
    }

    /// Move focus forward, skipping the locked id while editing.
    pub(crate) fn next_field(&mut self) {
        self.step(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.step(StudentField::ALL.len() - 1);
    }

    fn step(&mut self, by: usize) {
        let len = StudentField::ALL.len();
        let mut idx = self.active.index();
        loop {
            idx = (idx + by) % len;
            let candidate = StudentField::ALL[idx];
            if !self.field_locked(candidate) {
                self.active = candidate;
                return;
            }
        }
    }

    /// Append a character to the active field. Numeric fields take digits only.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        if self.field_locked(field) || ch.is_control() {
            return false;
        }
        if field.numeric() && !ch.is_ascii_digit() {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        if !self.field_locked(field) {
            self.value_mut(field).pop();
        }
    }

    /// Validate the inputs and return a student ready for the store.
    pub(crate) fn parse_inputs(&self) -> Result<Student> {
        let text = |field: StudentField| -> Result<String> {
            let raw = self.value(field).trim();
            if !raw.is_empty() {
                return Ok(raw.to_string());
            }
            match &self.original {
                Some(current) => Ok(current_value(current, field)),
                None if field.optional() => Ok(String::new()),
                None => Err(anyhow!("{} is required.", field.label())),
            }
        };

        let id = text(StudentField::Id)?
            .parse::<i64>()
            .map_err(|_| anyhow!("ID must be a whole number."))?;
        if id <= 0 {
            return Err(anyhow!("ID must be positive."));
        }
        let name = text(StudentField::Name)?;
        let age = text(StudentField::Age)?
            .parse::<i32>()
            .map_err(|_| anyhow!("Age must be a whole number."))?;
        let grade = text(StudentField::Grade)?;
        let section = text(StudentField::Section)?;
        let phone = text(StudentField::Phone)?;

        let student = Student::new(id, name, age, grade, section, phone);
        student.validate()?;
        Ok(student)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: StudentField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if !value.is_empty() {
            value.clone()
        } else if let Some(current) = &self.original {
            format!("<keep: {}>", current_value(current, field))
        } else if field.optional() {
            "<optional>".to_string()
        } else {
            "<required>".to_string()
        };

        let style = if self.field_locked(field) {
            Style::default().fg(Color::DarkGray)
        } else if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(field_prefix(field)),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        self.value(field).chars().count()
    }
}

/// Label plus separator as rendered in front of each value.
pub(crate) fn field_prefix(field: StudentField) -> String {
    format!("{}: ", field.label())
}

fn current_value(student: &Student, field: StudentField) -> String {
    match field {
        StudentField::Id => student.id.to_string(),
        StudentField::Name => student.name.clone(),
        StudentField::Age => student.age.to_string(),
        StudentField::Grade => student.grade.clone(),
        StudentField::Section => student.section.clone(),
        StudentField::Phone => student.phone.clone(),
    }
}

/// Pending confirmation before a student is removed.
#[derive(Clone)]
pub(crate) struct ConfirmStudentDelete {
    pub(crate) student: Student,
}

/// Inline prompt for looking a student up by id.
#[derive(Default, Clone)]
pub(crate) struct IdPrompt {
    pub(crate) query: String,
}

impl IdPrompt {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            self.query.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.query.pop();
    }

    pub(crate) fn parse(&self) -> Result<i64> {
        let raw = self.query.trim();
        if raw.is_empty() {
            return Err(anyhow!("Enter an ID to search for."));
        }
        raw.parse::<i64>().map_err(|_| anyhow!("Invalid number."))
    }
}

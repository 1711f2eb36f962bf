use crate::models::Student;

/// The roster as shown on screen: sorted by id, with a selection cursor.
/// Sorting is a presentation choice; the file keeps insertion order.
#[derive(Default)]
pub(crate) struct RosterScreen {
    pub(crate) students: Vec<Student>,
    pub(crate) selected: usize,
}

impl RosterScreen {
    pub(crate) fn new(students: Vec<Student>) -> Self {
        let mut screen = Self::default();
        screen.replace(students, None);
        screen
    }

    /// Swap in a fresh load, keeping the cursor on `focus_id` when it is still
    /// present and otherwise clamping it into range.
    pub(crate) fn replace(&mut self, mut students: Vec<Student>, focus_id: Option<i64>) {
        students.sort_by_key(|student| student.id);
        self.students = students;

        if let Some(id) = focus_id {
            if self.focus(id) {
                return;
            }
        }
        self.ensure_in_bounds();
    }

    /// Move the cursor to the student with `id`; false when it is not listed.
    pub(crate) fn focus(&mut self, id: i64) -> bool {
        match self.students.iter().position(|student| student.id == id) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub(crate) fn current(&self) -> Option<&Student> {
        self.students.get(self.selected)
    }

    pub(crate) fn select_next(&mut self) {
        if self.selected + 1 < self.students.len() {
            self.selected += 1;
        }
    }

    pub(crate) fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.students.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.students.len() {
            self.selected = self.students.len().saturating_sub(1);
        }
    }
}

use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::db::{LoadReport, StoreError, StudentStore};
use crate::models::Student;

use super::forms::{field_prefix, ConfirmStudentDelete, IdPrompt, StudentField, StudentForm};
use super::helpers::{centered_rect, clip, student_detail_lines, surface_error};
use super::screens::RosterScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Roster column titles and their widths in characters.
const COLUMNS: [(&str, u16); 6] = [
    ("ID", 6),
    ("Name", 22),
    ("Age", 6),
    ("Grade", 10),
    ("Section", 10),
    ("Phone", 15),
];

/// Modal states layered over the roster.
enum Mode {
    Normal,
    Adding(StudentForm),
    Editing { id: i64, form: StudentForm },
    ConfirmDelete(ConfirmStudentDelete),
    FindingById(IdPrompt),
    Viewing(Student),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: StudentStore,
    roster: RosterScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app from an initial load so startup warnings reach the footer.
    pub fn new(store: StudentStore, report: LoadReport) -> Self {
        let skipped = report.skipped.len();
        let mut app = Self {
            store,
            roster: RosterScreen::new(report.students),
            mode: Mode::Normal,
            status: None,
        };
        app.report_skipped(skipped);
        app
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add(code, form)?,
            Mode::Editing { id, form } => self.handle_edit(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::FindingById(prompt) => self.handle_find(code, prompt)?,
            Mode::Viewing(student) => self.handle_view(code, student)?,
        };

        Ok(exit)
    }

    /// Students currently listed, in display order.
    pub fn students(&self) -> &[Student] {
        &self.roster.students
    }

    /// The highlighted student, if any.
    pub fn selected(&self) -> Option<&Student> {
        self.roster.current()
    }

    /// Text of the footer status line.
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.roster.select_previous(),
            KeyCode::Down => self.roster.select_next(),
            KeyCode::Home => self.roster.select_first(),
            KeyCode::End => self.roster.select_last(),
            KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Adding(StudentForm::new()));
            }
            KeyCode::Char('e') | KeyCode::Enter => match self.roster.current() {
                Some(student) => {
                    let id = student.id;
                    let form = StudentForm::from_student(student);
                    self.clear_status();
                    return Ok(Mode::Editing { id, form });
                }
                None => self.set_status("No records found.", StatusKind::Error),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.roster.current() {
                Some(student) => {
                    return Ok(Mode::ConfirmDelete(ConfirmStudentDelete {
                        student: student.clone(),
                    }));
                }
                None => self.set_status("No records found.", StatusKind::Error),
            },
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::FindingById(IdPrompt::default()));
            }
            KeyCode::Char('r') => {
                let focus = self.roster.current().map(|student| student.id);
                match self.reload(focus) {
                    Ok(()) if self.status.is_none() => {
                        self.set_status("Reloaded.", StatusKind::Info)
                    }
                    Ok(()) => {}
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add(&mut self, code: KeyCode, mut form: StudentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_student(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Adding(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit(&mut self, code: KeyCode, id: i64, mut form: StudentForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_student(id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Editing { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmStudentDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_find(&mut self, code: KeyCode, mut prompt: IdPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                prompt.backspace();
                Ok(Mode::FindingById(prompt))
            }
            KeyCode::Enter => {
                let id = match prompt.parse() {
                    Ok(id) => id,
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        return Ok(Mode::FindingById(prompt));
                    }
                };
                match self.store.get_by_id(id) {
                    Ok(Some(student)) => {
                        match self.reload(Some(student.id)) {
                            Ok(()) => self.clear_status(),
                            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                        }
                        Ok(Mode::Viewing(student))
                    }
                    Ok(None) => {
                        self.set_status("Not found.", StatusKind::Error);
                        Ok(Mode::FindingById(prompt))
                    }
                    Err(err) => {
                        let message = surface_error(&anyhow::Error::from(err));
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::FindingById(prompt))
                    }
                }
            }
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
                Ok(Mode::FindingById(prompt))
            }
            _ => Ok(Mode::FindingById(prompt)),
        }
    }

    fn handle_view(&mut self, code: KeyCode, student: Student) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Ok(Mode::Normal),
            KeyCode::Char('e') => Ok(Mode::Editing {
                id: student.id,
                form: StudentForm::from_student(&student),
            }),
            KeyCode::Char('d') => Ok(Mode::ConfirmDelete(ConfirmStudentDelete { student })),
            _ => Ok(Mode::Viewing(student)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_roster(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_student_form(frame, area, "Add Student", form),
            Mode::Editing { form, .. } => {
                self.draw_student_form(frame, area, "Update Student", form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::FindingById(prompt) => self.draw_find_bar(frame, area, prompt),
            Mode::Viewing(student) => self.draw_student_detail(frame, area, student),
            Mode::Normal => {}
        }
    }

    fn draw_roster(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Students ({}) ", self.roster.students.len()))
            .borders(Borders::ALL);

        if self.roster.students.is_empty() {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "No records found. Press [a] to add a student.",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let header_style = Style::default().add_modifier(Modifier::BOLD);
        let header = Row::new(
            COLUMNS
                .iter()
                .map(|(title, _)| Cell::from(*title).style(header_style)),
        );

        let rows = self.roster.students.iter().map(|student| {
            let values = [
                student.id.to_string(),
                student.name.clone(),
                student.age.to_string(),
                student.grade.clone(),
                student.section.clone(),
                student.phone.clone(),
            ];
            Row::new(
                values
                    .iter()
                    .zip(COLUMNS.iter())
                    .map(|(value, (_, width))| Cell::from(clip(value, *width as usize - 1))),
            )
        });

        let widths = COLUMNS.iter().map(|(_, width)| Constraint::Length(*width));
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(0)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = TableState::default().with_selected(Some(self.roster.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[↑↓]", " Navigate   "),
                ("[a]", " Add   "),
                ("[e]", " Update   "),
                ("[d]", " Delete   "),
                ("[/]", " Search by ID   "),
                ("[r]", " Reload   "),
                ("[q]", " Quit"),
            ],
            Mode::Adding(_) | Mode::Editing { .. } => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmDelete(_) => &[("[y]", " Delete   "), ("[n]", " Keep")],
            Mode::FindingById(_) => &[("[Enter]", " Search   "), ("[Esc]", " Close")],
            Mode::Viewing(_) => &[
                ("[e]", " Update   "),
                ("[d]", " Delete   "),
                ("[Esc]", " Close"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = StudentField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            let hint = if form.is_editing() {
                "Clear a field to keep its current value • Enter to save • Esc to cancel"
            } else {
                "Enter to save • Tab to switch • Esc to cancel"
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = StudentField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = field_prefix(form.active).chars().count() as u16;
        let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmStudentDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete student {} ({})?",
                confirm.student.id, confirm.student.name
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_find_bar(&self, frame: &mut Frame, area: Rect, prompt: &IdPrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search by ID");
        let paragraph = Paragraph::new(Span::raw(format!("ID: {}", prompt.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "ID: ".len() as u16 + prompt.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_student_detail(&self, frame: &mut Frame, area: Rect, student: &Student) {
        let popup_area = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Student {}", student.id))
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(student_detail_lines(student))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_new_student(&mut self, form: &StudentForm) -> Result<()> {
        let student = form.parse_inputs()?;
        let id = student.id;
        self.store.add(student)?;
        self.reload(Some(id))?;
        self.set_status("Student added successfully.", StatusKind::Info);
        Ok(())
    }

    fn save_existing_student(&mut self, id: i64, form: &StudentForm) -> Result<()> {
        let student = form.parse_inputs()?;
        match self.store.update(id, student) {
            Ok(()) => {
                self.reload(Some(id))?;
                self.set_status("Updated successfully.", StatusKind::Info);
                Ok(())
            }
            Err(StoreError::NotFound(_)) => {
                // Removed behind our back; show the file as it is now.
                self.reload(None)?;
                Err(StoreError::NotFound(id).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmStudentDelete) -> Result<()> {
        let outcome = self.store.remove(confirm.student.id);
        self.reload(None)?;
        outcome?;
        self.set_status(
            format!("Deleted student {}.", confirm.student.id),
            StatusKind::Info,
        );
        Ok(())
    }

    fn reload(&mut self, focus_id: Option<i64>) -> Result<()> {
        let report = self.store.load_report()?;
        let skipped = report.skipped.len();
        self.roster.replace(report.students, focus_id);
        self.report_skipped(skipped);
        Ok(())
    }

    fn report_skipped(&mut self, skipped: usize) {
        if skipped > 0 {
            self.set_status(
                format!("Skipped {skipped} corrupt line(s) in the student file."),
                StatusKind::Warning,
            );
        } else {
            self.clear_status();
        }
    }
}

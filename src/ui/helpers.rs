use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Student;

/// Clip `text` to `width` characters, marking the cut with an ellipsis.
pub(crate) fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut clipped: String = text.chars().take(width - 1).collect();
    clipped.push('…');
    clipped
}

/// Label/value lines for the detail popup.
pub(crate) fn student_detail_lines(student: &Student) -> Vec<Line<'static>> {
    let label_style = Style::default().add_modifier(Modifier::BOLD);
    let phone = if student.phone.is_empty() {
        "-".to_string()
    } else {
        student.phone.clone()
    };

    [
        ("ID", student.id.to_string()),
        ("Name", student.name.clone()),
        ("Age", student.age.to_string()),
        ("Grade", student.grade.clone()),
        ("Section", student.section.clone()),
        ("Phone", phone),
    ]
    .into_iter()
    .map(|(label, value)| {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), label_style),
            Span::raw(value),
        ])
    })
    .collect()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Render an error and its causes on one line, outermost first, so a path
/// attached by the store stays next to the OS message.
pub(crate) fn surface_error(err: &Error) -> String {
    format!("{err:#}")
}

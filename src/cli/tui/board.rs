//! Board layout: filter tabs, sort controls, task list and status bar

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use super::app::{App, FormField, FormState, FormTarget, Mode};
use crate::domain::{Priority, SortKind, Task, ViewFilter};
use crate::storage::Persistence;

/// Draw the board
pub fn draw<P: Persistence>(frame: &mut Frame, app: &App<P>) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter tabs
            Constraint::Length(1), // Sort controls
            Constraint::Min(5),    // Task list
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    draw_filter_tabs(frame, app, chunks[0]);
    draw_sort_controls(frame, app, chunks[1]);
    draw_task_list(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    if let Mode::Form(state) = app.mode() {
        draw_form(frame, state, area);
    }
}

fn draw_filter_tabs<P: Persistence>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let counts = app.counts();
    let titles: Vec<String> = ViewFilter::ALL
        .iter()
        .map(|filter| format!("{} ({})", capitalize(filter.as_str()), counts.get(*filter)))
        .collect();
    let selected = ViewFilter::ALL
        .iter()
        .position(|f| *f == app.filter())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().title("tasksort").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn draw_sort_controls<P: Persistence>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let mut spans = vec![Span::raw(" Sort: ")];

    for (index, kind) in SortKind::ALL.iter().enumerate() {
        let label = format!("[{}] {}", index + 1, kind.label());
        let style = if *kind == app.strategy() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("  "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_task_list<P: Persistence>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let block = Block::default()
        .title(format!("Tasks: {}", app.strategy().describe()))
        .borders(Borders::ALL);

    if app.view().is_empty() {
        let hint = if app.counts().all == 0 {
            "No tasks yet. Press 'a' to add one.".to_string()
        } else {
            format!(
                "No {} tasks. Press Tab to change the filter.",
                app.filter()
            )
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Borders, highlight symbol, checkbox and the date/priority columns
    let title_width = (area.width as usize).saturating_sub(2 + 2 + 4 + 12 + 8);
    let items: Vec<ListItem> = app
        .view()
        .iter()
        .map(|task| task_item(task, title_width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected()));

    frame.render_stateful_widget(list, area, &mut state);
}

fn task_item(task: &Task, title_width: usize) -> ListItem<'static> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let title_style = if task.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(vec![
        Span::raw(checkbox),
        Span::styled(fit(&task.title, title_width), title_style),
        Span::raw(format!("{:<12}", task.due_date.format("%Y-%m-%d").to_string())),
        Span::styled(
            format!("{:<8}", task.priority.as_str()),
            Style::default().fg(priority_color(task.priority)),
        ),
    ]))
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn draw_status_bar<P: Persistence>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let (content, style) = match app.mode() {
        Mode::Normal => (
            app.status()
                .unwrap_or("[space]toggle [a]dd [e]dit [d]elete [1-3/s]ort [tab]filter [q]uit [?]help")
                .to_string(),
            Style::default(),
        ),
        Mode::Form(_) => (
            "[tab]next field [enter]save [esc]cancel".to_string(),
            Style::default().fg(Color::Green),
        ),
        Mode::ConfirmDelete { title, .. } => (
            format!("Delete '{}'? [y/n]", title),
            Style::default().fg(Color::Yellow),
        ),
    };

    let paragraph = Paragraph::new(content)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

fn draw_form(frame: &mut Frame, state: &FormState, area: Rect) {
    let popup = centered_rect(60, 12, area);

    let title = match state.target {
        FormTarget::Add => "New task".to_string(),
        FormTarget::Edit(ref id) => format!("Edit {}", id),
    };

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = field == state.field;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let cursor = if focused { "_" } else { "" };

        lines.push(Line::from(Span::styled(field.label(), label_style)));
        lines.push(Line::from(format!("  {}{}", field.value(&state.form), cursor)));
    }
    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup);
    frame.render_widget(form, popup);
}

/// A rectangle `percent_x` wide and `height` rows tall, centered in `area`
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Pads or truncates `s` to exactly `width` columns, ending truncated text
/// with "..."
fn fit(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        return format!("{}{}", s, " ".repeat(width - len));
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let kept: String = s.chars().take(width - 3).collect();
    format!("{}...", kept)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_short_text() {
        assert_eq!(fit("abc", 6), "abc   ");
    }

    #[test]
    fn fit_truncates_long_text() {
        assert_eq!(fit("hello world", 8), "hello...");
        assert_eq!(fit("hello", 2), "..");
    }

    #[test]
    fn fit_counts_chars_not_bytes() {
        assert_eq!(fit("ééé", 3), "ééé");
    }

    #[test]
    fn capitalize_labels() {
        assert_eq!(capitalize("active"), "Active");
        assert_eq!(capitalize(""), "");
    }
}

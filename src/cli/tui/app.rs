//! Board state and key handling

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::board;
use super::event::{Event, EventHandler};
use super::terminal::Terminal;
use crate::cli::form::{TaskForm, DUE_DATE_FORMAT};
use crate::domain::{Counts, SortKind, Task, TaskId, ViewFilter};
use crate::session::{Intent, Session};
use crate::storage::Persistence;

/// Field focused in the task form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Due,
    Priority,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Due,
        FormField::Priority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Due => "Due (YYYY-MM-DD)",
            FormField::Priority => "Priority (low/medium/high)",
        }
    }

    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Due,
            FormField::Due => FormField::Priority,
            FormField::Priority => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Priority,
            FormField::Description => FormField::Title,
            FormField::Due => FormField::Description,
            FormField::Priority => FormField::Due,
        }
    }

    pub fn value(self, form: &TaskForm) -> &str {
        match self {
            FormField::Title => &form.title,
            FormField::Description => &form.description,
            FormField::Due => &form.due,
            FormField::Priority => &form.priority,
        }
    }

    fn value_mut(self, form: &mut TaskForm) -> &mut String {
        match self {
            FormField::Title => &mut form.title,
            FormField::Description => &mut form.description,
            FormField::Due => &mut form.due,
            FormField::Priority => &mut form.priority,
        }
    }
}

/// What submitting the form does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    Add,
    Edit(TaskId),
}

/// An open add/edit form
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub target: FormTarget,
    pub form: TaskForm,
    pub field: FormField,
    pub error: Option<String>,
}

/// Input mode
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Form(FormState),
    ConfirmDelete { id: TaskId, title: String },
}

/// Application state
pub struct App<P: Persistence> {
    session: Session<P>,

    /// Last refreshed view, in display order
    view: Vec<Task>,

    /// Selected row in `view`
    selected: usize,

    mode: Mode,

    /// Status message to display
    status: Option<String>,

    should_quit: bool,
}

impl<P: Persistence> App<P> {
    pub fn new(session: Session<P>) -> Self {
        let view = session.view();
        Self {
            session,
            view,
            selected: 0,
            mode: Mode::Normal,
            status: None,
            should_quit: false,
        }
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Tick => {}
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        board::draw(frame, self);
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Form(_) => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),

            // Sort controls
            KeyCode::Char('1') => self.change_strategy(SortKind::DueDate),
            KeyCode::Char('2') => self.change_strategy(SortKind::Priority),
            KeyCode::Char('3') => self.change_strategy(SortKind::Alphabetical),
            KeyCode::Char('s') => self.change_strategy(self.session.strategy().next()),

            // Filter tabs
            KeyCode::Tab | KeyCode::Char('f') => self.change_filter(self.session.filter().next()),

            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.mode = Mode::ConfirmDelete {
                        id: task.id.clone(),
                        title: task.title.clone(),
                    };
                }
            }

            KeyCode::Char('?') => {
                self.status = Some(
                    "j/k:move 1-3/s:sort tab:filter space:toggle a:add e:edit d:delete q:quit"
                        .to_string(),
                );
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Mode::Form(state) = &mut self.mode else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Tab | KeyCode::Down => state.field = state.field.next(),
            KeyCode::BackTab | KeyCode::Up => state.field = state.field.prev(),
            KeyCode::Backspace => {
                state.field.value_mut(&mut state.form).pop();
            }
            KeyCode::Char(c) => state.field.value_mut(&mut state.form).push(c),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Mode::ConfirmDelete { id, title } = std::mem::take(&mut self.mode) {
                    if self.apply(Intent::Delete(id)) {
                        self.status = Some(format!("Deleted: {}", title));
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Mode::Form(state) = &mut self.mode else {
            return;
        };

        let validated = match &state.target {
            FormTarget::Edit(id) => match self.session.get(id) {
                Some(task) => state.form.validate_edit(task),
                None => state.form.validate(),
            },
            FormTarget::Add => state.form.validate(),
        };
        let fields = match validated {
            Ok(fields) => fields,
            Err(e) => {
                state.error = Some(e.to_string());
                return;
            }
        };

        let title = fields.title.clone();
        let (intent, message) = match state.target.clone() {
            FormTarget::Add => (Intent::Add(fields), format!("Created: {}", title)),
            FormTarget::Edit(id) => (Intent::Edit(id, fields), format!("Updated: {}", title)),
        };

        self.mode = Mode::Normal;
        if self.apply(intent) {
            self.status = Some(message);
        }
    }

    fn open_add_form(&mut self) {
        let form = TaskForm {
            due: Utc::now().format(DUE_DATE_FORMAT).to_string(),
            priority: "medium".to_string(),
            ..TaskForm::default()
        };
        self.mode = Mode::Form(FormState {
            target: FormTarget::Add,
            form,
            field: FormField::Title,
            error: None,
        });
    }

    fn open_edit_form(&mut self) {
        if let Some(task) = self.selected_task() {
            self.mode = Mode::Form(FormState {
                target: FormTarget::Edit(task.id.clone()),
                form: TaskForm::from_task(task),
                field: FormField::Title,
                error: None,
            });
        }
    }

    fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, title, completed) = (task.id.clone(), task.title.clone(), task.completed);

        if self.apply(Intent::Toggle(id)) {
            let verb = if completed { "Reopened" } else { "Completed" };
            self.status = Some(format!("{}: {}", verb, title));
        }
    }

    fn change_strategy(&mut self, kind: SortKind) {
        if self.apply(Intent::ChangeStrategy(kind)) {
            self.status = Some(format!("Sort: {}", kind.describe()));
        }
    }

    fn change_filter(&mut self, filter: ViewFilter) {
        if self.apply(Intent::ChangeFilter(filter)) {
            self.status = Some(format!("Showing {} tasks", filter));
        }
    }

    /// Dispatches an intent and refreshes the view, keeping the selection on
    /// the task the intent acted on when it is still visible
    ///
    /// Returns false if the session rejected the intent.
    fn apply(&mut self, intent: Intent) -> bool {
        let keep = self.selected_task().map(|t| t.id.clone());

        let refresh = match self.session.dispatch(intent) {
            Ok(refresh) => refresh,
            Err(e) => {
                self.status = Some(e.to_string());
                return false;
            }
        };

        let focus = refresh.affected.as_ref().map(|t| t.id.clone()).or(keep);
        self.view = refresh.view;
        self.selected = focus
            .and_then(|id| self.view.iter().position(|t| t.id == id))
            .unwrap_or(self.selected)
            .min(self.view.len().saturating_sub(1));

        if refresh.changed && !refresh.saved {
            self.status = Some("Changes could not be saved".to_string());
            return false;
        }

        true
    }

    fn move_selection(&mut self, delta: isize) {
        if self.view.is_empty() {
            return;
        }
        let len = self.view.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.view.get(self.selected)
    }

    // Accessors for the board view

    pub fn view(&self) -> &[Task] {
        &self.view
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn counts(&self) -> Counts {
        self.session.counts()
    }

    pub fn filter(&self) -> ViewFilter {
        self.session.filter()
    }

    pub fn strategy(&self) -> SortKind {
        self.session.strategy()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

//! Task CLI commands
//!
//! Every command opens the current project, starts a [`Session`] over its
//! task store and dispatches a single intent.

use anyhow::{bail, Context, Result};
use chrono::Utc;

use super::form::{TaskForm, DUE_DATE_FORMAT};
use super::output::Output;
use crate::domain::{SortKind, Task, TaskId, ViewFilter};
use crate::session::{Intent, Refresh, Session};
use crate::storage::{Project, TaskStore};

/// Field values given on the command line for `add` and `edit`
#[derive(Debug, Default)]
pub struct FieldArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<String>,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due.is_none()
            && self.priority.is_none()
    }

    /// Overwrites the form fields that were given
    fn apply_to(self, form: &mut TaskForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(due) = self.due {
            form.due = due;
        }
        if let Some(priority) = self.priority {
            form.priority = priority;
        }
    }
}

fn open_session(
    project: &Project,
    sort: Option<SortKind>,
    filter: Option<ViewFilter>,
) -> Session<TaskStore> {
    let config = &project.config().project;
    Session::open(
        project.task_store(),
        sort.unwrap_or(config.default_sort),
        filter.unwrap_or(config.default_filter),
    )
}

/// Dispatches an intent, failing the command if a change could not be saved
fn dispatch(
    project: &Project,
    session: &mut Session<TaskStore>,
    intent: Intent,
) -> Result<Refresh> {
    let refresh = session.dispatch(intent)?;

    if refresh.changed && !refresh.saved {
        bail!(
            "Failed to save tasks to {}",
            project.task_store().path().display()
        );
    }

    Ok(refresh)
}

fn parse_id(id: &str) -> Result<TaskId> {
    id.parse()
        .with_context(|| format!("Invalid task ID: '{}'", id))
}

pub fn add_task(output: &Output, args: FieldArgs) -> Result<()> {
    let project = Project::open_current()?;
    let mut session = open_session(&project, None, None);

    // Due date defaults to today, as with a freshly created task
    let mut form = TaskForm {
        due: Utc::now().format(DUE_DATE_FORMAT).to_string(),
        ..TaskForm::default()
    };
    args.apply_to(&mut form);
    let fields = form.validate()?;

    let refresh = dispatch(&project, &mut session, Intent::Add(fields))?;
    let task = refresh
        .affected
        .context("Added task missing from refresh")?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

pub fn edit_task(output: &Output, id_str: &str, args: FieldArgs) -> Result<()> {
    if args.is_empty() {
        bail!("Nothing to change: pass --title, --description, --due or --priority");
    }

    let project = Project::open_current()?;
    let mut session = open_session(&project, None, None);
    let id = parse_id(id_str)?;

    let task = match session.get(&id) {
        Some(task) => task,
        None => bail!("Task not found: {}", id),
    };
    let mut form = TaskForm::from_task(task);
    args.apply_to(&mut form);
    let fields = form.validate_edit(task)?;

    let refresh = dispatch(&project, &mut session, Intent::Edit(id.clone(), fields))?;
    let task = match refresh.affected {
        Some(task) => task,
        None => bail!("Task not found: {}", id),
    };

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Updated task: {} - {}", task.id, task.title));
    }

    Ok(())
}

pub fn toggle_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut session = open_session(&project, None, None);
    let id = parse_id(id_str)?;

    let refresh = dispatch(&project, &mut session, Intent::Toggle(id.clone()))?;
    let task = match refresh.affected {
        Some(task) => task,
        None => bail!("Task not found: {}", id),
    };

    if output.is_json() {
        output.data(&task);
    } else if task.completed {
        output.success(&format!("Completed task: {}", task.id));
    } else {
        output.success(&format!("Reopened task: {}", task.id));
    }

    Ok(())
}

pub fn delete_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut session = open_session(&project, None, None);
    let id = parse_id(id_str)?;

    let refresh = dispatch(&project, &mut session, Intent::Delete(id.clone()))?;
    let task = match refresh.affected {
        Some(task) => task,
        None => bail!("Task not found: {}", id),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id.to_string(),
            "deleted": true,
        }));
    } else {
        output.success(&format!("Deleted task: {} - {}", task.id, task.title));
    }

    Ok(())
}

pub fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let session = open_session(&project, None, None);
    let id = parse_id(id_str)?;

    let task = session
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    if output.is_json() {
        output.data(task);
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Priority: {}", task.priority);
        println!("Due: {}", output.date(task.due_date));
        println!("Status: {}", if task.completed { "completed" } else { "active" });
        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

        if !task.description.is_empty() {
            println!("\nDescription:");
            println!("{}", task.description);
        }
    }

    Ok(())
}

pub fn list_tasks(
    output: &Output,
    sort: Option<SortKind>,
    filter: Option<ViewFilter>,
) -> Result<()> {
    let project = Project::open_current()?;
    let session = open_session(&project, sort, filter);

    print_view(output, &session, &session.view());
    Ok(())
}

/// Changes the project's default sort and shows the resorted list
pub fn set_sort(output: &Output, kind: SortKind) -> Result<()> {
    let mut project = Project::open_current()?;
    let mut session = open_session(&project, None, None);

    let refresh = dispatch(&project, &mut session, Intent::ChangeStrategy(kind))?;

    project.config_mut().project.default_sort = kind;
    project.config().save_project()?;

    if !output.is_json() {
        output.success(&format!("Default sort: {} ({})", kind, kind.describe()));
    }
    print_view(output, &session, &refresh.view);

    Ok(())
}

/// Changes the project's default filter and shows the filtered list
pub fn set_filter(output: &Output, filter: ViewFilter) -> Result<()> {
    let mut project = Project::open_current()?;
    let mut session = open_session(&project, None, None);

    let refresh = dispatch(&project, &mut session, Intent::ChangeFilter(filter))?;

    project.config_mut().project.default_filter = filter;
    project.config().save_project()?;

    if !output.is_json() {
        output.success(&format!("Default filter: {}", filter));
    }
    print_view(output, &session, &refresh.view);

    Ok(())
}

fn print_view(output: &Output, session: &Session<TaskStore>, view: &[Task]) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "sort": session.strategy(),
            "filter": session.filter(),
            "counts": session.counts(),
            "tasks": view,
        }));
        return;
    }

    if view.is_empty() {
        if session.collection().is_empty() {
            println!("No tasks");
        } else {
            println!(
                "No {} tasks ({} total). Try 'tasksort list --filter all'",
                session.filter(),
                session.collection().len()
            );
        }
        return;
    }

    println!(
        "{:<14} {:<12} {:<8} {:<6} TITLE",
        "ID", "DUE", "PRIORITY", "DONE"
    );
    println!("{}", "-".repeat(70));

    for task in view {
        println!(
            "{:<14} {:<12} {:<8} {:<6} {}",
            task.id.as_str(),
            output.date(task.due_date),
            task.priority.as_str(),
            if task.completed { "[x]" } else { "[ ]" },
            task.title
        );
    }

    println!();
    println!(
        "{} of {} task(s), sorted by {}",
        view.len(),
        session.collection().len(),
        session.strategy()
    );
}

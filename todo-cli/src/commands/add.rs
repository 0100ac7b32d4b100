//! Add a todo.
//!
//! Words are joined into the subject, except for these tokens:
//! - `+name` adds a project
//! - `@name` adds a context
//! - `pri:X` sets the priority
//! - `due:DATE` sets the due date (RFC 3339 or `YYYY-MM-DD`)

use anyhow::{Context, Result};
use todo_types::{timestamp, TaskRecord};

use super::Workspace;

/// A todo as typed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    /// Subject text.
    pub subject: String,
    /// Projects, without the `+`.
    pub projects: Vec<String>,
    /// Contexts, without the `@`.
    pub contexts: Vec<String>,
    /// Priority label.
    pub priority: String,
    /// Due date in storage form.
    pub due: String,
}

/// Split command-line words into a [`NewTodo`].
pub fn parse_words(words: &[String]) -> Result<NewTodo> {
    let mut todo = NewTodo::default();
    let mut subject = Vec::new();

    for word in words.iter().flat_map(|w| w.split_whitespace()) {
        if let Some(project) = word.strip_prefix('+').filter(|p| !p.is_empty()) {
            if !todo.projects.iter().any(|p| p == project) {
                todo.projects.push(project.to_string());
            }
        } else if let Some(context) = word.strip_prefix('@').filter(|c| !c.is_empty()) {
            if !todo.contexts.iter().any(|c| c == context) {
                todo.contexts.push(context.to_string());
            }
        } else if let Some(priority) = word.strip_prefix("pri:") {
            todo.priority = priority.to_string();
        } else if let Some(due) = word.strip_prefix("due:") {
            todo.due = timestamp::parse_user_date(due)
                .with_context(|| format!("Invalid due date {due:?} (use YYYY-MM-DD)"))?;
        } else {
            subject.push(word);
        }
    }

    todo.subject = subject.join(" ");
    if todo.subject.is_empty() {
        anyhow::bail!("A todo needs a subject");
    }
    Ok(todo)
}

/// Run the add command. Returns the new todo's display id.
pub async fn run(ws: &Workspace, words: &[String]) -> Result<u32> {
    let todo = parse_words(words)?;
    let mut list = ws.load_list().await?;

    let mut record = TaskRecord::with_subject(todo.subject);
    record.priority = todo.priority;
    record.due = todo.due;
    let index = list.add(record, &timestamp::now());
    for project in &todo.projects {
        list.add_project(index, project);
    }
    for context in &todo.contexts {
        list.add_context(index, context);
    }

    let id = list.get(index).map(|t| t.id).unwrap_or_default();
    ws.save_list(&list).await?;
    tracing::debug!(id, "added todo");

    println!("Todo {id} added.");
    Ok(id)
}

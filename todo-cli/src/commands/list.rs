//! List pending todos.

use anyhow::{Context, Result};
use todo_types::TaskStatus;

use super::Workspace;

/// Run the list command.
pub async fn run(ws: &Workspace) -> Result<()> {
    let report = ws.config.report().context("Invalid [report] configuration")?;
    let list = ws.load_list().await?;
    let pending: Vec<_> = list
        .tasks()
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .cloned()
        .collect();

    if pending.is_empty() {
        println!("No todos.");
    } else {
        print!("{}", report.render(&pending));
    }
    Ok(())
}

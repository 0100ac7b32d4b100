//! Initialize a replica's data files.

use anyhow::{Context, Result};
use todo_client::Store;

use super::Workspace;

/// Run the init command.
pub async fn run(ws: &Workspace) -> Result<()> {
    let store = ws.store();
    let created = store
        .initialize()
        .await
        .context("Failed to create todo files")?;

    if !created {
        println!("Todo list already initialized in {}.", ws.data_dir.display());
        return Ok(());
    }

    println!("Todo list initialized!");
    println!();
    println!("  Data dir:  {}", ws.data_dir.display());
    println!("  Pending:   {}", store.paths().pending.display());
    println!("  Archive:   {}", store.paths().archived.display());
    println!();
    println!("Next steps:");
    println!("  1. Add a todo: todo add Buy milk +home");
    println!("  2. To sync, set [sync] filepath in todo.toml and run: todo sync");

    Ok(())
}

//! Status edits by display id: done, archive, delete.

use anyhow::Result;
use todo_types::timestamp;

use super::Workspace;

/// Which edit to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Mark done.
    Complete,
    /// Move to the archive.
    Archive,
    /// Delete (recorded in the change log, dropped from the files).
    Delete,
}

impl Edit {
    fn past_tense(self) -> &'static str {
        match self {
            Edit::Complete => "completed",
            Edit::Archive => "archived",
            Edit::Delete => "deleted",
        }
    }
}

/// Apply `edit` to the todos named by `ids`.
///
/// Unknown ids are reported on stderr; it is an error only if none matched.
pub async fn run(ws: &Workspace, edit: Edit, ids: &[u32]) -> Result<()> {
    let mut list = ws.load_list().await?;
    let now = timestamp::now();

    let missing = match edit {
        Edit::Complete => list.complete(ids, &now),
        Edit::Archive => list.archive(ids, &now),
        Edit::Delete => list.delete(ids, &now),
    };
    for id in &missing {
        eprintln!("No todo with id {id}.");
    }
    if missing.len() == ids.len() {
        anyhow::bail!("Nothing {}", edit.past_tense());
    }

    ws.save_list(&list).await?;
    for id in ids.iter().filter(|id| !missing.contains(id)) {
        println!("Todo {id} {}.", edit.past_tense());
    }
    Ok(())
}

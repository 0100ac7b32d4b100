//! Sync with the shared change log.

use anyhow::{Context, Result};
use todo_client::{Envelope, KdfKind, SyncSummary, TodoSync};
use todo_types::TaskRecord;

use super::Workspace;
use crate::config::PassphraseSource;
use crate::report::Report;

/// Run the sync command.
pub async fn run(ws: &Workspace, verbose: bool) -> Result<SyncSummary> {
    let sync_config = &ws.config.sync;
    let remote = sync_config.remote_path(&ws.data_dir);
    if remote.is_none() {
        anyhow::bail!("No sync file configured. Set [sync] filepath in todo.toml.");
    }

    let passphrase = match sync_config.passphrase_source() {
        PassphraseSource::None => None,
        PassphraseSource::Prompt => Some(prompt_passphrase("Sync passphrase: ")?),
        PassphraseSource::Literal => Some(sync_config.passphrase.clone()),
    };

    let mut sync = TodoSync::new(ws.store(), remote);
    if let Some(passphrase) = passphrase {
        let kdf = KdfKind::from(sync_config.kdf).build();
        let envelope = Envelope::from_passphrase(&passphrase, kdf.as_ref())
            .context("Failed to derive sync key")?;
        sync = sync.with_envelope(envelope);
    }

    let summary = sync.sync().await.context("Sync failed")?;

    println!("Sync completed.");
    println!("  Uploaded: {}", summary.uploaded);
    println!("  Added:    {}", summary.added.len());
    println!("  Modified: {}", summary.modified.len());
    println!("  Deleted:  {}", summary.deleted.len());

    if verbose {
        let report = ws.config.report().context("Invalid [report] configuration")?;
        print_section(&report, "Added", &summary.added);
        print_section(&report, "Modified", &summary.modified);
        print_section(&report, "Deleted", &summary.deleted);
    }

    Ok(summary)
}

fn print_section(report: &Report, title: &str, tasks: &[TaskRecord]) {
    if tasks.is_empty() {
        return;
    }
    println!();
    println!("{title}:");
    print!("{}", report.render(tasks));
}

fn prompt_passphrase(prompt: &str) -> Result<String> {
    let passphrase = rpassword::prompt_password(prompt).context("Failed to read passphrase")?;
    if passphrase.is_empty() {
        anyhow::bail!("Passphrase must not be empty");
    }
    Ok(passphrase)
}

//! Sealed shared logs: confidentiality, wrong passphrases and mixed setups.

#[cfg(test)]
mod tests {
    use crate::assertions::{assert_checkpoint_per_replica, assert_converged};
    use crate::harness::{at, envelope, states, HarnessError, Replica, SharedLog};
    use todo_client::{CryptoError, SyncError};

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    /// Replicas sharing a passphrase exchange todos; the folder only sees ciphertext.
    #[tokio::test]
    async fn sealed_log_round_trip() {
        let shared = SharedLog::encrypted("correct horse battery staple").unwrap();
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        a.add("quarterly numbers", at(1, 9)).await.unwrap();
        a.sync(&shared, at(1, 10)).await.unwrap();

        let raw = shared.raw().await.unwrap();
        assert!(!raw.is_empty());
        assert!(!contains(&raw, "quarterly numbers"));
        assert!(!contains(&raw, "Checkpoint"));

        let summary = b.sync(&shared, at(1, 11)).await.unwrap();
        assert_eq!(summary.added.len(), 1);

        assert_converged(&states(&[&a, &b]).await.unwrap()).expect_pass();
        assert_checkpoint_per_replica(&shared.records().await.unwrap(), 2).expect_pass();
    }

    /// An empty file in the shared folder counts as an empty sealed log.
    #[tokio::test]
    async fn empty_sealed_file_is_an_empty_log() {
        let shared = SharedLog::encrypted("pw").unwrap();
        tokio::fs::write(shared.path(), b"").await.unwrap();
        let a = Replica::new("a").await.unwrap();
        a.add("first", at(1, 9)).await.unwrap();

        let summary = a.sync(&shared, at(1, 10)).await.unwrap();
        assert_eq!(summary.uploaded, 1);
        assert!(summary.added.is_empty());
        assert_eq!(shared.records().await.unwrap().len(), 2);
    }

    /// A wrong passphrase fails before anything is written, on either side.
    #[tokio::test]
    async fn wrong_passphrase_changes_nothing() {
        let shared = SharedLog::encrypted("right").unwrap();
        let a = Replica::new("a").await.unwrap();
        let c = Replica::new("c").await.unwrap();

        a.add("private", at(1, 9)).await.unwrap();
        a.sync(&shared, at(1, 10)).await.unwrap();
        let sealed = shared.raw().await.unwrap();

        c.add("pending upload", at(1, 11)).await.unwrap();
        let result = c
            .sync_with(&shared, Some(envelope("wrong").unwrap()), at(1, 12))
            .await;
        assert!(matches!(
            result,
            Err(HarnessError::Sync(SyncError::Crypto(
                CryptoError::DecryptionFailed
            )))
        ));

        assert_eq!(shared.raw().await.unwrap(), sealed);
        assert_eq!(c.backlog().await.unwrap().len(), 1);
        assert_eq!(c.tasks().await.unwrap().len(), 1);

        // Retrying with the right passphrase uploads the queued change.
        let summary = c.sync(&shared, at(1, 13)).await.unwrap();
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.added.len(), 1);
    }

    /// A replica without a passphrase cannot read a sealed log and must not clobber it.
    #[tokio::test]
    async fn plaintext_replica_rejects_sealed_log() {
        let shared = SharedLog::encrypted("pw").unwrap();
        let a = Replica::new("a").await.unwrap();
        let p = Replica::new("plain").await.unwrap();

        a.add("sealed", at(1, 9)).await.unwrap();
        a.sync(&shared, at(1, 10)).await.unwrap();
        let sealed = shared.raw().await.unwrap();

        p.add("mine", at(1, 11)).await.unwrap();
        let result = p.sync_with(&shared, None, at(1, 12)).await;
        assert!(matches!(result, Err(HarnessError::Sync(SyncError::Log(_)))));

        assert_eq!(shared.raw().await.unwrap(), sealed);
        assert_eq!(p.backlog().await.unwrap().len(), 1);
    }
}

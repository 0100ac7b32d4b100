//! Convergence scenarios: idempotence, last-writer-wins and deletion.

#[cfg(test)]
mod tests {
    use crate::assertions::{
        assert_checkpoint_per_replica, assert_consolidated, assert_converged, assert_ids_dense,
    };
    use crate::harness::{at, states, Replica, SharedLog};
    use todo_client::SyncSummary;

    fn subjects(records: &[todo_types::TaskRecord]) -> Vec<&str> {
        let mut out: Vec<_> = records.iter().map(|r| r.subject.as_str()).collect();
        out.sort_unstable();
        out
    }

    /// Syncing twice with nothing new in between changes nothing.
    #[tokio::test]
    async fn repeated_sync_is_a_no_op() {
        let shared = SharedLog::new().unwrap();
        let a = Replica::new("a").await.unwrap();
        a.add("water plants", at(1, 9)).await.unwrap();

        let first = a.sync(&shared, at(1, 10)).await.unwrap();
        assert_eq!(first.uploaded, 1);
        let before = a.tasks().await.unwrap();

        let second = a.sync(&shared, at(1, 11)).await.unwrap();
        assert_eq!(second, SyncSummary::default());
        assert_eq!(a.tasks().await.unwrap(), before);

        let remote = shared.records().await.unwrap();
        assert_checkpoint_per_replica(&remote, 1).expect_pass();
        assert_consolidated(&remote).expect_pass();
    }

    /// Two replicas adding independently end up with identical lists and ids.
    #[tokio::test]
    async fn two_replicas_converge() {
        let shared = SharedLog::new().unwrap();
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        a.add("a1", at(1, 9)).await.unwrap();
        a.add("a2", at(1, 9)).await.unwrap();
        b.add("b1", at(1, 10)).await.unwrap();
        b.add("b2", at(1, 11)).await.unwrap();

        a.sync(&shared, at(2, 9)).await.unwrap();
        let b_first = b.sync(&shared, at(2, 10)).await.unwrap();
        assert_eq!(b_first.uploaded, 2);
        assert_eq!(subjects(&b_first.added), vec!["a1", "a2"]);

        let a_second = a.sync(&shared, at(3, 9)).await.unwrap();
        assert_eq!(subjects(&a_second.added), vec!["b1", "b2"]);

        let all = states(&[&a, &b]).await.unwrap();
        assert_converged(&all).expect_pass();
        for state in &all {
            assert_eq!(state.tasks.len(), 4);
            assert_ids_dense(state).expect_pass();
        }

        let remote = shared.records().await.unwrap();
        assert_checkpoint_per_replica(&remote, 2).expect_pass();
        assert_consolidated(&remote).expect_pass();
    }

    /// Conflicting edits: the later modification wins on both sides, even
    /// when the earlier one reaches the shared log first.
    #[tokio::test]
    async fn later_edit_wins() {
        let shared = SharedLog::new().unwrap();
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        let draft = a.add("draft", at(1, 9)).await.unwrap();
        a.sync(&shared, at(1, 10)).await.unwrap();
        b.sync(&shared, at(1, 11)).await.unwrap();

        a.edit(draft, at(2, 9), |t| t.subject = "from a".into())
            .await
            .unwrap();
        b.edit(draft, at(3, 9), |t| t.subject = "from b".into())
            .await
            .unwrap();

        a.sync(&shared, at(4, 9)).await.unwrap();
        // The older remote edit is matched but does not replace b's version.
        let b_sync = b.sync(&shared, at(5, 9)).await.unwrap();
        assert_eq!(subjects(&b_sync.modified), vec!["from b"]);

        let a_sync = a.sync(&shared, at(6, 9)).await.unwrap();
        assert_eq!(subjects(&a_sync.modified), vec!["from b"]);

        let all = states(&[&a, &b]).await.unwrap();
        assert_converged(&all).expect_pass();
        assert_eq!(all[0].subjects(), vec!["from b"]);
    }

    /// Edits to different todos on different replicas both survive.
    #[tokio::test]
    async fn disjoint_edits_merge() {
        let shared = SharedLog::new().unwrap();
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        let x = a.add("x", at(1, 9)).await.unwrap();
        let y = a.add("y", at(1, 9)).await.unwrap();
        a.sync(&shared, at(1, 10)).await.unwrap();
        b.sync(&shared, at(1, 11)).await.unwrap();

        a.edit(x, at(2, 9), |t| t.complete("2024-03-02T09:00:00Z"))
            .await
            .unwrap();
        b.edit(y, at(2, 10), |t| t.projects.push("garden".into()))
            .await
            .unwrap();

        a.sync(&shared, at(3, 9)).await.unwrap();
        b.sync(&shared, at(3, 10)).await.unwrap();
        a.sync(&shared, at(3, 11)).await.unwrap();

        let all = states(&[&a, &b]).await.unwrap();
        assert_converged(&all).expect_pass();
        let tasks = &all[0].tasks;
        assert!(tasks.iter().any(|t| t.uuid == x && t.completed));
        assert!(tasks.iter().any(|t| t.uuid == y && t.has_project("garden")));
    }

    /// A deletion on one replica removes the todo on the other, and later
    /// rounds do not bring it back.
    #[tokio::test]
    async fn deletion_propagates() {
        let shared = SharedLog::new().unwrap();
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        let x = a.add("x", at(1, 9)).await.unwrap();
        a.add("y", at(1, 9)).await.unwrap();
        a.sync(&shared, at(1, 10)).await.unwrap();
        b.sync(&shared, at(1, 11)).await.unwrap();

        b.delete(x, at(2, 9)).await.unwrap();
        let b_sync = b.sync(&shared, at(2, 10)).await.unwrap();
        assert_eq!(b_sync.uploaded, 1);

        let a_sync = a.sync(&shared, at(3, 9)).await.unwrap();
        assert_eq!(subjects(&a_sync.deleted), vec!["x"]);

        let b_again = b.sync(&shared, at(4, 9)).await.unwrap();
        assert!(b_again.added.is_empty());

        let all = states(&[&a, &b]).await.unwrap();
        assert_converged(&all).expect_pass();
        assert_eq!(all[0].subjects(), vec!["y"]);
        assert_eq!(all[0].tasks[0].id, 1);
    }
}

//! Checkpoint scenarios: where a replica's delta starts on the shared log,
//! and how the log is kept compact.

#[cfg(test)]
mod tests {
    use crate::assertions::{assert_checkpoint_per_replica, assert_consolidated, assert_converged};
    use crate::harness::{at, states, Replica, SharedLog};
    use todo_types::{timestamp, TaskRecord};

    fn subjects(records: &[TaskRecord]) -> Vec<&str> {
        records.iter().map(|r| r.subject.as_str()).collect()
    }

    /// With a shared log `[a, cp, b, c]`, the replica owning `cp` only merges `b` and `c`.
    #[tokio::test]
    async fn delta_starts_after_own_checkpoint() {
        let shared = SharedLog::new().unwrap();
        let r = Replica::new("r").await.unwrap();
        let s = Replica::new("s").await.unwrap();

        r.add("a", at(1, 9)).await.unwrap();
        r.sync(&shared, at(1, 10)).await.unwrap();
        let own = r.backlog().await.unwrap();
        assert_eq!(own.len(), 1);
        assert!(own[0].is_checkpoint());

        s.add("b", at(1, 11)).await.unwrap();
        s.add("c", at(1, 12)).await.unwrap();
        s.sync(&shared, at(1, 13)).await.unwrap();

        let remote = shared.records().await.unwrap();
        assert_eq!(remote[0].subject, "a");
        assert_eq!(remote[1].uuid, own[0].uuid);
        assert_eq!(subjects(&remote[2..4]), vec!["b", "c"]);

        let summary = r.sync(&shared, at(1, 14)).await.unwrap();
        assert_eq!(subjects(&summary.added), vec!["b", "c"]);
        assert!(summary.modified.is_empty());
    }

    /// If the shared log lost the replica's checkpoint, the whole log is
    /// merged again. Records already held with the same timestamp stay put.
    #[tokio::test]
    async fn missing_checkpoint_remerges_everything() {
        let shared = SharedLog::new().unwrap();
        let r = Replica::new("r").await.unwrap();

        r.add("a", at(1, 9)).await.unwrap();
        r.sync(&shared, at(1, 10)).await.unwrap();
        let held = r.tasks().await.unwrap();

        let mut newcomer = TaskRecord::with_subject("s");
        newcomer.created_date = timestamp::format(at(1, 11));
        newcomer.modified_date = newcomer.created_date.clone();
        shared
            .overwrite(&[held[0].clone(), newcomer])
            .await
            .unwrap();

        let summary = r.sync(&shared, at(2, 9)).await.unwrap();
        assert_eq!(subjects(&summary.added), vec!["s"]);
        assert_eq!(subjects(&summary.modified), vec!["a"]);
        assert_eq!(summary.uploaded, 0);

        let tasks = r.tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        let a = tasks.iter().find(|t| t.uuid == held[0].uuid).unwrap();
        assert_eq!(a.modified_date, held[0].modified_date);

        assert_checkpoint_per_replica(&shared.records().await.unwrap(), 1).expect_pass();
    }

    /// Many rounds leave one checkpoint per replica and one entry per todo.
    #[tokio::test]
    async fn shared_log_stays_compact() {
        let shared = SharedLog::new().unwrap();
        let a = Replica::new("a").await.unwrap();
        let b = Replica::new("b").await.unwrap();

        let shared_todo = a.add("recurring", at(1, 8)).await.unwrap();
        for round in 1..=5 {
            a.add(&format!("a{round}"), at(round, 9)).await.unwrap();
            a.edit(shared_todo, at(round, 9), |t| t.notes.push(format!("round {round}")))
                .await
                .unwrap();
            a.sync(&shared, at(round, 10)).await.unwrap();

            b.add(&format!("b{round}"), at(round, 11)).await.unwrap();
            b.sync(&shared, at(round, 12)).await.unwrap();

            let remote = shared.records().await.unwrap();
            assert_checkpoint_per_replica(&remote, 2).expect_pass();
            assert_consolidated(&remote).expect_pass();
        }
        a.sync(&shared, at(6, 9)).await.unwrap();

        let remote = shared.records().await.unwrap();
        assert_eq!(remote.iter().filter(|r| !r.is_checkpoint()).count(), 11);

        for replica in [&a, &b] {
            let backlog = replica.backlog().await.unwrap();
            assert_eq!(backlog.len(), 1, "{} backlog", replica.name());
            assert!(remote.iter().any(|r| r.uuid == backlog[0].uuid));
        }

        let all = states(&[&a, &b]).await.unwrap();
        assert_converged(&all).expect_pass();
        let recurring = all[1].tasks.iter().find(|t| t.uuid == shared_todo).unwrap();
        assert_eq!(recurring.notes.len(), 5);
    }
}

use crate::vacuum::config::TaskDefinition;
use crate::vacuum::result_error::result::Result;
use crate::vacuum::result_error::WithDebugObjectAndFnName;
use crate::vacuum::sweeper::{sweep, TaskOutcome};
use crate::vacuum::validate::validate_task;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Runs vacuums one after the other, all against the same instant.
#[derive(Clone, Debug)]
pub struct TaskRunner<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> TaskRunner<Tz>
where
    Tz::Offset: Display,
{
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    /// Runs every vacuum in order and returns one outcome per vacuum.
    ///
    /// Invalid vacuums are skipped and task-level failures are recorded in
    /// their outcome. Only a fatal error stops the remaining vacuums.
    pub fn run_all(&self, tasks: &[TaskDefinition]) -> Result<Vec<TaskOutcome>> {
        tasks
            .iter()
            .map(|task| match validate_task(task) {
                Ok(()) => {
                    sweep(task, &self.now).with_debug_object_and_fn_name(task.clone(), "sweep")
                }
                Err(e) => Ok(TaskOutcome::Invalid(e)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vacuum::result_error::error::Error;
    use chrono::Utc;
    use std::path::Path;
    use tempfile::TempDir;

    fn runner() -> TaskRunner<Utc> {
        TaskRunner::new(Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap())
    }

    fn task(src: &TempDir, out: &Path, name: &str) -> TaskDefinition {
        TaskDefinition::builder()
            .path(format!("{}/", src.path().display()))
            .files_suffix("*.log")
            .remove_logs(true)
            .compressor("tar.gz")
            .output_path(format!("{}/", out.display()))
            .output_name(name)
            .build()
    }

    #[test]
    fn test_run_all_skips_invalid_and_continues() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(src.path().join("app.log"), "line").unwrap();

        let tasks = vec![
            TaskDefinition::builder().path("/var/log/").build(),
            TaskDefinition::builder()
                .path(format!("{}/", src.path().display()))
                .compressor("zip")
                .output_path(format!("{}/", out.path().display()))
                .output_name("logs.zip")
                .build(),
            TaskDefinition::builder()
                .path("/nonexistent/")
                .compressor("tar.gz")
                .output_path(format!("{}/", out.path().display()))
                .output_name("never.tar.gz")
                .build(),
            task(&src, out.path(), "logs-%Y.tar.gz"),
        ];

        let outcomes = runner().run_all(&tasks).unwrap();
        assert_eq!(outcomes.len(), 4);
        assert!(matches!(outcomes[0], TaskOutcome::Invalid(Error::InvalidTask(_))));
        assert!(matches!(outcomes[1], TaskOutcome::Refused(Error::UnsupportedFormat(_))));
        assert!(matches!(outcomes[2], TaskOutcome::NothingToDo { reason: Some(_) }));
        assert!(matches!(outcomes[3], TaskOutcome::Archived(_)));

        assert!(out.path().join("logs-2024.tar.gz").is_file());
        assert!(!out.path().join("logs.zip").exists());
        assert!(!src.path().join("app.log").exists());
    }

    #[test]
    fn test_run_all_second_task_sees_output_conflict() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(src.path().join("app.log"), "line").unwrap();
        let other_src = TempDir::new().unwrap();
        std::fs::write(other_src.path().join("other.log"), "line").unwrap();

        let tasks = vec![
            task(&src, out.path(), "logs-%Y.tar.gz"),
            task(&other_src, out.path(), "logs-%Y.tar.gz"),
        ];
        let outcomes = runner().run_all(&tasks).unwrap();

        assert!(matches!(outcomes[0], TaskOutcome::Archived(_)));
        assert!(matches!(outcomes[1], TaskOutcome::Refused(Error::OutputConflict(_))));
        assert!(other_src.path().join("other.log").exists());
    }

    #[test]
    fn test_run_all_stops_on_fatal_error() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(src.path().join("app.log"), "line").unwrap();

        let tasks = vec![
            task(&src, &out.path().join("absent"), "logs.tar.gz"),
            task(&src, out.path(), "logs.tar.gz"),
        ];
        let err = runner().run_all(&tasks).unwrap_err();

        assert!(err.is_fatal());
        assert!(!out.path().join("logs.tar.gz").exists());
        assert!(src.path().join("app.log").exists());
    }

    #[test]
    fn test_run_all_empty() {
        assert!(runner().run_all(&[]).unwrap().is_empty());
    }
}

//! Runs one vacuum: match, resolve the output, archive, then clean up.

use crate::vacuum::archive::{ArchiveFormat, Archiver, EntryOutcome};
use crate::vacuum::config::TaskDefinition;
use crate::vacuum::matcher::find_matches;
use crate::vacuum::output::{open_output, output_file_path};
use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::{convert_error_vec, Result};
use crate::vacuum::result_error::WithMsg;
use chrono::{DateTime, TimeZone};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What a single vacuum did during one run.
#[derive(Debug)]
pub enum TaskOutcome {
    /// A mandatory field is missing; the vacuum was not run.
    Invalid(Error),
    /// Source missing or unreadable, bad pattern, or no file matched.
    NothingToDo { reason: Option<Error> },
    /// Unsupported format, invalid output name or an output that may not be
    /// written. Nothing was written or deleted.
    Refused(Error),
    /// The archive could not be completed; no source was deleted.
    Failed(Error),
    Archived(ArchiveReport),
}

#[derive(Debug)]
pub struct ArchiveReport {
    pub output: PathBuf,
    pub entries: Vec<EntryOutcome>,
    /// Sources deleted after being archived
    pub removed: Vec<PathBuf>,
    pub removal_error: Option<Error>,
}

impl ArchiveReport {
    pub fn archived_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_archived()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.archived_count()
    }
}

impl Display for TaskOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskOutcome::Invalid(e) => write!(f, "skipped: {e}"),
            TaskOutcome::NothingToDo { reason: None } => write!(f, "nothing to do"),
            TaskOutcome::NothingToDo { reason: Some(e) } => write!(f, "nothing to do: {e}"),
            TaskOutcome::Refused(e) => write!(f, "refused: {e}"),
            TaskOutcome::Failed(e) => write!(f, "failed: {e}"),
            TaskOutcome::Archived(report) => write!(
                f,
                "archived {} file(s) into {:?}, {} failed, {} removed",
                report.archived_count(),
                report.output,
                report.failed_count(),
                report.removed.len()
            ),
        }
    }
}

/// Runs a validated vacuum to completion.
///
/// Every task-level problem ends up in the returned [`TaskOutcome`]; `Err` is
/// reserved for fatal errors (see [`Error::is_fatal`]).
pub fn sweep<Tz: TimeZone>(task: &TaskDefinition, now: &DateTime<Tz>) -> Result<TaskOutcome>
where
    Tz::Offset: Display,
{
    info!("Running vacuum at {:?}", task.path());

    let paths = match find_matches(
        task.path(),
        task.files_prefix().as_deref(),
        task.files_suffix().as_deref(),
    ) {
        Ok(paths) if paths.is_empty() => {
            info!("No files found for vacuum at {:?}", task.path());
            return Ok(TaskOutcome::NothingToDo { reason: None });
        }
        Ok(paths) => paths,
        Err(e) => {
            warn!("Cannot clean {:?}: {e}", task.path());
            return Ok(TaskOutcome::NothingToDo { reason: Some(e) });
        }
    };
    info!("Found {} file(s) at {:?}", paths.len(), task.path());

    let format = match task.compressor().parse::<ArchiveFormat>() {
        Ok(format) => format,
        Err(e) => return Ok(refused(e)),
    };

    let output = match output_file_path(task.output_path(), task.output_name(), now) {
        Ok(output) => output,
        Err(e) => return Ok(refused(e)),
    };

    let paths = exclude_output(paths, &output);
    if paths.is_empty() {
        info!("Only the output file {:?} matched, nothing to do", output);
        return Ok(TaskOutcome::NothingToDo { reason: None });
    }

    let sink = match open_output(output, *task.update_output()) {
        Ok(sink) => sink,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => return Ok(refused(e)),
    };
    let output = sink.path().clone();

    let entries = match format.write_all(sink, &paths) {
        Ok(entries) => entries,
        Err(e) => {
            error!("{e}");
            return Ok(TaskOutcome::Failed(e));
        }
    };

    let (removed, removal_error) = if *task.remove_logs() {
        remove_archived(&entries)
    } else {
        (vec![], None)
    };

    Ok(TaskOutcome::Archived(ArchiveReport {
        output,
        entries,
        removed,
        removal_error,
    }))
}

/// Drops the output file from the match set so an archive written into the
/// scanned directory is never archived into itself nor deleted.
fn exclude_output(paths: Vec<PathBuf>, output: &Path) -> Vec<PathBuf> {
    let Ok(output) = output.canonicalize() else {
        return paths;
    };
    paths
        .into_iter()
        .filter(|path| {
            let is_output = path.canonicalize().is_ok_and(|p| p == output);
            if is_output {
                debug!("Skipping {:?}, it is the output file", path);
            }
            !is_output
        })
        .collect_vec()
}

fn refused(e: Error) -> TaskOutcome {
    warn!("No archive written: {e}");
    TaskOutcome::Refused(e)
}

/// Deletes the sources whose entry made it into the archive. A failed
/// deletion is logged and collected, never stops the others.
fn remove_archived(entries: &[EntryOutcome]) -> (Vec<PathBuf>, Option<Error>) {
    let (removed, errors): (Vec<_>, Vec<_>) = entries
        .iter()
        .filter(|entry| entry.is_archived())
        .map(|entry| remove_source(&entry.path))
        .partition_result();

    (removed, convert_error_vec(errors).err())
}

fn remove_source(path: &Path) -> Result<PathBuf> {
    info!("Removing file {:?}", path);
    std::fs::remove_file(path)
        .map(|_| path.to_path_buf())
        .map_err(Error::from)
        .with_msg(format!("Remove archived file {path:?} failed"))
        .inspect_err(|e| warn!("{e}"))
}

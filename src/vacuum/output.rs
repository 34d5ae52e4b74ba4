//! Resolves where a vacuum writes its archive and opens the file.

use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::Result;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use getset::Getters;
use itertools::Itertools;
use std::fmt::{Display, Write};
use std::fs::File;
use std::path::PathBuf;

/// Output file of one vacuum run, exclusively owned by the archiver until it
/// is finished.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct ArchiveSink {
    path: PathBuf,
    file: File,
}

impl ArchiveSink {
    pub fn into_file(self) -> File {
        self.file
    }
}

/// Computes the archive path: `now` formatted with the strftime-style
/// `name_template`, prefixed with `output_dir` as-is.
pub fn output_file_path<Tz: TimeZone>(
    output_dir: &str,
    name_template: &str,
    now: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: Display,
{
    let items = StrftimeItems::new(name_template).collect_vec();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidConfiguration(format!(
            "{name_template:?} is not a valid time layout"
        )));
    }
    if !has_time_placeholder(&items) {
        tracing::warn!(
            "Output name {:?} has no time placeholder, use strftime layouts such as %Y-%m-%d",
            name_template
        );
    }

    let mut name = String::new();
    write!(name, "{}", now.format_with_items(items.into_iter())).map_err(|_| {
        Error::InvalidConfiguration(format!("cannot format {name_template:?} with {now:?}"))
    })?;

    if name.is_empty() {
        return Err(Error::InvalidConfiguration(format!(
            "{name_template:?} produces an empty file name"
        )));
    }

    Ok(PathBuf::from(format!("{output_dir}{name}")))
}

fn has_time_placeholder(items: &[Item]) -> bool {
    items
        .iter()
        .any(|item| matches!(item, Item::Numeric(..) | Item::Fixed(_)))
}

/// Decides whether the vacuum may write its archive and, if so, creates or
/// truncates the output file.
///
/// Refusals ([`Error::InvalidConfiguration`], [`Error::OutputConflict`],
/// [`Error::OutputInaccessible`]) leave the filesystem untouched. A file that
/// cannot be created is [`Error::OutputCreate`].
pub fn resolve_output<Tz: TimeZone>(
    output_dir: &str,
    name_template: &str,
    allow_overwrite: bool,
    now: &DateTime<Tz>,
) -> Result<ArchiveSink>
where
    Tz::Offset: Display,
{
    let path = output_file_path(output_dir, name_template, now)?;
    open_output(path, allow_overwrite)
}

/// Applies the overwrite policy to an already computed output path, then
/// creates or truncates the file.
pub fn open_output(path: PathBuf, allow_overwrite: bool) -> Result<ArchiveSink> {
    match path.try_exists() {
        Ok(true) if !allow_overwrite => return Err(Error::OutputConflict(path)),
        Ok(true) => tracing::info!("Updating existing output file {:?}", path),
        Ok(false) => (),
        Err(source) => return Err(Error::OutputInaccessible { path, source }),
    }

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(source) => return Err(Error::OutputCreate { path, source }),
    };
    tracing::info!("Using output file {:?}", path);

    Ok(ArchiveSink { path, file })
}

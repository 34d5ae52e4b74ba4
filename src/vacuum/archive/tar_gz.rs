use crate::vacuum::archive::{Archiver, EntryOutcome};
use crate::vacuum::output::ArchiveSink;
use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::Result;
use crate::vacuum::result_error::WithMsg;
use flate2::write::GzEncoder;
use flate2::Compression;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, IntoInnerError, Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::HeaderMode;

/// Streams matched files into a gzip-compressed tar archive.
///
/// Each entry keeps the size, permission bits and modification time the file
/// had when it was opened. The entry name is the matched path made relative.
#[derive(Clone, Copy, Debug)]
pub struct TarGzArchiver;

impl Archiver for TarGzArchiver {
    fn write_all(&self, sink: ArchiveSink, paths: &[PathBuf]) -> Result<Vec<EntryOutcome>> {
        let output = sink.path().clone();
        tracing::debug!("Creating gzip encoder for {:?}", output);

        let gz = GzEncoder::new(BufWriter::new(sink.into_file()), Compression::default());
        let mut writer = tar::Builder::new(gz);

        let outcomes = paths
            .iter()
            .map(|path| {
                tracing::info!("Adding {:?} to {:?}", path, output);
                let result = append_file(&mut writer, path)
                    .with_msg(format!("Cannot add {path:?} to archive"));
                if let Err(e) = &result {
                    tracing::warn!("{e}");
                }
                EntryOutcome {
                    path: path.clone(),
                    result,
                }
            })
            .collect_vec();

        finish(writer).with_msg(format!("Finishing archive {output:?} failed"))?;

        tracing::info!(
            "Archived {} of {} file(s) into {:?}",
            outcomes.iter().filter(|o| o.is_archived()).count(),
            outcomes.len(),
            output
        );
        Ok(outcomes)
    }
}

/// Writes the tar trailer, then the gzip trailer, then flushes the file to disk.
fn finish(writer: tar::Builder<GzEncoder<BufWriter<File>>>) -> Result<()> {
    writer
        .into_inner()?
        .finish()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .sync_all()?;
    Ok(())
}

fn append_file<W: Write>(writer: &mut tar::Builder<W>, path: &Path) -> Result<u64> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    if !metadata.is_file() {
        return Err(Error::NotAFile(path.into()));
    }

    let mut header = tar::Header::new_gnu();
    header.set_metadata_in_mode(&metadata, HeaderMode::Complete);
    append_entry(writer, &mut header, path, file, metadata.len())
}

/// Writes one entry of exactly `size` bytes. The entry always lands in the
/// archive, but a source that did not hold exactly `size` bytes is an error
/// so it is never deleted.
fn append_entry<W: Write, R: Read>(
    writer: &mut tar::Builder<W>,
    header: &mut tar::Header,
    path: &Path,
    source: R,
    size: u64,
) -> Result<u64> {
    header.set_size(size);
    let mut content = ExactSizeReader::new(source, size);
    writer.append_data(header, entry_name(path), &mut content)?;

    if let Some(e) = content.failed.take() {
        return Err(Error::from(e).with_msg("Read failed mid-entry, entry was zero-padded"));
    }
    if content.short {
        return Err(Error::SourceChanged {
            path: path.into(),
            reason: "shrank, entry was zero-padded".into(),
        });
    }
    if content.has_more()? {
        return Err(Error::SourceChanged {
            path: path.into(),
            reason: format!("grew past {size} bytes, entry was cut"),
        });
    }
    Ok(size)
}

/// Tar entry names must be relative and free of `..`.
fn entry_name(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Yields exactly `remaining` bytes: the source content, cut off if the file
/// grew since its header was written, zero-filled if it shrank or a read
/// failed. Keeps every entry consistent with its header.
struct ExactSizeReader<R> {
    inner: R,
    remaining: u64,
    short: bool,
    failed: Option<std::io::Error>,
}

impl<R: Read> ExactSizeReader<R> {
    fn new(inner: R, size: u64) -> Self {
        Self {
            inner,
            remaining: size,
            short: false,
            failed: None,
        }
    }

    /// Whether the source still has data past the announced size.
    fn has_more(&mut self) -> std::io::Result<bool> {
        if self.short || self.failed.is_some() {
            return Ok(false);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(n) => return Ok(n > 0),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for ExactSizeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(buf.len());
        let buf = &mut buf[..max];

        let read = if self.short || self.failed.is_some() {
            0
        } else {
            match self.inner.read(buf) {
                Ok(0) => {
                    self.short = true;
                    0
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => return Err(e),
                Err(e) => {
                    self.failed = Some(e);
                    0
                }
            }
        };

        let read = if read == 0 {
            buf.fill(0);
            max
        } else {
            read
        };
        self.remaining -= read as u64;
        Ok(read)
    }
}

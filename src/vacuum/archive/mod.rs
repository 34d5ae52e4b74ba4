pub mod tar_gz;

use crate::vacuum::archive::tar_gz::TarGzArchiver;
use crate::vacuum::output::ArchiveSink;
use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::Result;
use crate::vacuum::result_error::WithDebugObjectAndFnName;
use derive_more::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Archive layouts a vacuum can produce, selected by the `compressor` field.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Tar container inside a gzip stream
    #[display("tar.gz")]
    TarGz,
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tar.gz" => Ok(ArchiveFormat::TarGz),
            other => Err(Error::UnsupportedFormat(other.into())),
        }
    }
}

/// Result of adding one matched path to the archive.
#[derive(Debug)]
pub struct EntryOutcome {
    /// Path as returned by the matcher
    pub path: PathBuf,
    /// Content bytes written, or the reason the file was left out
    pub result: Result<u64>,
}

impl EntryOutcome {
    pub fn is_archived(&self) -> bool {
        self.result.is_ok()
    }
}

/// Writes a whole archive into a sink.
///
/// Implementations consume the sink and finish every writer layer before
/// returning. A failing path is reported in its [`EntryOutcome`] and never
/// stops the remaining ones; `Err` means the archive itself could not be
/// completed.
pub trait Archiver {
    fn write_all(&self, sink: ArchiveSink, paths: &[PathBuf]) -> Result<Vec<EntryOutcome>>;
}

impl Archiver for ArchiveFormat {
    fn write_all(&self, sink: ArchiveSink, paths: &[PathBuf]) -> Result<Vec<EntryOutcome>> {
        match self {
            ArchiveFormat::TarGz => TarGzArchiver.write_all(sink, paths),
        }
        .with_debug_object_and_fn_name(*self, "write_all")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_format_from_str() {
        assert_eq!("tar.gz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
    }

    #[test]
    fn test_archive_format_unsupported() {
        for name in ["zip", "tar.xz", "TAR.GZ", "tar"] {
            let err = name.parse::<ArchiveFormat>().unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat(ref f) if f == name));
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_archive_format_display() {
        assert_eq!(ArchiveFormat::TarGz.to_string(), "tar.gz");
    }

    #[test]
    fn test_entry_outcome_is_archived() {
        let ok = EntryOutcome { path: "a.log".into(), result: Ok(3) };
        let failed = EntryOutcome {
            path: "b.log".into(),
            result: Err(Error::NotAFile("b.log".into())),
        };
        assert!(ok.is_archived());
        assert!(!failed.is_archived());
    }
}

use crate::vacuum::result_error::{WithDebugObjectAndFnName, WithMsg};
use itertools::Itertools;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error("invalid vacuum: {0}")]
    InvalidTask(#[from] validator::ValidationErrors),
    #[error("cannot obtain vacuums configuration from {path:?}: {reason}")]
    ConfigurationMissing { path: PathBuf, reason: String },
    #[error("{path:?} doesn't exist or isn't readable")]
    NotFound { path: PathBuf },
    #[error("invalid files pattern {pattern:?}: {reason}")]
    BadPattern { pattern: String, reason: String },
    #[error("invalid output name: {0}")]
    InvalidConfiguration(String),
    #[error("output file found at {0:?} but it isn't allowed to be updated")]
    OutputConflict(PathBuf),
    #[error("cannot tell whether output file {path:?} exists: {source}")]
    OutputInaccessible {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create output file {path:?}: {source}")]
    OutputCreate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported compressor {0:?}, only \"tar.gz\" is available")]
    UnsupportedFormat(String),
    #[error("{0:?} is not a regular file")]
    NotAFile(PathBuf),
    #[error("{path:?} changed while being archived ({reason}), source is kept")]
    SourceChanged { path: PathBuf, reason: String },
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{:?} {} failed:\n{}", obj_debug, fn_name, indent::indent_all_with("  ", error.to_string()))]
    WithDebugObjAndFnName {
        error: Box<Error>,
        obj_debug: Box<dyn Debug + Send>,
        fn_name: String,
    },
    #[error("{}", itertools::join(.0, "\n\n"))]
    LotsOfError(Vec<Error>),
}

impl<S: Into<String>, O: Debug + Send + 'static> WithDebugObjectAndFnName<S, O> for Error {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        Error::WithDebugObjAndFnName {
            error: Box::new(self),
            obj_debug: Box::new(obj),
            fn_name: fn_name.into(),
        }
    }
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl From<Vec<Error>> for Error {
    fn from(errors: Vec<Error>) -> Self {
        if errors.is_empty() {
            panic!("Should not create lots of errors when error is empty")
        }
        Self::LotsOfError(errors.into_iter().flat_map(Error::into_iter).collect_vec())
    }
}

impl Error {
    pub fn into_iter(self) -> Box<dyn Iterator<Item = Error>> {
        match self {
            Error::LotsOfError(v) => Box::new(v.into_iter().flat_map(Error::into_iter)),
            e => Box::new(std::iter::once(e)),
        }
    }

    /// Strips context wrappers and returns the error that was originally raised.
    pub fn root(&self) -> &Error {
        match self {
            Error::WithMsg { error, .. } | Error::WithDebugObjAndFnName { error, .. } => {
                error.root()
            }
            e => e,
        }
    }

    /// Errors that stop the whole run instead of a single task or file.
    pub fn is_fatal(&self) -> bool {
        match self.root() {
            Error::ConfigurationMissing { .. } | Error::OutputCreate { .. } => true,
            Error::LotsOfError(v) => v.iter().any(Error::is_fatal),
            _ => false,
        }
    }
}

//! # logs-vacuum
//!
//! A run-once housekeeping tool that sweeps log directories into
//! gzip-compressed tar archives.
//!
//! ## Features
//!
//! - **Pattern Matching**: Per-vacuum directory plus filename prefix/suffix globs
//! - **Dated Archives**: Output names formatted with strftime-style layouts
//! - **Update Policy**: Existing archives are only replaced when allowed
//! - **Contained Failures**: A bad file or a bad vacuum never stops the others
//! - **Cleanup**: Archived sources are optionally removed once the archive is closed
//!
//! ## Output Names
//!
//! `outputName` is a strftime layout (`logs.%Y-%m-%d.tar.gz`) appended as-is
//! to `outputPath`, so the directory normally ends with `/`. Reference-date
//! layouts such as `logs.2006-01-02.tar.gz` are kept as literal text; a name
//! without any placeholder is logged as a warning.
//!
//! ## Quick Start
//!
//! ```no_run
//! use logs_vacuum::vacuum::config::Config;
//! use logs_vacuum::vacuum::runner::TaskRunner;
//!
//! let config = Config::load("./config/vacuums.json")?;
//! let outcomes = TaskRunner::new(chrono::Local::now()).run_all(&config.vacuums)?;
//! for outcome in outcomes {
//!     println!("{outcome}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod vacuum;

//! Vacuum task definitions and the configuration file that lists them.

use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::Result;
use crate::vacuum::result_error::WithMsg;
use bon::Builder;
use getset::Getters;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Location used when no `--config` is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "./config/vacuums.json";

/// Ordered list of vacuums to run in one invocation.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default, alias = "Vacuums")]
    pub vacuums: Vec<TaskDefinition>,
}

/// One sweep-and-archive unit: where to look, what to pick up and where the
/// archive goes.
///
/// Mandatory fields are plain strings and may be empty after deserialization;
/// eligibility is decided by [`validator::Validate`], see
/// [`crate::vacuum::validate`].
#[serde_as]
#[derive(Clone, Default, Serialize, Deserialize, Debug, Builder, PartialEq, Eq, Getters)]
#[serde(rename_all = "camelCase")]
#[getset(get = "pub")]
pub struct TaskDefinition {
    /// Directory to scan, concatenated as-is with the prefix/suffix pattern.
    #[serde(default)]
    #[builder(default, into)]
    path: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[builder(into)]
    files_prefix: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, alias = "filesSufix")]
    #[builder(into)]
    files_suffix: Option<String>,
    /// Delete each source once it is safely inside the archive.
    #[serde(default)]
    #[builder(default)]
    remove_logs: bool,
    /// Archive format identifier, see [`crate::vacuum::archive::ArchiveFormat`].
    #[serde(default)]
    #[builder(default, into)]
    compressor: String,
    #[serde(default)]
    #[builder(default, into)]
    output_path: String,
    /// strftime-style layout for the archive file name, e.g. `logs.%Y-%m.tar.gz`.
    #[serde(default)]
    #[builder(default, into)]
    output_name: String,
    /// Allow truncating an archive left by a previous run at the same path.
    #[serde(default)]
    #[builder(default)]
    update_output: bool,
}

impl Config {
    /// Reads the vacuums file. YAML is picked by `.yml`/`.yaml` extension,
    /// anything else is parsed as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::ConfigurationMissing {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Config = match path.extension().and_then(OsStr::to_str) {
            Some("yml") | Some("yaml") => serde_yml::from_reader(file).map_err(Error::from),
            _ => serde_json::from_reader(BufReader::new(file)).map_err(Error::from),
        }
        .with_msg(format!("Parse vacuums config failed: {path:?}"))?;

        tracing::info!(
            "Found vacuums file {:?} with {} vacuum(s)",
            path,
            config.vacuums.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_task_definition_deserialization() {
        let json = r#"{
            "path": "/var/log/app/",
            "filesPrefix": "server*",
            "filesSuffix": "",
            "removeLogs": true,
            "compressor": "tar.gz",
            "outputPath": "/var/backups/",
            "outputName": "logs.%Y-%m.tar.gz",
            "updateOutput": true
        }"#;
        let task: TaskDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(task.path(), "/var/log/app/");
        assert_eq!(task.files_prefix().as_deref(), Some("server*"));
        assert_eq!(task.files_suffix(), &None);
        assert!(*task.remove_logs());
        assert_eq!(task.compressor(), "tar.gz");
        assert_eq!(task.output_path(), "/var/backups/");
        assert_eq!(task.output_name(), "logs.%Y-%m.tar.gz");
        assert!(*task.update_output());
    }

    #[test]
    fn test_task_definition_defaults_and_legacy_suffix() {
        let json = r#"{"path": "/tmp/", "filesSufix": "*.log"}"#;
        let task: TaskDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(task.files_suffix().as_deref(), Some("*.log"));
        assert_eq!(task.files_prefix(), &None);
        assert!(!*task.remove_logs());
        assert!(!*task.update_output());
        assert!(task.output_name().is_empty());
    }

    #[test]
    fn test_task_definition_builder() {
        let task = TaskDefinition::builder()
            .path("/tmp/")
            .files_prefix("access-")
            .compressor("tar.gz")
            .output_path("/backup/")
            .output_name("out.tar.gz")
            .build();

        assert_eq!(task.files_prefix().as_deref(), Some("access-"));
        assert_eq!(task.files_suffix(), &None);
        assert!(!*task.remove_logs());
    }

    #[test]
    fn test_config_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vacuums.json");
        std::fs::write(
            &path,
            r#"{"Vacuums": [{"path": "/a/", "compressor": "tar.gz"}, {"path": "/b/"}]}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.vacuums.len(), 2);
        assert_eq!(config.vacuums[0].path(), "/a/");
        assert_eq!(config.vacuums[1].path(), "/b/");
    }

    #[test]
    fn test_config_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vacuums.yml");
        std::fs::write(
            &path,
            "vacuums:\n  - path: /var/log/\n    filesSuffix: \"*.log\"\n    compressor: tar.gz\n    outputPath: /tmp/\n    outputName: logs.tar.gz\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.vacuums.len(), 1);
        assert_eq!(config.vacuums[0].files_suffix().as_deref(), Some("*.log"));
        assert_eq!(config.vacuums[0].output_name(), "logs.tar.gz");
    }

    #[test]
    fn test_config_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_config_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vacuums.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err.root(), Error::SerdeJson(_)));
    }
}

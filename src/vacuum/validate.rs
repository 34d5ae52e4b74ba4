//! Eligibility checks for vacuum task definitions.
//!
//! Mandatory fields are checked in a fixed order and only the first missing
//! one is reported, so a config with several holes is fixed one message at a
//! time.

use crate::vacuum::config::TaskDefinition;
use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::Result;
use tracing::error;
use validator::{Validate, ValidationError, ValidationErrors};

impl TaskDefinition {
    fn mandatory_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("path", self.path().as_str()),
            ("outputName", self.output_name().as_str()),
            ("outputPath", self.output_path().as_str()),
            ("compressor", self.compressor().as_str()),
        ]
    }
}

impl Validate for TaskDefinition {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let Some((field, _)) = self
            .mandatory_fields()
            .into_iter()
            .find(|(_, value)| value.is_empty())
        else {
            return Ok(());
        };

        let mut errors = ValidationErrors::new();
        errors.add(
            field,
            ValidationError::new("required").with_message(
                format!("You must supply {field} in your vacuum configuration").into(),
            ),
        );
        Err(errors)
    }
}

/// Checks a vacuum before it runs, logging the first missing mandatory field.
pub fn validate_task(task: &TaskDefinition) -> Result<()> {
    task.validate().map_err(Error::from).inspect_err(|e| {
        error!("Skipping vacuum {:?}: {e}", task.path());
    })
}

/// `false` for a vacuum that must not run, see [`validate_task`].
pub fn is_valid(task: &TaskDefinition) -> bool {
    validate_task(task).is_ok()
}

//! tplc_options: `tplc.json` parsing and compiler options.
//!
//! Every key is optional. Missing keys take their defaults, so an empty
//! object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "tplc.json";

/// How annotation conflicts are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeErrors {
    /// Stop compiling the file.
    #[default]
    Error,
    /// Report a warning diagnostic and keep going.
    Warning,
}

/// Compiler options, matching the `tplc.json` schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Any advisory diagnostic fails the file.
    pub strict: bool,
    pub type_errors: TypeErrors,
    /// The header field every file must carry as a string.
    pub discriminator: String,
    /// Reject bodies without a `---` header.
    pub require_header: bool,
    /// Inputs used when none are given on the command line.
    pub files: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            type_errors: TypeErrors::Error,
            discriminator: "type".to_string(),
            require_header: false,
            files: Vec::new(),
        }
    }
}

impl CompilerOptions {
    pub fn fatal_type_errors(&self) -> bool {
        self.type_errors == TypeErrors::Error
    }
}

/// A configuration file that could not be loaded.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a `tplc.json` document.
pub fn parse_config(content: &str) -> Result<CompilerOptions, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read and parse a `tplc.json` file.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<CompilerOptions, OptionsError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: display.clone(),
        source,
    })?;
    parse_config(&content).map_err(|source| OptionsError::Json {
        path: display,
        source,
    })
}

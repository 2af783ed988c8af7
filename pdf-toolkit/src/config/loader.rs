//! Configuration loading from files and environment variables.

use std::path::Path;

use config::{Config, Environment, File, FileFormat, FileSourceFile};

use super::ToolkitConfig;
use crate::error::{ToolkitError, ToolkitResult};

/// Load configuration from `pdf-toolkit.*` in the working directory (if any)
/// and `PDF_TOOLKIT__*` environment variables.
pub fn load_config() -> ToolkitResult<ToolkitConfig> {
    build(File::with_name("pdf-toolkit").required(false))
}

/// Load configuration from an explicit file, still honouring environment overrides.
pub fn load_config_from(path: &Path) -> ToolkitResult<ToolkitConfig> {
    build(File::from(path).required(true))
}

fn build(file: File<FileSourceFile, FileFormat>) -> ToolkitResult<ToolkitConfig> {
    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("PDF_TOOLKIT")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("cache.key_strategies"),
        )
        .build()
        .map_err(|e| ToolkitError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ToolkitError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })
}

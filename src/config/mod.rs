#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::core::OutputFormat;
use crate::utils::error::{EtlError, Result};
use std::path::Path;

pub const DEFAULT_ARTICLES: &str = "esp2025_articles.ndjson";
pub const DEFAULT_AUTHORS: &str = "esp2025_authors.ndjson";
pub const DEFAULT_AUTHORSHIPS: &str = "esp2025_authorships.ndjson";
pub const DEFAULT_ARCHIVE: &str = "erdos_output.zip";
pub const DATASET_EXTENSIONS: [&str; 2] = ["ndjson", "jsonl"];

/// Joins `file` onto `dir` unless `file` is already absolute.
pub(crate) fn resolve(dir: Option<&str>, file: &str) -> String {
    match dir {
        Some(dir) if !Path::new(file).is_absolute() => {
            Path::new(dir).join(file).to_string_lossy().into_owned()
        }
        _ => file.to_string(),
    }
}

pub(crate) fn parse_formats(field: &str, values: &[String]) -> Result<Vec<OutputFormat>> {
    values
        .iter()
        .map(|value| {
            OutputFormat::parse(value).ok_or_else(|| EtlError::InvalidConfigValueError {
                field: field.to_string(),
                value: value.clone(),
                reason: "Unsupported format. Valid formats: csv, ndjson, json".to_string(),
            })
        })
        .collect()
}

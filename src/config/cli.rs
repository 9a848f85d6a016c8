use super::{
    parse_formats, resolve, DATASET_EXTENSIONS, DEFAULT_ARCHIVE, DEFAULT_ARTICLES,
    DEFAULT_AUTHORS, DEFAULT_AUTHORSHIPS,
};
use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

fn parse_erdos_query(value: &str) -> std::result::Result<(u32, u32), String> {
    let (from, to) = value
        .split_once(',')
        .ok_or_else(|| format!("expected FROM,TO but got '{}'", value))?;
    let from = from.trim().parse().map_err(|e| format!("invalid author id '{}': {}", from, e))?;
    let to = to.trim().parse().map_err(|e| format!("invalid author id '{}': {}", to, e))?;
    Ok((from, to))
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "erdos-etl")]
#[command(about = "Validate the bibliographic dataset and compute co-authorship distances")]
pub struct CliConfig {
    /// Directory the dataset file names are relative to
    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = DEFAULT_ARTICLES)]
    pub articles: String,

    #[arg(long, default_value = DEFAULT_AUTHORS)]
    pub authors: String,

    #[arg(long, default_value = DEFAULT_AUTHORSHIPS)]
    pub authorships: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,ndjson,json")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle all outputs into a single zip archive")]
    pub zip: bool,

    #[arg(long, help = "Log integrity violations instead of failing")]
    pub lenient: bool,

    /// Author ids to compute the Erdős number for, e.g. `--erdos 4,990`
    #[arg(long, value_parser = parse_erdos_query)]
    pub erdos: Option<(u32, u32)>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// Joins the dataset file names onto `--data-dir`, consuming it.
    pub fn resolve_paths(mut self) -> Self {
        if let Some(dir) = self.data_dir.take() {
            self.articles = resolve(Some(&dir), &self.articles);
            self.authors = resolve(Some(&dir), &self.authors);
            self.authorships = resolve(Some(&dir), &self.authorships);
        }
        self
    }
}

impl ConfigProvider for CliConfig {
    fn articles_path(&self) -> &str {
        &self.articles
    }

    fn authors_path(&self) -> &str {
        &self.authors
    }

    fn authorships_path(&self) -> &str {
        &self.authorships
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        parse_formats("formats", &self.formats)
    }

    fn archive_name(&self) -> Option<&str> {
        self.zip.then_some(DEFAULT_ARCHIVE)
    }

    fn strict(&self) -> bool {
        !self.lenient
    }

    fn erdos_query(&self) -> Option<(u32, u32)> {
        self.erdos
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("articles", self.articles_path())?;
        validation::validate_path("authors", self.authors_path())?;
        validation::validate_path("authorships", self.authorships_path())?;
        validation::validate_file_extensions(
            "dataset",
            &[self.articles_path(), self.authors_path(), self.authorships_path()],
            &DATASET_EXTENSIONS,
        )?;
        validation::validate_path("output_path", &self.output_path)?;
        if parse_formats("formats", &self.formats)?.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "formats".to_string(),
            });
        }
        Ok(())
    }
}

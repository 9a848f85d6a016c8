use super::{
    parse_formats, resolve, DATASET_EXTENSIONS, DEFAULT_ARCHIVE, DEFAULT_ARTICLES,
    DEFAULT_AUTHORS, DEFAULT_AUTHORSHIPS,
};
use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    pub query: Option<QueryConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
    #[serde(skip)]
    resolved: Option<[String; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory the file names below are relative to
    pub dir: Option<String>,
    #[serde(default = "default_articles")]
    pub articles: String,
    #[serde(default = "default_authors")]
    pub authors: String,
    #[serde(default = "default_authorships")]
    pub authorships: String,
}

fn default_articles() -> String {
    DEFAULT_ARTICLES.to_string()
}

fn default_authors() -> String {
    DEFAULT_AUTHORS.to_string()
}

fn default_authorships() -> String {
    DEFAULT_AUTHORSHIPS.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// Emit JSON log lines instead of the compact format
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        let dir = config.dataset.dir.as_deref();
        config.resolved = Some([
            resolve(dir, &config.dataset.articles),
            resolve(dir, &config.dataset.authors),
            resolve(dir, &config.dataset.authorships),
        ]);
        Ok(config)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    fn resolved_path(&self, index: usize) -> &str {
        match &self.resolved {
            Some(paths) => &paths[index],
            None => match index {
                0 => &self.dataset.articles,
                1 => &self.dataset.authors,
                _ => &self.dataset.authorships,
            },
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn articles_path(&self) -> &str {
        self.resolved_path(0)
    }

    fn authors_path(&self) -> &str {
        self.resolved_path(1)
    }

    fn authorships_path(&self) -> &str {
        self.resolved_path(2)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        parse_formats("load.output_formats", &self.load.output_formats)
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE))
    }

    fn strict(&self) -> bool {
        self.validation.strict
    }

    fn erdos_query(&self) -> Option<(u32, u32)> {
        self.query.as_ref().map(|q| (q.from, q.to))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("dataset.articles", self.articles_path())?;
        validation::validate_path("dataset.authors", self.authors_path())?;
        validation::validate_path("dataset.authorships", self.authorships_path())?;
        validation::validate_file_extensions(
            "dataset",
            &[self.articles_path(), self.authors_path(), self.authorships_path()],
            &DATASET_EXTENSIONS,
        )?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if parse_formats("load.output_formats", &self.load.output_formats)?.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            if let Some(filename) = &compression.filename {
                validation::validate_non_empty_string("load.compression.filename", filename)?;
                validation::validate_file_extensions(
                    "load.compression.filename",
                    &[filename.as_str()],
                    &["zip"],
                )?;
            }
        }

        Ok(())
    }
}

use crate::domain::model::RawDataset;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Ndjson,
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Csv, OutputFormat::Ndjson, OutputFormat::Json];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "ndjson" | "jsonl" => Some(OutputFormat::Ndjson),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn articles_path(&self) -> &str;
    fn authors_path(&self) -> &str;
    fn authorships_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Fails on a format name that is not recognised.
    fn output_formats(&self) -> Result<Vec<OutputFormat>>;
    /// Archive name when outputs are bundled into a zip, `None` for loose files.
    fn archive_name(&self) -> Option<&str>;
    /// Abort on integrity violations instead of logging them.
    fn strict(&self) -> bool;
    fn erdos_query(&self) -> Option<(u32, u32)>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Whatever `transform` hands over to `load`.
    type Output: Send;

    async fn extract(&self) -> Result<RawDataset>;
    async fn transform(&self, data: RawDataset) -> Result<Self::Output>;
    async fn load(&self, result: Self::Output) -> Result<String>;
}

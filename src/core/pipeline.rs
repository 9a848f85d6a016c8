use crate::adapters::{csv_export, ndjson};
use crate::core::coauthorship::CoauthorshipMatrix;
use crate::core::dataset::Dataset;
use crate::core::{ConfigProvider, OutputFormat, Pipeline, RawDataset, Storage};
use crate::domain::model::{ErdosResult, FatArticle};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{check_integrity, IntegrityReport};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Everything `transform` derives from the raw tables.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub dataset: RawDataset,
    pub fat_articles: Vec<FatArticle>,
    pub coauthorship: CoauthorshipMatrix,
    pub report: IntegrityReport,
    pub erdos: Option<ErdosResult>,
}

pub struct DatasetPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DatasetPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_table<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        tracing::debug!("Reading {}", path);
        let bytes = self.storage.read_file(path).await?;
        ndjson::parse(&bytes).map_err(|e| {
            tracing::error!("Failed to parse {}: {}", path, e);
            e
        })
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }

    fn run_query(&self, dataset: &Dataset, matrix: &CoauthorshipMatrix) -> Result<Option<ErdosResult>> {
        let Some((from, to)) = self.config.erdos_query() else {
            return Ok(None);
        };

        for id in [from, to] {
            if dataset.author(id).is_none() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "erdos_query".to_string(),
                    value: id.to_string(),
                    reason: "No author with this id in the dataset".to_string(),
                });
            }
        }

        let erdos_number = match matrix.erdos_number(from, to) {
            Ok(n) => Some(n),
            Err(EtlError::NoPathError { .. }) => None,
            Err(e) => return Err(e),
        };
        let weighted_distance = match matrix.weighted_distance(from, to) {
            Ok(d) => Some(d),
            Err(EtlError::NoPathError { .. }) => None,
            Err(e) => return Err(e),
        };

        match erdos_number {
            Some(n) => tracing::info!("Erdős number between authors {} and {}: {}", from, to, n),
            None => tracing::warn!("Authors {} and {} are not connected", from, to),
        }

        Ok(Some(ErdosResult {
            from,
            to,
            erdos_number,
            weighted_distance,
        }))
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    articles: usize,
    authors: usize,
    authorships: usize,
    matrix_dimension: usize,
    coauthorship_entries: usize,
    integrity: &'a IntegrityReport,
    erdos: Option<&'a ErdosResult>,
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DatasetPipeline<S, C> {
    type Output = TransformResult;

    async fn extract(&self) -> Result<RawDataset> {
        let articles = self.read_table(self.config.articles_path()).await?;
        let authors = self.read_table(self.config.authors_path()).await?;
        let authorships = self.read_table(self.config.authorships_path()).await?;

        Ok(RawDataset {
            articles,
            authors,
            authorships,
        })
    }

    async fn transform(&self, data: RawDataset) -> Result<TransformResult> {
        let report = check_integrity(&data);

        if !report.is_clean() {
            if self.config.strict() {
                report.clone().into_result()?;
            }
            for violation in report.violations() {
                tracing::warn!("Integrity: {}", violation);
            }
            if !report.is_resolvable() {
                return Err(EtlError::ProcessingError {
                    message: "dataset has dangling references or unusable author ids; cannot resolve authorships"
                        .to_string(),
                });
            }
        }

        let dataset = Dataset::new(data)?;
        let fat_articles = dataset.fat_articles();
        let coauthorship =
            CoauthorshipMatrix::from_fat_articles(&fat_articles, dataset.matrix_dimension());
        tracing::info!(
            "Resolved {} articles; co-authorship matrix {}x{} with {} entries",
            fat_articles.len(),
            coauthorship.dimension(),
            coauthorship.dimension(),
            coauthorship.nnz()
        );
        let erdos = self.run_query(&dataset, &coauthorship)?;

        Ok(TransformResult {
            dataset: dataset.into_raw(),
            fat_articles,
            coauthorship,
            report,
            erdos,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let formats = self.config.output_formats()?;
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();

        if formats.contains(&OutputFormat::Csv) {
            files.push(("articles.csv", csv_export::articles_csv(&result.fat_articles)?.into_bytes()));
            files.push((
                "coauthorship.csv",
                csv_export::coauthorship_csv(&result.coauthorship)?.into_bytes(),
            ));
        }

        if formats.contains(&OutputFormat::Ndjson) {
            files.push(("fat_articles.ndjson", ndjson::to_bytes(&result.fat_articles)?));
            files.push(("articles.ndjson", ndjson::to_bytes(&result.dataset.articles)?));
            files.push(("authors.ndjson", ndjson::to_bytes(&result.dataset.authors)?));
            files.push(("authorships.ndjson", ndjson::to_bytes(&result.dataset.authorships)?));
        }

        if formats.contains(&OutputFormat::Json) {
            let report = RunReport {
                articles: result.dataset.articles.len(),
                authors: result.dataset.authors.len(),
                authorships: result.dataset.authorships.len(),
                matrix_dimension: result.coauthorship.dimension(),
                coauthorship_entries: result.coauthorship.nnz(),
                integrity: &result.report,
                erdos: result.erdos.as_ref(),
            };
            files.push(("report.json", serde_json::to_vec_pretty(&report)?));
        }

        match self.config.archive_name() {
            Some(archive) => {
                tracing::debug!("Creating ZIP file with {} files", files.len());

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    for (name, data) in &files {
                        zip.start_file::<_, ()>(*name, FileOptions::default())?;
                        zip.write_all(data)?;
                    }
                    zip.finish()?.into_inner()
                };

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                let output_path = self.output_file(archive);
                self.storage.write_file(&output_path, &zip_data).await?;
                Ok(output_path)
            }
            None => {
                for (name, data) in &files {
                    tracing::debug!("Writing {} ({} bytes)", name, data.len());
                    self.storage.write_file(&self.output_file(name), data).await?;
                }
                Ok(self.config.output_path().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            self.files.lock().await.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        strict: bool,
        archive: Option<String>,
        formats: Vec<OutputFormat>,
        query: Option<(u32, u32)>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                strict: true,
                archive: None,
                formats: OutputFormat::ALL.to_vec(),
                query: Some((0, 2)),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn articles_path(&self) -> &str {
            "articles.ndjson"
        }

        fn authors_path(&self) -> &str {
            "authors.ndjson"
        }

        fn authorships_path(&self) -> &str {
            "authorships.ndjson"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> Result<Vec<OutputFormat>> {
            Ok(self.formats.clone())
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }

        fn strict(&self) -> bool {
            self.strict
        }

        fn erdos_query(&self) -> Option<(u32, u32)> {
            self.query
        }
    }

    const ARTICLES: &str = r#"{"doi": "10.1/a", "title": "First", "publication_date": "2020-01-01"}
{"doi": "10.1/b", "title": "Second", "publication_date": 20200202}
"#;
    const AUTHORS: &str = r#"{"id": 0, "orcid": "o0", "last_name": "Zero", "given_names": "Ann"}
{"id": 1, "orcid": "o1", "last_name": "One", "given_names": "Bob"}
{"id": 2, "orcid": "o2", "last_name": "Two", "given_names": "Cy"}
"#;
    const AUTHORSHIPS: &str = r#"{"author_orcid": "o0", "article_doi": "10.1/a"}
{"author_orcid": "o1", "article_doi": "10.1/a"}
{"author_orcid": "o1", "article_doi": "10.1/b"}
{"author_orcid": "o2", "article_doi": "10.1/b"}
"#;

    async fn seeded_storage(authorships: &str) -> MockStorage {
        let storage = MockStorage::new();
        storage.put("articles.ndjson", ARTICLES).await;
        storage.put("authors.ndjson", AUTHORS).await;
        storage.put("authorships.ndjson", authorships).await;
        storage
    }

    #[tokio::test]
    async fn test_extract_reads_all_tables() {
        let storage = seeded_storage(AUTHORSHIPS).await;
        let pipeline = DatasetPipeline::new(storage, MockConfig::new());

        let raw = pipeline.extract().await.unwrap();
        assert_eq!(raw.articles.len(), 2);
        assert_eq!(raw.authors.len(), 3);
        assert_eq!(raw.authorships.len(), 4);
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let storage = MockStorage::new();
        let pipeline = DatasetPipeline::new(storage, MockConfig::new());
        assert!(matches!(pipeline.extract().await, Err(EtlError::IoError(_))));
    }

    #[tokio::test]
    async fn test_transform_builds_matrix_and_answers_query() {
        let storage = seeded_storage(AUTHORSHIPS).await;
        let pipeline = DatasetPipeline::new(storage, MockConfig::new());

        let raw = pipeline.extract().await.unwrap();
        let result = pipeline.transform(raw).await.unwrap();

        assert!(result.report.is_clean());
        assert_eq!(result.fat_articles[0].author_ids(), vec![0, 1]);
        assert_eq!(result.coauthorship.get(0, 1), 1);
        assert_eq!(result.coauthorship.get(0, 2), 0);
        let erdos = result.erdos.unwrap();
        assert_eq!(erdos.erdos_number, Some(2));
        assert_eq!(erdos.weighted_distance, Some(2));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_duplicates() {
        let dirty = format!("{}{}", AUTHORSHIPS, "{\"author_orcid\": \"o0\", \"article_doi\": \"10.1/a\"}\n");
        let storage = seeded_storage(&dirty).await;
        let pipeline = DatasetPipeline::new(storage, MockConfig::new());

        let raw = pipeline.extract().await.unwrap();
        let err = pipeline.transform(raw).await.unwrap_err();
        assert!(matches!(err, EtlError::IntegrityError { count: 1, .. }));
    }

    #[tokio::test]
    async fn test_lenient_mode_keeps_going() {
        let dirty = format!("{}{}", AUTHORSHIPS, "{\"author_orcid\": \"o0\", \"article_doi\": \"10.1/a\"}\n");
        let storage = seeded_storage(&dirty).await;
        let mut config = MockConfig::new();
        config.strict = false;
        let pipeline = DatasetPipeline::new(storage, config);

        let raw = pipeline.extract().await.unwrap();
        let result = pipeline.transform(raw).await.unwrap();
        assert_eq!(result.report.violations().len(), 1);
        // the duplicate pair is counted once
        assert_eq!(result.coauthorship.get(0, 1), 1);
    }

    #[tokio::test]
    async fn test_lenient_mode_still_needs_resolvable_references() {
        let dirty = format!("{}{}", AUTHORSHIPS, "{\"author_orcid\": \"nobody\", \"article_doi\": \"10.1/a\"}\n");
        let storage = seeded_storage(&dirty).await;
        let mut config = MockConfig::new();
        config.strict = false;
        let pipeline = DatasetPipeline::new(storage, config);

        let raw = pipeline.extract().await.unwrap();
        assert!(matches!(
            pipeline.transform(raw).await,
            Err(EtlError::ProcessingError { .. })
        ));
    }

    #[tokio::test]
    async fn test_lenient_mode_rejects_sparse_author_ids() {
        let authors = r#"{"id": 0, "orcid": "o0", "last_name": "Zero", "given_names": "Ann"}
{"id": 30000000, "orcid": "o1", "last_name": "Far", "given_names": "Bob"}
"#;
        let authorships = r#"{"author_orcid": "o0", "article_doi": "10.1/a"}
{"author_orcid": "o1", "article_doi": "10.1/b"}
"#;
        let storage = MockStorage::new();
        storage.put("articles.ndjson", ARTICLES).await;
        storage.put("authors.ndjson", authors).await;
        storage.put("authorships.ndjson", authorships).await;
        let mut config = MockConfig::new();
        config.strict = false;
        config.query = None;
        let pipeline = DatasetPipeline::new(storage, config);

        let raw = pipeline.extract().await.unwrap();
        assert!(matches!(
            pipeline.transform(raw).await,
            Err(EtlError::ProcessingError { .. })
        ));
    }

    #[tokio::test]
    async fn test_query_for_unknown_author_fails_with_config_error() {
        let storage = seeded_storage(AUTHORSHIPS).await;
        let mut config = MockConfig::new();
        config.query = Some((0, 99));
        let pipeline = DatasetPipeline::new(storage, config);

        let raw = pipeline.extract().await.unwrap();
        let err = pipeline.transform(raw).await.unwrap_err();
        assert!(matches!(
            &err,
            EtlError::InvalidConfigValueError { field, value, .. } if field == "erdos_query" && value == "99"
        ));
        assert!(err.severity() > crate::utils::error::ErrorSeverity::Low);
    }

    #[tokio::test]
    async fn test_unconnected_query_is_not_an_error() {
        let authors = format!("{}{}", AUTHORS, "{\"id\": 3, \"orcid\": \"o3\", \"last_name\": \"Three\", \"given_names\": \"Di\"}\n");
        let storage = MockStorage::new();
        storage.put("articles.ndjson", ARTICLES).await;
        storage.put("authors.ndjson", &authors).await;
        storage.put("authorships.ndjson", AUTHORSHIPS).await;
        let mut config = MockConfig::new();
        config.query = Some((0, 3));
        let pipeline = DatasetPipeline::new(storage, config);

        let raw = pipeline.extract().await.unwrap();
        let result = pipeline.transform(raw).await.unwrap();
        let erdos = result.erdos.unwrap();
        assert_eq!(erdos.erdos_number, None);
        assert_eq!(erdos.weighted_distance, None);
    }

    #[tokio::test]
    async fn test_load_writes_loose_files() {
        let storage = seeded_storage(AUTHORSHIPS).await;
        let pipeline = DatasetPipeline::new(storage.clone(), MockConfig::new());

        let raw = pipeline.extract().await.unwrap();
        let result = pipeline.transform(raw).await.unwrap();
        let output = pipeline.load(result).await.unwrap();
        assert_eq!(output, "test_output");

        let csv = String::from_utf8(storage.get_file("test_output/articles.csv").await.unwrap()).unwrap();
        assert!(csv.starts_with("doi,title,publication_date,author_ids"));
        assert!(csv.contains("10.1/b,Second,2020-02-02,1;2"));

        // round-trip copies match the inputs byte for byte once re-parsed
        let articles = storage.get_file("test_output/articles.ndjson").await.unwrap();
        let again: Vec<crate::domain::model::Article> = ndjson::parse(&articles).unwrap();
        let original: Vec<crate::domain::model::Article> = ndjson::parse(ARTICLES.as_bytes()).unwrap();
        assert_eq!(again, original);

        let report: serde_json::Value =
            serde_json::from_slice(&storage.get_file("test_output/report.json").await.unwrap()).unwrap();
        assert_eq!(report["articles"], 2);
        assert_eq!(report["erdos"]["erdos_number"], 2);
        assert_eq!(report["integrity"]["violations"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_load_zips_selected_formats() {
        let storage = seeded_storage(AUTHORSHIPS).await;
        let mut config = MockConfig::new();
        config.archive = Some("bundle.zip".to_string());
        config.formats = vec![OutputFormat::Csv];
        let pipeline = DatasetPipeline::new(storage.clone(), config);

        let raw = pipeline.extract().await.unwrap();
        let result = pipeline.transform(raw).await.unwrap();
        let output = pipeline.load(result).await.unwrap();
        assert_eq!(output, "test_output/bundle.zip");

        let zip_data = storage.get_file("test_output/bundle.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["articles.csv", "coauthorship.csv"]);
        assert!(storage.get_file("test_output/report.json").await.is_none());
    }
}

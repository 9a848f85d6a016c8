use erdos_etl::core::{ConfigProvider, OutputFormat};
use erdos_etl::{DatasetPipeline, EtlEngine, EtlError, LocalStorage, TomlConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn config_for(output_path: &str, extra: &str) -> TomlConfig {
    let data_dir = data_dir().to_string_lossy().replace('\\', "/");
    let output_path = output_path.replace('\\', "/");
    let content = format!(
        r#"
[dataset]
dir = "{}"

[query]
from = 7
to = 2

[load]
output_path = "{}"
output_formats = ["csv", "ndjson", "json"]
{}
"#,
        data_dir, output_path, extra
    );
    TomlConfig::from_toml_str(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_on_sample_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config_for(&output_path, "");
    let pipeline = DatasetPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    let result = engine.run().await.unwrap();
    assert_eq!(result, output_path.replace('\\', "/"));

    for name in [
        "articles.csv",
        "coauthorship.csv",
        "fat_articles.ndjson",
        "articles.ndjson",
        "authors.ndjson",
        "authorships.ndjson",
        "report.json",
    ] {
        assert!(temp_dir.path().join(name).exists(), "missing {}", name);
    }

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["articles"], 5);
    assert_eq!(report["authors"], 8);
    assert_eq!(report["authorships"], 10);
    assert_eq!(report["matrix_dimension"], 8);
    assert_eq!(report["erdos"]["erdos_number"], 3);
    assert_eq!(report["integrity"]["violations"].as_array().unwrap().len(), 0);

    let csv = std::fs::read_to_string(temp_dir.path().join("articles.csv")).unwrap();
    assert!(csv.contains("10.3390/plants1010001,Photosynthetic efficiency of C4 grasses under drought,2012-03-01,3;7"));
    assert!(csv.contains("\"A survey of \"\"alpine\"\" mosses\""));
}

#[tokio::test]
async fn test_end_to_end_with_zip_archive() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config_for(
        &output_path,
        "\n[load.compression]\nenabled = true\nfilename = \"bundle.zip\"\n",
    );
    assert_eq!(config.archive_name(), Some("bundle.zip"));
    let pipeline = DatasetPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, true);

    let result = engine.run().await.unwrap();
    assert!(result.ends_with("bundle.zip"));

    let zip_data = std::fs::read(temp_dir.path().join("bundle.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 7);

    let mut coauthorship = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("coauthorship.csv").unwrap(), &mut coauthorship)
        .unwrap();
    assert!(coauthorship.starts_with("author_id,coauthor_id,papers"));
    assert!(coauthorship.contains("\n3,7,1"));
    assert!(coauthorship.contains("\n7,3,1"));
}

#[tokio::test]
async fn test_end_to_end_with_missing_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let content = format!(
        r#"
[dataset]
dir = "{}"

[load]
output_path = "{}"
output_formats = ["json"]
"#,
        temp_dir.path().join("nowhere").to_string_lossy().replace('\\', "/"),
        temp_dir.path().to_string_lossy().replace('\\', "/"),
    );
    let config = TomlConfig::from_toml_str(&content).unwrap();
    assert_eq!(config.output_formats().unwrap(), vec![OutputFormat::Json]);

    let engine = EtlEngine::new(DatasetPipeline::new(LocalStorage::default(), config));
    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EtlError::IoError(_)));
}

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{storage::LocalStorage, toml_config::TomlConfig};
pub use core::{
    coauthorship::CoauthorshipMatrix, dataset::Dataset, etl::EtlEngine, pipeline::DatasetPipeline,
};
pub use domain::model::{Article, Author, Authorship, FatArticle, PublicationDate, RawDataset};
pub use utils::error::{EtlError, Result};

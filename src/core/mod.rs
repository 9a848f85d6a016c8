pub mod coauthorship;
pub mod dataset;
pub mod etl;
pub mod pipeline;

pub use crate::domain::model::RawDataset;
pub use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use pipeline::TransformResult;

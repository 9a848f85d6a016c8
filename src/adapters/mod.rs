// Adapters layer: concrete encodings for the dataset files and exported artifacts.

pub mod csv_export;
pub mod ndjson;

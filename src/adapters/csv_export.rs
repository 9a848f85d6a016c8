use crate::core::coauthorship::CoauthorshipMatrix;
use crate::domain::model::FatArticle;
use crate::utils::error::{EtlError, Result};

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// One row per article, author ids joined with `;`.
pub fn articles_csv(articles: &[FatArticle]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["doi", "title", "publication_date", "author_ids"])?;

    for article in articles {
        let ids = article
            .author_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let date = article.publication_date.to_string();
        writer.write_record([
            article.doi.as_str(),
            article.title.as_str(),
            date.as_str(),
            ids.as_str(),
        ])?;
    }

    finish(writer)
}

/// Non-zero matrix entries as `(author_id, coauthor_id, papers)` triplets.
pub fn coauthorship_csv(matrix: &CoauthorshipMatrix) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["author_id", "coauthor_id", "papers"])?;

    for (row, col, papers) in matrix.triplets() {
        writer.write_record([row.to_string(), col.to_string(), papers.to_string()])?;
    }

    finish(writer)
}

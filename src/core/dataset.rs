use crate::domain::model::{Article, Author, Authorship, FatArticle, RawDataset};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

/// Read-only view over the three tables with the many-to-many relation resolved.
///
/// Construction only fails when a lookup cannot be built: a duplicate author
/// id, or an authorship pointing at a missing article or author. The other
/// invariants are reported by [`crate::utils::validation::check_integrity`].
#[derive(Debug, Clone)]
pub struct Dataset {
    raw: RawDataset,
    article_by_doi: HashMap<String, usize>,
    author_by_id: HashMap<u32, usize>,
    /// doi -> author positions, in authorship-record order
    authors_by_doi: HashMap<String, Vec<usize>>,
    /// author id -> article positions
    articles_by_author: HashMap<u32, Vec<usize>>,
}

impl Dataset {
    pub fn new(raw: RawDataset) -> Result<Self> {
        let mut article_by_doi = HashMap::with_capacity(raw.articles.len());
        for (pos, article) in raw.articles.iter().enumerate() {
            // first occurrence wins for duplicated DOIs
            article_by_doi.entry(article.doi.clone()).or_insert(pos);
        }

        let mut author_by_id = HashMap::with_capacity(raw.authors.len());
        let mut author_by_orcid = HashMap::new();
        for (pos, author) in raw.authors.iter().enumerate() {
            if author_by_id.insert(author.id, pos).is_some() {
                return Err(EtlError::IntegrityError {
                    count: 1,
                    summary: format!("author id {} is used more than once", author.id),
                });
            }
            if let Some(orcid) = author.orcid() {
                author_by_orcid.entry(orcid.to_string()).or_insert(pos);
            }
        }

        let mut authors_by_doi: HashMap<String, Vec<usize>> = HashMap::new();
        let mut articles_by_author: HashMap<u32, Vec<usize>> = HashMap::new();
        for authorship in &raw.authorships {
            let article_pos = *article_by_doi.get(&authorship.article_doi).ok_or_else(|| {
                EtlError::IntegrityError {
                    count: 1,
                    summary: format!(
                        "authorship references unknown article '{}'",
                        authorship.article_doi
                    ),
                }
            })?;
            let author_pos = *author_by_orcid.get(&authorship.author_orcid).ok_or_else(|| {
                EtlError::IntegrityError {
                    count: 1,
                    summary: format!(
                        "authorship references unknown author '{}'",
                        authorship.author_orcid
                    ),
                }
            })?;

            let authors = authors_by_doi.entry(authorship.article_doi.clone()).or_default();
            if authors.contains(&author_pos) {
                continue;
            }
            authors.push(author_pos);
            articles_by_author
                .entry(raw.authors[author_pos].id)
                .or_default()
                .push(article_pos);
        }

        tracing::debug!(
            "Indexed {} articles, {} authors, {} linked articles",
            article_by_doi.len(),
            author_by_id.len(),
            authors_by_doi.len()
        );

        Ok(Self {
            raw,
            article_by_doi,
            author_by_id,
            authors_by_doi,
            articles_by_author,
        })
    }

    pub fn raw(&self) -> &RawDataset {
        &self.raw
    }

    pub fn into_raw(self) -> RawDataset {
        self.raw
    }

    pub fn articles(&self) -> &[Article] {
        &self.raw.articles
    }

    pub fn authors(&self) -> &[Author] {
        &self.raw.authors
    }

    pub fn authorships(&self) -> &[Authorship] {
        &self.raw.authorships
    }

    pub fn article(&self, doi: &str) -> Option<&Article> {
        self.article_by_doi.get(doi).map(|&pos| &self.raw.articles[pos])
    }

    pub fn author(&self, id: u32) -> Option<&Author> {
        self.author_by_id.get(&id).map(|&pos| &self.raw.authors[pos])
    }

    /// Dimension of a square matrix indexed directly by author id.
    pub fn matrix_dimension(&self) -> usize {
        self.raw
            .authors
            .iter()
            .map(|a| a.id as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Ids of the authors of `doi`.
    pub fn authors_of(&self, doi: &str) -> Result<Vec<u32>> {
        if !self.article_by_doi.contains_key(doi) {
            return Err(EtlError::not_found("Article", doi));
        }
        Ok(self
            .authors_by_doi
            .get(doi)
            .map(|positions| positions.iter().map(|&pos| self.raw.authors[pos].id).collect())
            .unwrap_or_default())
    }

    /// Articles written by the author with `author_id`; empty if they have none.
    pub fn articles_by(&self, author_id: u32) -> Result<Vec<&Article>> {
        if !self.author_by_id.contains_key(&author_id) {
            return Err(EtlError::not_found("Author", author_id));
        }
        Ok(self
            .articles_by_author
            .get(&author_id)
            .map(|positions| positions.iter().map(|&pos| &self.raw.articles[pos]).collect())
            .unwrap_or_default())
    }

    /// Every article with its authors attached, in input order.
    pub fn fat_articles(&self) -> Vec<FatArticle> {
        self.raw
            .articles
            .iter()
            .map(|article| {
                let authors = self
                    .authors_by_doi
                    .get(&article.doi)
                    .map(|positions| {
                        positions
                            .iter()
                            .map(|&pos| self.raw.authors[pos].clone())
                            .collect()
                    })
                    .unwrap_or_default();
                FatArticle {
                    doi: article.doi.clone(),
                    title: article.title.clone(),
                    publication_date: article.publication_date,
                    authors,
                }
            })
            .collect()
    }
}

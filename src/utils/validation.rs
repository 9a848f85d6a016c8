use crate::domain::model::RawDataset;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(field_name: &str, files: &[&str], allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(EtlError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.to_string(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// A single broken dataset invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    EmptyDoi { index: usize },
    DuplicateDoi { doi: String },
    DuplicateAuthorId { id: u32 },
    NonContiguousAuthorIds { first: u32, last: u32, count: usize },
    DuplicateOrcid { orcid: String },
    DuplicateAuthorship { doi: String, orcid: String },
    ArticleWithoutAuthors { doi: String },
    UnknownArticle { doi: String },
    UnknownAuthor { orcid: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyDoi { index } => write!(f, "article #{} has an empty doi", index),
            Violation::DuplicateDoi { doi } => write!(f, "doi '{}' is used by more than one article", doi),
            Violation::DuplicateAuthorId { id } => write!(f, "author id {} is used more than once", id),
            Violation::NonContiguousAuthorIds { first, last, count } => write!(
                f,
                "author ids {}..={} are not a contiguous range starting at 0 or 1 ({} distinct ids)",
                first, last, count
            ),
            Violation::DuplicateOrcid { orcid } => write!(f, "orcid '{}' is used by more than one author", orcid),
            Violation::DuplicateAuthorship { doi, orcid } => {
                write!(f, "authorship ({}, {}) appears more than once", doi, orcid)
            }
            Violation::ArticleWithoutAuthors { doi } => write!(f, "article '{}' has no authorship record", doi),
            Violation::UnknownArticle { doi } => write!(f, "authorship references unknown article '{}'", doi),
            Violation::UnknownAuthor { orcid } => write!(f, "authorship references unknown author '{}'", orcid),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegrityReport {
    pub articles: usize,
    pub authors: usize,
    pub authorships: usize,
    violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether the author and article lookups can still be built. Gapped ids
    /// count as unresolvable too: the matrix is sized by the largest id.
    pub fn is_resolvable(&self) -> bool {
        !self.violations.iter().any(|v| {
            matches!(
                v,
                Violation::UnknownArticle { .. }
                    | Violation::UnknownAuthor { .. }
                    | Violation::DuplicateAuthorId { .. }
                    | Violation::NonContiguousAuthorIds { .. }
            )
        })
    }

    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }

        const SHOWN: usize = 5;
        let mut summary = self
            .violations
            .iter()
            .take(SHOWN)
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        if self.violations.len() > SHOWN {
            summary.push_str(&format!("; and {} more", self.violations.len() - SHOWN));
        }

        Err(EtlError::IntegrityError {
            count: self.violations.len(),
            summary,
        })
    }
}

/// Checks every dataset invariant and collects all violations found.
pub fn check_integrity(dataset: &RawDataset) -> IntegrityReport {
    let mut violations = Vec::new();

    // articles
    let mut doi_counts: HashMap<&str, usize> = HashMap::new();
    for (index, article) in dataset.articles.iter().enumerate() {
        if article.doi.trim().is_empty() {
            violations.push(Violation::EmptyDoi { index });
            continue;
        }
        let count = doi_counts.entry(article.doi.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            violations.push(Violation::DuplicateDoi {
                doi: article.doi.clone(),
            });
        }
    }

    // authors
    let mut ids = BTreeSet::new();
    let mut reported_ids = HashSet::new();
    let mut orcid_counts: HashMap<&str, usize> = HashMap::new();
    for author in &dataset.authors {
        if !ids.insert(author.id) && reported_ids.insert(author.id) {
            violations.push(Violation::DuplicateAuthorId { id: author.id });
        }
        if let Some(orcid) = author.orcid() {
            let count = orcid_counts.entry(orcid).or_insert(0);
            *count += 1;
            if *count == 2 {
                violations.push(Violation::DuplicateOrcid {
                    orcid: orcid.to_string(),
                });
            }
        }
    }
    if let (Some(&first), Some(&last)) = (ids.first(), ids.last()) {
        let span = (last - first) as usize + 1;
        if first > 1 || span != ids.len() {
            violations.push(Violation::NonContiguousAuthorIds {
                first,
                last,
                count: ids.len(),
            });
        }
    }

    // authorships
    let mut pairs = HashSet::new();
    let mut reported_pairs = HashSet::new();
    let mut unknown_dois = HashSet::new();
    let mut unknown_orcids = HashSet::new();
    let mut covered: HashSet<&str> = HashSet::new();
    for authorship in &dataset.authorships {
        let pair = (authorship.article_doi.as_str(), authorship.author_orcid.as_str());
        if !pairs.insert(pair) && reported_pairs.insert(pair) {
            violations.push(Violation::DuplicateAuthorship {
                doi: authorship.article_doi.clone(),
                orcid: authorship.author_orcid.clone(),
            });
        }
        if doi_counts.contains_key(pair.0) {
            covered.insert(pair.0);
        } else if unknown_dois.insert(pair.0) {
            violations.push(Violation::UnknownArticle {
                doi: authorship.article_doi.clone(),
            });
        }
        if !orcid_counts.contains_key(pair.1) && unknown_orcids.insert(pair.1) {
            violations.push(Violation::UnknownAuthor {
                orcid: authorship.author_orcid.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for article in &dataset.articles {
        let doi = article.doi.as_str();
        if doi.trim().is_empty() || !seen.insert(doi) {
            continue;
        }
        if !covered.contains(doi) {
            violations.push(Violation::ArticleWithoutAuthors {
                doi: article.doi.clone(),
            });
        }
    }

    if violations.is_empty() {
        tracing::debug!("Dataset passed all integrity checks");
    } else {
        tracing::debug!("Dataset has {} integrity violation(s)", violations.len());
    }

    IntegrityReport {
        articles: dataset.articles.len(),
        authors: dataset.authors.len(),
        authorships: dataset.authorships.len(),
        violations,
    }
}

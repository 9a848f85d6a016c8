use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Date of first open-access publication.
///
/// The dataset stores it either as an ISO string (`"2012-03-01"`) or as a
/// compact integer (`20120301`). The form that was read is kept so that the
/// value serializes back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicationDate {
    date: NaiveDate,
    compact: bool,
}

impl PublicationDate {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            compact: false,
        }
    }

    pub fn from_compact(value: i64) -> Option<Self> {
        if value < 0 {
            return None;
        }
        let year = i32::try_from(value / 10_000).ok()?;
        let month = u32::try_from((value / 100) % 100).ok()?;
        let day = u32::try_from(value % 100).ok()?;
        NaiveDate::from_ymd_opt(year, month, day).map(|date| Self {
            date,
            compact: true,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    fn compact_value(&self) -> i64 {
        i64::from(self.date.year()) * 10_000
            + i64::from(self.date.month()) * 100
            + i64::from(self.date.day())
    }
}

impl fmt::Display for PublicationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

impl Serialize for PublicationDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.compact {
            serializer.serialize_i64(self.compact_value())
        } else {
            serializer.collect_str(self)
        }
    }
}

impl<'de> Deserialize<'de> for PublicationDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DateVisitor;

        impl de::Visitor<'_> for DateVisitor {
            type Value = PublicationDate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a \"YYYY-MM-DD\" string or a YYYYMMDD integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                let date = NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .map(PublicationDate::new)
                    .map_err(|e| E::custom(format!("invalid date '{}': {}", v, e)))?;
                // chrono accepts "2012-3-1"; only the zero-padded form writes back unchanged
                if date.to_string() != v {
                    return Err(E::custom(format!("invalid date '{}': expected YYYY-MM-DD", v)));
                }
                Ok(date)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                PublicationDate::from_compact(v)
                    .ok_or_else(|| E::custom(format!("invalid compact date {}", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                let v = i64::try_from(v).map_err(|_| E::custom("date out of range"))?;
                self.visit_i64(v)
            }
        }

        deserializer.deserialize_any(DateVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub doi: String,
    pub title: String,
    pub publication_date: PublicationDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Dense index, used directly as a co-authorship matrix row/column.
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(alias = "lastname")]
    pub last_name: String,
    pub given_names: String,
}

impl Author {
    /// ORCID, treating an empty string as absent.
    pub fn orcid(&self) -> Option<&str> {
        self.orcid.as_deref().filter(|o| !o.trim().is_empty())
    }

    pub fn given_name_tokens(&self) -> impl Iterator<Item = &str> {
        self.given_names.split_whitespace()
    }

    pub fn display_name(&self) -> String {
        if self.given_names.trim().is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", self.given_names.trim(), self.last_name)
        }
    }
}

/// Join record between one article and one author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authorship {
    pub author_orcid: String,
    pub article_doi: String,
}

/// An article with its authors resolved through the authorship table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FatArticle {
    pub doi: String,
    pub title: String,
    pub publication_date: PublicationDate,
    pub authors: Vec<Author>,
}

impl FatArticle {
    pub fn author_ids(&self) -> Vec<u32> {
        self.authors.iter().map(|a| a.id).collect()
    }
}

/// The three tables exactly as read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    pub articles: Vec<Article>,
    pub authors: Vec<Author>,
    pub authorships: Vec<Authorship>,
}

impl RawDataset {
    pub fn record_count(&self) -> usize {
        self.articles.len() + self.authors.len() + self.authorships.len()
    }
}

/// Answer to an Erdős-number query between two authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErdosResult {
    pub from: u32,
    pub to: u32,
    /// `None` when the authors are not connected.
    pub erdos_number: Option<u32>,
    pub weighted_distance: Option<u64>,
}

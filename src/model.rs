use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{FaqError, Result};

/// One topic in the knowledge base.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub keywords: Vec<String>,
    /// Rich text (HTML) handed to the presentation layer untouched.
    pub response: String,
    #[serde(default, alias = "followUpChips")]
    pub follow_ups: Vec<String>,
}

impl Entry {
    pub fn new<I, K>(id: &str, keywords: I, response: &str) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            id: id.to_string(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            response: response.to_string(),
            follow_ups: Vec::new(),
        }
    }

    pub fn with_follow_ups<I, K>(mut self, follow_ups: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.follow_ups = follow_ups.into_iter().map(Into::into).collect();
        self
    }

    /// The broad topic an entry belongs to: its id up to the first `_`.
    pub fn topic(&self) -> &str {
        self.id.split('_').next().unwrap_or(&self.id)
    }
}

/// Problems found while building a [`Catalogue`]. None of them stop resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueWarning {
    DuplicateId { id: String, position: usize },
    EmptyKeywords { id: String },
    BlankKeyword { id: String },
}

impl fmt::Display for CatalogueWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueWarning::DuplicateId { id, position } => write!(
                f,
                "entry #{} reuses id '{}'; it will never be matched",
                position, id
            ),
            CatalogueWarning::EmptyKeywords { id } => {
                write!(f, "entry '{}' has no keywords; it will never score", id)
            }
            CatalogueWarning::BlankKeyword { id } => {
                write!(f, "entry '{}' has a blank keyword; it was dropped", id)
            }
        }
    }
}

/// An immutable, ordered snapshot of the knowledge base.
///
/// Keywords are trimmed, lowercased and deduplicated on construction. Entries
/// with a repeated id (after the first) or without keywords stay in the
/// snapshot but never score.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: Vec<Entry>,
    scorable: Vec<bool>,
    warnings: Vec<CatalogueWarning>,
}

impl Catalogue {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut scorable = Vec::with_capacity(entries.len());
        let mut warnings = Vec::new();

        let entries: Vec<Entry> = entries
            .into_iter()
            .enumerate()
            .map(|(position, mut entry)| {
                let mut seen_keywords = HashSet::new();
                let mut keywords = Vec::with_capacity(entry.keywords.len());
                for keyword in &entry.keywords {
                    let keyword = keyword.trim().to_lowercase();
                    if keyword.is_empty() {
                        warnings.push(CatalogueWarning::BlankKeyword {
                            id: entry.id.clone(),
                        });
                    } else if seen_keywords.insert(keyword.clone()) {
                        keywords.push(keyword);
                    }
                }
                entry.keywords = keywords;

                let unique = seen_ids.insert(entry.id.clone());
                if !unique {
                    warnings.push(CatalogueWarning::DuplicateId {
                        id: entry.id.clone(),
                        position,
                    });
                }
                if entry.keywords.is_empty() {
                    warnings.push(CatalogueWarning::EmptyKeywords {
                        id: entry.id.clone(),
                    });
                }
                scorable.push(unique && !entry.keywords.is_empty());
                entry
            })
            .collect();

        for warning in &warnings {
            log::warn!("Catalogue: {}", warning);
        }

        Self {
            entries,
            scorable,
            warnings,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|source| FaqError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let entries: Vec<Entry> =
            serde_json::from_str(&content).map_err(|source| FaqError::Json {
                path: path_ref.display().to_string(),
                source,
            })?;
        log::info!("Loaded {} entries from {:?}", entries.len(), path_ref);
        Ok(Self::new(entries))
    }

    /// A new snapshot with `extra` appended after the current entries.
    pub fn extended(&self, extra: Vec<Entry>) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(extra);
        Self::new(entries)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries in catalogue order, paired with whether they may score.
    pub fn iter_scorable(&self) -> impl Iterator<Item = (&Entry, bool)> {
        self.entries.iter().zip(self.scorable.iter().copied())
    }

    /// First entry carrying `id`.
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warnings(&self) -> &[CatalogueWarning] {
        &self.warnings
    }
}

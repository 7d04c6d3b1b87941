//! Brand and keyword taxonomy.
//!
//! Static, append-only lookup data mapping brand names and hot keywords to
//! canonical category tags. The data is loaded from TOML (see
//! `config/taxonomy.toml`, which is also compiled in as the default) so it
//! can be versioned and tested apart from the query parsing logic.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const BUILTIN_TAXONOMY: &str = include_str!("../../config/taxonomy.toml");

/// Errors that can occur when loading a taxonomy
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid taxonomy TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Entry {0:?} has no categories")]
    EmptyCategories(String),
}

/// Domain an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyGroup {
    IgamingOperator,
    CryptoCasino,
    FantasySports,
    GameTitle,
    GamblingCategory,
}

/// One `{pattern, canonical tags}` record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub pattern: String,
    pub group: TaxonomyGroup,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    entry: TaxonomyEntry,
    regex: Regex,
}

/// Entries compiled to word-boundary matchers
#[derive(Debug, Clone)]
pub struct TaxonomyTable {
    entries: Vec<CompiledEntry>,
}

impl TaxonomyTable {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Result<Self, TaxonomyError> {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.pattern = entry.pattern.trim().to_lowercase();
                entry.categories = entry
                    .categories
                    .iter()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect();

                if entry.categories.is_empty() {
                    return Err(TaxonomyError::EmptyCategories(entry.pattern));
                }

                let regex = Regex::new(&format!(r"\b{}\b", regex::escape(&entry.pattern)))
                    .map_err(|source| TaxonomyError::InvalidPattern {
                        pattern: entry.pattern.clone(),
                        source,
                    })?;

                Ok(CompiledEntry { entry, regex })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Entries whose pattern occurs in `text` (expected lowercase), in table order
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a TaxonomyEntry> + 'a {
        self.entries
            .iter()
            .filter(move |compiled| compiled.regex.is_match(text))
            .map(|compiled| &compiled.entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves brand names in query text to canonical category tags
#[derive(Debug, Clone)]
pub struct BrandTaxonomy {
    table: TaxonomyTable,
}

impl BrandTaxonomy {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Result<Self, TaxonomyError> {
        Ok(Self {
            table: TaxonomyTable::new(entries)?,
        })
    }

    /// Category tags for every brand found in `text`, deduplicated
    pub fn resolve(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        let mut categories = Vec::new();
        for entry in self.table.matches(&text) {
            push_unique(&mut categories, &entry.categories);
        }
        categories
    }

    /// Fold brand matches into an existing tag list
    ///
    /// A tag equal to the matched brand (the generic token taken from the
    /// same span of text) is replaced in place by the brand's categories;
    /// otherwise the categories are appended. Never introduces duplicates.
    pub fn expand_tags(&self, text: &str, tags: &mut Vec<String>) {
        let text = text.to_lowercase();
        for entry in self.table.matches(&text) {
            match tags.iter().position(|t| *t == entry.pattern) {
                Some(index) => {
                    let expansion: Vec<String> = entry
                        .categories
                        .iter()
                        .filter(|c| !tags.contains(c))
                        .cloned()
                        .collect();
                    tags.splice(index..=index, expansion);
                }
                None => push_unique(tags, &entry.categories),
            }
        }
    }

    pub fn table(&self) -> &TaxonomyTable {
        &self.table
    }
}

fn push_unique(tags: &mut Vec<String>, additions: &[String]) {
    for tag in additions {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    version: u32,
    #[serde(default)]
    brands: Vec<TaxonomyEntry>,
    #[serde(default)]
    keywords: Vec<TaxonomyEntry>,
}

/// Complete lookup data used by the query interpreter
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub version: u32,
    pub brands: BrandTaxonomy,
    /// Hot keywords (game titles, gambling sub-categories) and their variants
    pub keywords: TaxonomyTable,
}

impl Taxonomy {
    pub fn new(
        version: u32,
        brands: Vec<TaxonomyEntry>,
        keywords: Vec<TaxonomyEntry>,
    ) -> Result<Self, TaxonomyError> {
        Ok(Self {
            version,
            brands: BrandTaxonomy::new(brands)?,
            keywords: TaxonomyTable::new(keywords)?,
        })
    }

    /// Taxonomy shipped with the service
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_toml_str(BUILTIN_TAXONOMY)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = toml::from_str(raw)?;
        Self::new(file.version, file.brands, file.keywords)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Load from `path` when given, else the built-in data
    pub fn load(path: Option<&str>) -> Result<Self, TaxonomyError> {
        let taxonomy = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::builtin()?,
        };

        tracing::info!(
            "Taxonomy v{} loaded ({} brands, {} keywords)",
            taxonomy.version,
            taxonomy.brands.table().len(),
            taxonomy.keywords.len()
        );

        Ok(taxonomy)
    }
}

// Ingestion configuration: header synonym sets and file selection rules.
// Defaults match the price lists this tool was written for; a JSON file can override any field.

use crate::columns::ColumnRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("keyword '{keyword}' appears in both the {first} and {second} synonym sets")]
    OverlappingSynonym {
        keyword: String,
        first: ColumnRole,
        second: ColumnRole,
    },

    #[error("the {role} synonym set is empty")]
    EmptySynonymSet { role: ColumnRole },

    #[error("file pattern must not be empty")]
    EmptyFilePattern,
}

// ============================================================================
// SYNONYM SETS
// ============================================================================

/// Closed keyword lists that identify each semantic column.
/// Matching is exact after trimming and lower-casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynonymSets {
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub weight: Vec<String>,
}

impl Default for SynonymSets {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| w.to_string()).collect()
        }

        SynonymSets {
            name: words(&[
                "товар",
                "название",
                "наименование",
                "продукт",
                "item",
                "product",
                "title",
                "name",
            ]),
            price: words(&["цена", "розница", "price", "retail"]),
            weight: words(&["вес", "масса", "фасовка", "weight", "mass", "pack size"]),
        }
    }
}

impl SynonymSets {
    /// Keywords for one role
    pub fn keywords(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Name => &self.name,
            ColumnRole::Price => &self.price,
            ColumnRole::Weight => &self.weight,
        }
    }

    /// Does `header` name the given role?
    pub fn matches(&self, role: ColumnRole, header: &str) -> bool {
        let header = normalize_keyword(header);
        self.keywords(role).iter().any(|k| *k == header)
    }

    /// Lower-case and trim every keyword so lookups compare like with like
    fn normalize(&mut self) {
        for list in [&mut self.name, &mut self.price, &mut self.weight] {
            for keyword in list.iter_mut() {
                *keyword = normalize_keyword(keyword);
            }
            list.retain(|k| !k.is_empty());
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut owner: HashMap<&str, ColumnRole> = HashMap::new();

        for role in ColumnRole::ALL {
            let keywords = self.keywords(role);
            if keywords.is_empty() {
                return Err(ConfigError::EmptySynonymSet { role });
            }

            for keyword in keywords {
                match owner.get(keyword.as_str()) {
                    Some(&first) if first != role => {
                        return Err(ConfigError::OverlappingSynonym {
                            keyword: keyword.clone(),
                            first,
                            second: role,
                        });
                    }
                    _ => {
                        owner.insert(keyword.as_str(), role);
                    }
                }
            }
        }

        Ok(())
    }
}

pub(crate) fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ============================================================================
// INGEST CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Header keywords for name / price / weight
    pub synonyms: SynonymSets,

    /// Substring a file name must contain to be scanned
    pub file_pattern: String,

    /// Required file name suffix
    pub file_suffix: String,

    /// Match `file_pattern` ignoring case ("Price_list.csv")
    pub case_insensitive_pattern: bool,

    /// Accept "12,5" as 12.5 in numeric columns (off unless configured)
    pub decimal_comma: bool,

    /// Ingest files on a rayon pool instead of one by one
    pub parallel: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            synonyms: SynonymSets::default(),
            file_pattern: "price".to_string(),
            file_suffix: ".csv".to_string(),
            case_insensitive_pattern: false,
            decimal_comma: false,
            parallel: false,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: IngestConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.validated()
    }

    /// Normalize keywords and reject ambiguous or empty settings
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.synonyms.normalize();
        self.synonyms.validate()?;

        if self.file_pattern.is_empty() {
            return Err(ConfigError::EmptyFilePattern);
        }

        Ok(self)
    }

    /// Builder: replace synonym sets; keywords are trimmed and lower-cased
    pub fn with_synonyms(mut self, mut synonyms: SynonymSets) -> Self {
        synonyms.normalize();
        self.synonyms = synonyms;
        self
    }

    /// Builder: toggle parallel ingestion
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder: toggle decimal comma parsing
    pub fn with_decimal_comma(mut self, decimal_comma: bool) -> Self {
        self.decimal_comma = decimal_comma;
        self
    }

    /// Builder: case-insensitive file name pattern
    pub fn with_case_insensitive_pattern(mut self, enabled: bool) -> Self {
        self.case_insensitive_pattern = enabled;
        self
    }

    /// Is this file name a price list candidate?
    pub fn is_candidate(&self, file_name: &str) -> bool {
        if !file_name.ends_with(&self.file_suffix) {
            return false;
        }

        if self.case_insensitive_pattern {
            file_name
                .to_lowercase()
                .contains(&self.file_pattern.to_lowercase())
        } else {
            file_name.contains(&self.file_pattern)
        }
    }
}

//! Coefficient Table — the static, hand-authored contribution table the scorer reads.
//!
//! Built once at startup (built-in defaults or a JSON override file) and shared
//! read-only through `AppState` as `Arc<CoefficientTable>`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read coefficient table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Coefficient table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate key '{key}' in {mapping} mapping")]
    DuplicateKey { mapping: &'static str, key: String },

    #[error("currency_factor must be a finite positive number, got {0}")]
    InvalidCurrencyFactor(f64),
}

/// One `(key, amount)` pair of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coefficient {
    pub key: String,
    pub amount: i64,
}

/// An ordered key → amount mapping. Order is the option order shown to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientMap(Vec<Coefficient>);

impl CoefficientMap {
    pub fn from_pairs(pairs: &[(&str, i64)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(key, amount)| Coefficient {
                    key: (*key).to_string(),
                    amount: *amount,
                })
                .collect(),
        )
    }

    /// Tolerant lookup: unknown keys contribute nothing.
    pub fn amount(&self, key: &str) -> i64 {
        self.0
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.key.as_str())
    }

    fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.keys().find(|k| !seen.insert(*k))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    pub base_amount: i64,
    /// Multiplier for the secondary-currency display figure (EUR → PHP by default).
    pub currency_factor: f64,
    pub seniority: CoefficientMap,
    pub location: CoefficientMap,
    pub industry: CoefficientMap,
    pub skills: CoefficientMap,
}

impl Default for CoefficientTable {
    fn default() -> Self {
        Self {
            base_amount: 65_000,
            currency_factor: 64.0,
            seniority: CoefficientMap::from_pairs(&[
                ("Intern", 0),
                ("Junior", 15_000),
                ("Mid-Level", 35_000),
                ("Senior", 65_000),
                ("Lead", 90_000),
                ("Director", 130_000),
            ]),
            location: CoefficientMap::from_pairs(&[
                ("United States", 35_000),
                ("Europe (Western)", 5_000),
                ("Asia", -10_000),
                ("Remote", 10_000),
            ]),
            industry: CoefficientMap::from_pairs(&[
                ("Retail", 25_000),
                ("Finance", 20_000),
                ("Technology", 15_000),
                ("Healthcare", 12_000),
                ("Energy", 10_000),
                ("Manufacturing", 5_000),
                ("Education", -5_000),
            ]),
            skills: CoefficientMap::from_pairs(&[
                ("Scala", 15_000),
                ("Spark", 10_000),
                ("AWS", 8_000),
                ("TensorFlow", 8_000),
                ("PyTorch", 8_000),
                ("SQL", 5_000),
                ("Python", 3_000),
                ("Machine Learning", 7_000),
                ("Kubernetes", 9_000),
            ]),
        }
    }
}

impl CoefficientTable {
    /// Loads the table from `path` if given, otherwise returns the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self, TableError> {
        let Some(path) = path else {
            info!("Using built-in coefficient table");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json(&raw)?;
        info!("Loaded coefficient table from {}", path.display());
        Ok(table)
    }

    pub fn from_json(raw: &str) -> Result<Self, TableError> {
        let table: Self = serde_json::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), TableError> {
        if !self.currency_factor.is_finite() || self.currency_factor <= 0.0 {
            return Err(TableError::InvalidCurrencyFactor(self.currency_factor));
        }

        let mappings = [
            ("seniority", &self.seniority),
            ("location", &self.location),
            ("industry", &self.industry),
            ("skills", &self.skills),
        ];
        for (mapping, map) in mappings {
            if let Some(key) = map.first_duplicate() {
                return Err(TableError::DuplicateKey {
                    mapping,
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

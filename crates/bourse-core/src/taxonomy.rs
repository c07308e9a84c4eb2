//! GICS classification option lists.
//!
//! Sector, industry group, industry and sub-industry values are offered to the
//! user and carried in the filter selection, but they do not narrow the
//! country view.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// One row of the GICS classification file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GicsEntry {
    pub sector_name: String,
    #[serde(default)]
    pub industry_group_name: Option<String>,
    #[serde(default)]
    pub industry_name: Option<String>,
    #[serde(default)]
    pub sub_industry_name: Option<String>,
}

/// Sorted, distinct option lists for each GICS level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyOptions {
    pub sectors: Vec<String>,
    pub industry_groups: Vec<String>,
    pub industries: Vec<String>,
    pub sub_industries: Vec<String>,
}

impl TaxonomyOptions {
    pub fn from_entries(entries: &[GicsEntry]) -> Self {
        Self {
            sectors: distinct(entries.iter().map(|entry| Some(entry.sector_name.as_str()))),
            industry_groups: distinct(entries.iter().map(|e| e.industry_group_name.as_deref())),
            industries: distinct(entries.iter().map(|e| e.industry_name.as_deref())),
            sub_industries: distinct(entries.iter().map(|e| e.sub_industry_name.as_deref())),
        }
    }

    pub fn from_json(body: &str) -> Result<Self, CatalogError> {
        let entries: Vec<GicsEntry> = serde_json::from_str(body)?;
        Ok(Self::from_entries(&entries))
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let body = std::fs::read_to_string(path).map_err(|error| CatalogError::File {
            path: path.display().to_string(),
            source: error,
        })?;
        Self::from_json(&body)
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

use crate::catalog::ProviderCatalog;
use crate::error::{OsmRefreshError, Result};
use regex::Regex;
use std::path::Path;

/// A downloaded extract file decomposed into the pieces needed to re-fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExtract {
    pub provider: String,
    pub place_id: String,
    pub file_name: String,
}

pub struct ExtractResolver {
    pattern: Regex,
}

impl ExtractResolver {
    pub fn new(catalog: &ProviderCatalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(OsmRefreshError::Config {
                message: "Cannot resolve extract files without any configured providers"
                    .to_string(),
            });
        }

        // Longer names first so that providers sharing a prefix resolve to
        // the longest literal match.
        let mut names: Vec<&str> = catalog.names().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = format!(r"^({})_([A-Za-z]+).*\.osm\.pbf$", alternation);
        let pattern = Regex::new(&pattern).map_err(|e| OsmRefreshError::Config {
            message: format!("Failed to build provider pattern: {}", e),
        })?;

        Ok(Self { pattern })
    }

    /// Decomposes every candidate filename in the listing, in listing order.
    /// An empty listing is an error; the directory to refresh must hold at
    /// least the files it was asked to refresh.
    pub fn resolve(&self, directory: &Path, file_names: &[String]) -> Result<Vec<ResolvedExtract>> {
        if file_names.is_empty() {
            return Err(OsmRefreshError::EmptyDirectory {
                path: directory.display().to_string(),
            });
        }

        Ok(self.select(file_names))
    }

    /// The filtering core: keeps candidates, drops everything else.
    pub fn select(&self, file_names: &[String]) -> Vec<ResolvedExtract> {
        file_names
            .iter()
            .filter_map(|name| self.resolve_name(name))
            .collect()
    }

    pub fn is_candidate(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    pub fn resolve_name(&self, file_name: &str) -> Option<ResolvedExtract> {
        let captures = self.pattern.captures(file_name)?;
        let provider = captures.get(1)?.as_str().to_string();
        let place_id = captures.get(2)?.as_str().to_string();

        Some(ResolvedExtract {
            provider,
            place_id,
            file_name: file_name.to_string(),
        })
    }
}

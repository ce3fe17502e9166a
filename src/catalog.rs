use crate::config::ProviderConfig;
use crate::error::{OsmRefreshError, Result};
use std::collections::BTreeMap;
use url::Url;

/// Provider name reserved for placeholder entries; never matched or fetched.
pub const TEST_PROVIDER: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    pub url_template: String,
}

#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: BTreeMap<String, Provider>,
}

impl ProviderCatalog {
    pub fn from_config(config: &ProviderConfig) -> Self {
        let providers = config
            .endpoints
            .iter()
            .filter(|(name, _)| name.as_str() != TEST_PROVIDER)
            .map(|(name, template)| {
                (
                    name.clone(),
                    Provider {
                        name: name.clone(),
                        url_template: template.clone(),
                    },
                )
            })
            .collect();

        Self { providers }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|name| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn download_url(&self, provider: &str, place: &str) -> Result<Url> {
        let entry = self
            .providers
            .get(provider)
            .ok_or_else(|| OsmRefreshError::Config {
                message: format!("No endpoint configured for provider: {}", provider),
            })?;

        let rendered = entry.url_template.replace("{place}", place);
        let url = Url::parse(&rendered)?;
        Ok(url)
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::from_config(&ProviderConfig::default())
    }
}

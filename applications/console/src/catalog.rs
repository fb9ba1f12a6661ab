/// Catalog-backed metadata resolver
///
/// Resolves a query against the tracks listed in the configuration: an exact
/// page or media URL first, then a case-insensitive search over title and
/// author.
use crate::config::{Availability, CatalogEntry};
use async_trait::async_trait;
use cadence_core::{MetadataResolver, ResolutionError, TrackInfo};

pub struct CatalogResolver {
    entries: Vec<CatalogEntry>,
}

impl CatalogResolver {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn find(&self, query: &str) -> Option<&CatalogEntry> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.url == query || e.stream_url() == query)
        {
            return Some(entry);
        }

        let needle = query.to_lowercase();
        self.entries.iter().find(|e| {
            e.title.to_lowercase().contains(&needle) || e.author.to_lowercase().contains(&needle)
        })
    }
}

#[async_trait]
impl MetadataResolver for CatalogResolver {
    async fn resolve(&self, query: &str) -> Result<TrackInfo, ResolutionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolutionError::NoResults(String::new()));
        }

        let entry = self
            .find(query)
            .ok_or_else(|| ResolutionError::NoResults(query.to_string()))?;
        tracing::debug!("Resolved '{}' to '{}'", query, entry.title);

        match entry.availability {
            Availability::Public => {}
            Availability::Private => return Err(ResolutionError::VideoPrivate),
            Availability::MembersOnly => return Err(ResolutionError::MembersOnly),
            Availability::Upcoming => return Err(ResolutionError::StreamNotStarted),
        }

        let info = TrackInfo {
            title: entry.title.clone(),
            author: entry.author.clone(),
            channel_url: None,
            watch_url: entry.url.clone(),
            thumbnail_url: None,
            duration_secs: entry.duration_secs,
            stream_url: entry.stream_url().to_string(),
        };
        info.validate()?;
        Ok(info)
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use crate::models::{LatLng, PlaceSuggestion};
use crate::services::proxy::{GeocodingService, ProxyError};

/// In-memory cache in front of a geocoding service
///
/// Suggestions and place locations are cached separately with the same TTL.
/// Failures are never cached.
pub struct CachedGeocoder<G> {
    inner: Arc<G>,
    suggestions: Cache<String, Vec<PlaceSuggestion>>,
    places: Cache<String, Option<LatLng>>,
}

impl<G: GeocodingService> CachedGeocoder<G> {
    pub fn new(inner: Arc<G>, max_entries: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        Self {
            inner,
            suggestions: Cache::builder().max_capacity(max_entries).time_to_live(ttl).build(),
            places: Cache::builder().max_capacity(max_entries).time_to_live(ttl).build(),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            suggestion_entries: self.suggestions.entry_count(),
            place_entries: self.places.entry_count(),
        }
    }

    pub fn invalidate_all(&self) {
        self.suggestions.invalidate_all();
        self.places.invalidate_all();
    }
}

#[async_trait]
impl<G: GeocodingService> GeocodingService for CachedGeocoder<G> {
    async fn suggest(&self, input: &str) -> Result<Vec<PlaceSuggestion>, ProxyError> {
        let key = CacheKey::suggestions(input);
        if let Some(hit) = self.suggestions.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(hit);
        }

        tracing::trace!("Cache miss: {}", key);
        let fresh = self.inner.suggest(input).await?;
        self.suggestions.insert(key, fresh.clone()).await;
        Ok(fresh)
    }

    async fn place_location(&self, place_id: &str) -> Result<Option<LatLng>, ProxyError> {
        let key = CacheKey::place(place_id);
        if let Some(hit) = self.places.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(hit);
        }

        tracing::trace!("Cache miss: {}", key);
        let fresh = self.inner.place_location(place_id).await?;
        self.places.insert(key, fresh).await;
        Ok(fresh)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub suggestion_entries: u64,
    pub place_entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Suggestions are keyed by the trimmed, lowercased query
    pub fn suggestions(input: &str) -> String {
        format!("suggest:{}", input.trim().to_lowercase())
    }

    pub fn place(place_id: &str) -> String {
        format!("place:{}", place_id)
    }
}

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    AutocompleteResponse, AvailabilityResponse, LatLng, Listing, PlaceDetailsResponse,
    PlaceSuggestion,
};

/// Errors that can occur when talking to the listings proxy
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Proxy returned status {0}")]
    Status(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Parameters of an availability search
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityQuery {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: u8,
    /// Narrows the search around a geocoded origin
    pub center: Option<LatLng>,
}

/// One-shot listings fetch
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, ProxyError>;
}

/// Ids of listings bookable for a date range
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    async fn check_availability(&self, query: &AvailabilityQuery) -> Result<HashSet<i64>, ProxyError>;
}

/// Place autocomplete and details
#[async_trait]
pub trait GeocodingService: Send + Sync {
    async fn suggest(&self, input: &str) -> Result<Vec<PlaceSuggestion>, ProxyError>;

    async fn place_location(&self, place_id: &str) -> Result<Option<LatLng>, ProxyError>;

    /// Resolve free text to a point: first suggestion, then its details
    async fn geocode(&self, text: &str) -> Result<Option<LatLng>, ProxyError> {
        let suggestions = self.suggest(text).await?;
        let Some(first) = suggestions.first() else {
            tracing::info!("No location match found for {:?}", text);
            return Ok(None);
        };
        self.place_location(&first.place_id).await
    }
}

/// HTTP client for the listings proxy
///
/// Handles:
/// - Fetching every property
/// - Availability search for a date range
/// - Place autocomplete and place details
pub struct ProxyClient {
    base_url: String,
    client: Client,
}

impl ProxyClient {
    /// Create a new proxy client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProxyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProxyError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Proxy request {} failed: {}", url, status);
            return Err(ProxyError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ProxyError::InvalidResponse(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ListingSource for ProxyClient {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, ProxyError> {
        let url = format!("{}/api/webflow/properties", self.base_url);
        let json: Value = self.get_json(&url).await?;

        let documents = json
            .get("properties")
            .and_then(|p| p.as_array())
            .ok_or_else(|| ProxyError::InvalidResponse("Missing properties array".into()))?;

        let listings: Vec<Listing> = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value::<Listing>(doc.clone()) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::warn!("Skipping malformed property: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} properties ({} documents)", listings.len(), documents.len());

        Ok(listings)
    }
}

#[async_trait]
impl AvailabilityService for ProxyClient {
    async fn check_availability(&self, query: &AvailabilityQuery) -> Result<HashSet<i64>, ProxyError> {
        let mut url = format!(
            "{}/api/search?checkin={}&checkout={}&guests={}",
            self.base_url,
            query.checkin.format("%Y-%m-%d"),
            query.checkout.format("%Y-%m-%d"),
            query.guests
        );
        if let Some(center) = query.center {
            url.push_str(&format!("&lat={}&lng={}", center.lat, center.lng));
        }

        let body: AvailabilityResponse = self.get_json(&url).await?;
        Ok(body.available.into_iter().collect())
    }
}

#[async_trait]
impl GeocodingService for ProxyClient {
    async fn suggest(&self, input: &str) -> Result<Vec<PlaceSuggestion>, ProxyError> {
        let url = format!(
            "{}/api/places/autocomplete?input={}",
            self.base_url,
            urlencoding::encode(input)
        );
        let body: AutocompleteResponse = self.get_json(&url).await?;

        Ok(body
            .predictions
            .into_iter()
            .map(|p| PlaceSuggestion {
                description: p.description,
                place_id: p.place_id,
            })
            .collect())
    }

    async fn place_location(&self, place_id: &str) -> Result<Option<LatLng>, ProxyError> {
        let url = format!(
            "{}/api/places/details?place_id={}",
            self.base_url,
            urlencoding::encode(place_id)
        );
        let body: PlaceDetailsResponse = self.get_json(&url).await?;
        Ok(body.location())
    }
}

use serde::{Deserialize, Serialize};
use crate::models::domain::{Bounds, LatLng, Listing, PlaceSuggestion};

/// Body of the proxy's availability search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub available: Vec<i64>,
}

/// One prediction from the place autocomplete endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacePrediction {
    pub description: String,
    pub place_id: String,
}

/// Body of the place autocomplete endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub predictions: Vec<PlacePrediction>,
}

/// Body of the place details endpoint, reduced to the geometry we read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailsResponse {
    pub result: Option<PlaceResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceResult {
    pub geometry: Option<PlaceGeometry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceGeometry {
    pub location: LatLng,
}

impl PlaceDetailsResponse {
    pub fn location(&self) -> Option<LatLng> {
        self.result
            .as_ref()
            .and_then(|r| r.geometry.as_ref())
            .map(|g| g.location)
    }
}

/// Geographic rectangle as rendered in responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportResponse {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl From<Bounds> for ViewportResponse {
    fn from(b: Bounds) -> Self {
        Self {
            south: b.south(),
            west: b.west(),
            north: b.north(),
            east: b.east(),
        }
    }
}

/// Visible listing in the headless results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCard {
    #[serde(rename = "listingId")]
    pub listing_id: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "priceMin")]
    pub price_min: f64,
    #[serde(rename = "priceMax")]
    pub price_max: f64,
    #[serde(rename = "propertyType")]
    pub property_type: Option<String>,
}

impl From<&Listing> for ListingCard {
    fn from(l: &Listing) -> Self {
        Self {
            listing_id: l.id,
            latitude: l.latitude,
            longitude: l.longitude,
            price_min: l.price_min,
            price_max: l.price_max,
            property_type: l.property_type.clone(),
        }
    }
}

/// Response of the headless listings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub properties: Vec<ListingCard>,
    pub markers: Vec<i64>,
    #[serde(rename = "resultsText")]
    pub results_text: String,
    #[serde(rename = "emptyState")]
    pub empty_state: bool,
    #[serde(rename = "fallbackApplied")]
    pub fallback_applied: bool,
    pub viewport: Option<ViewportResponse>,
    #[serde(rename = "propertyTypes")]
    pub property_types: Vec<String>,
    #[serde(rename = "priceRange")]
    pub price_range: [f64; 2],
    pub notice: Option<String>,
}

/// Response of the autocomplete endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<PlaceSuggestion>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

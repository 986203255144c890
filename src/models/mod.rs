// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Bounds, FilterMode, FitOptions, LatLng, Listing, PlaceSuggestion};
pub use requests::{AutocompleteQuery, ListingsQuery, SearchParams, LISTINGS_PATH};
pub use responses::{
    AutocompleteResponse, AvailabilityResponse, ErrorResponse, HealthResponse, ListingCard,
    ListingsResponse, PlaceDetailsResponse, PlacePrediction, SuggestionsResponse, ViewportResponse,
};

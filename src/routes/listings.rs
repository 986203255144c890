use actix_web::{web, HttpResponse, Responder};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::core::MapView;
use crate::models::{
    AutocompleteQuery, Bounds, ErrorResponse, FilterMode, HealthResponse, ListingCard,
    ListingsQuery, ListingsResponse, SuggestionsResponse,
};
use crate::services::{CachedGeocoder, GeocodingService, HeadlessMap, MapReady, ProxyClient, ResultsPage};
use crate::session::{SearchSession, SessionServices, SessionSettings};

/// Pixel size of the headless map
pub const MAP_WIDTH_PX: u32 = 1280;
pub const MAP_HEIGHT_PX: u32 = 800;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: SessionServices,
    pub geocoder: Arc<CachedGeocoder<ProxyClient>>,
    pub session: SessionSettings,
    pub error_display: Duration,
}

impl AppState {
    /// State backed by one proxy client, geocoding through the cache
    pub fn new(
        proxy: Arc<ProxyClient>,
        geocoder: Arc<CachedGeocoder<ProxyClient>>,
        session: SessionSettings,
        error_display: Duration,
    ) -> Self {
        Self {
            services: SessionServices {
                listings: proxy.clone(),
                availability: proxy,
                geocoder: geocoder.clone(),
            },
            geocoder,
            session,
            error_display,
        }
    }
}

/// Configure listing and place routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/listings", web::get().to(get_listings))
        .route("/places/autocomplete", web::get().to(autocomplete));
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let stats = state.geocoder.stats();
    tracing::debug!(
        "Geocoder cache: {} suggestions, {} places",
        stats.suggestion_entries,
        stats.place_entries
    );

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Filtered listings for a search and viewport
///
/// GET /api/v1/listings?location=Austin&checkin=2025-06-01&checkout=2025-06-05&guests=2
///     &swLat=..&swLng=..&neLat=..&neLng=..&priceMin=..&priceMax=..&types=House,Condo&pets=true
async fn get_listings(
    state: web::Data<AppState>,
    query: web::Query<ListingsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for listings request: {:?}", errors);
        return bad_request(errors.to_string());
    }

    let viewport = match query.viewport() {
        Ok(viewport) => viewport,
        Err(message) => return bad_request(message),
    };

    if let (Some(min), Some(max)) = (query.price_min, query.price_max) {
        if min > max {
            return bad_request("priceMin must not exceed priceMax".to_string());
        }
    }

    // A client-supplied viewport wins over centring on the origin
    let mut settings = state.session;
    let map = match viewport {
        Some(bounds) => {
            settings.center_on_origin = false;
            HeadlessMap::new(bounds, MAP_WIDTH_PX, MAP_HEIGHT_PX)
        }
        None => HeadlessMap::new(Bounds::world(), MAP_WIDTH_PX, MAP_HEIGHT_PX),
    };

    let mut session = SearchSession::load(
        query.search_params(),
        &state.services,
        MapReady::now(map),
        ResultsPage::new(state.error_display),
        &settings,
    )
    .await;

    let mut fallback_applied = session.outcome().fallback.is_some();
    let engine = session.engine_mut();
    {
        let criteria = engine.criteria_mut();
        let observed = criteria.observed_price_range();
        criteria.set_price_window(
            query.price_min.unwrap_or(observed.min),
            query.price_max.unwrap_or(observed.max),
        );
        criteria.select_types(query.selected_types());
        criteria.set_amenities(query.pets, query.smoking);
    }

    // Moves queued while loading are already reflected by the next pass
    if let Some(map) = engine.map_mut() {
        while map.take_pending_move() {}
    }

    let mut outcome = engine.reconcile();
    if outcome.fallback.is_some() {
        fallback_applied = true;
        if engine.map_mut().is_some_and(|m| m.take_pending_move()) {
            outcome = engine.on_viewport_changed();
        }
    }

    let visible: HashSet<i64> = outcome.visible_ids.iter().copied().collect();
    let properties: Vec<ListingCard> = engine
        .listings()
        .iter()
        .filter(|l| visible.contains(&l.id))
        .map(ListingCard::from)
        .collect();

    let viewport = match engine.mode() {
        FilterMode::Viewport => engine.map().map(|m| m.bounds().into()),
        FilterMode::Static => None,
    };
    let observed = engine.criteria().observed_price_range();

    tracing::info!(
        "Listings request served: {} visible, fallback={}",
        properties.len(),
        fallback_applied
    );

    HttpResponse::Ok().json(ListingsResponse {
        properties,
        markers: outcome.marker_ids,
        results_text: engine.view().results_text().to_string(),
        empty_state: outcome.empty_state,
        fallback_applied,
        viewport,
        property_types: engine.property_types(),
        price_range: [observed.min, observed.max],
        notice: engine.view().active_error().map(str::to_string),
    })
}

/// Location suggestions
///
/// GET /api/v1/places/autocomplete?input=Aus
async fn autocomplete(
    state: web::Data<AppState>,
    query: web::Query<AutocompleteQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request(errors.to_string());
    }

    let suggestions = match state.geocoder.suggest(query.input.trim()).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            tracing::error!("Autocomplete for {:?} failed: {}", query.input, e);
            Vec::new()
        }
    };

    HttpResponse::Ok().json(SuggestionsResponse { suggestions })
}

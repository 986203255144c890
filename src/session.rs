//! Page-load orchestration
//!
//! Wires the proxy services, the map readiness handshake and the filter
//! engine together in the order a results page loads.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{
    FilterEngine, MapView, Predicates, ReconcileOutcome, ReconcileSettings, ResultsView,
    SearchError, ViewportReconciler,
};
use crate::models::{FilterMode, LatLng, SearchParams};
use crate::services::{
    AvailabilityQuery, AvailabilityService, GeocodingService, ListingSource, MapReady,
};

/// Collaborators used while loading a results page
#[derive(Clone)]
pub struct SessionServices {
    pub listings: Arc<dyn ListingSource>,
    pub availability: Arc<dyn AvailabilityService>,
    pub geocoder: Arc<dyn GeocodingService>,
}

/// Page-load tunables
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub radius_miles: f64,
    pub reconcile: ReconcileSettings,
    pub initial_zoom: u8,
    pub map_ready_timeout: Duration,
    /// Filtering mode once the map is ready
    pub mode: FilterMode,
    /// Move the map onto the geocoded origin after it becomes ready
    pub center_on_origin: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            radius_miles: crate::core::filters::DEFAULT_RADIUS_MILES,
            reconcile: ReconcileSettings::default(),
            initial_zoom: 10,
            map_ready_timeout: Duration::from_secs(10),
            mode: FilterMode::Viewport,
            center_on_origin: true,
        }
    }
}

/// A loaded results page
pub struct SearchSession<M, V> {
    params: SearchParams,
    origin: Option<LatLng>,
    engine: FilterEngine<M, V>,
    outcome: ReconcileOutcome,
}

impl<M, V> SearchSession<M, V>
where
    M: MapView,
    V: ResultsView,
{
    /// Load a results page
    ///
    /// Geocodes the location, fetches listings, waits for the map, runs the
    /// availability check when dates were given and finishes with one
    /// reconcile pass. Collaborator failures degrade instead of aborting.
    pub async fn load(
        params: SearchParams,
        services: &SessionServices,
        map_ready: MapReady<M>,
        view: V,
        settings: &SessionSettings,
    ) -> Self {
        tracing::info!(
            "Loading search: location={:?}, checkin={:?}, checkout={:?}, guests={}",
            params.location,
            params.checkin,
            params.checkout,
            params.guests
        );

        let origin = match params.location.as_deref() {
            Some(location) => match services.geocoder.geocode(location).await {
                Ok(origin) => origin,
                Err(e) => {
                    tracing::error!("Geocoding {:?} failed: {}", location, e);
                    None
                }
            },
            None => None,
        };

        let listings = match services.listings.fetch_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!("Failed to fetch properties: {}", e);
                Vec::new()
            }
        };

        let reconciler = ViewportReconciler::new(Predicates::new(settings.radius_miles), settings.reconcile);
        let mut engine = FilterEngine::new(listings, reconciler, view);

        let ticket = engine.begin_geocode();
        engine.criteria_mut().apply_geocode(ticket, origin);

        match map_ready.wait(settings.map_ready_timeout).await {
            Ok(mut map) => {
                if let (Some(origin), true) = (origin, settings.center_on_origin) {
                    map.set_view(origin, settings.initial_zoom);
                }
                engine.attach_map(map);
                engine.set_mode(settings.mode);
            }
            Err(e) => {
                tracing::warn!("{}, falling back to static list", e);
            }
        }

        let outcome = match (params.checkin, params.checkout) {
            (Some(checkin), Some(checkout)) if params.location.is_some() => {
                let query = AvailabilityQuery {
                    checkin,
                    checkout,
                    guests: params.guests,
                    center: origin,
                };
                let ticket = engine.begin_availability_check();
                let available = match services.availability.check_availability(&query).await {
                    Ok(ids) => Some(ids),
                    Err(e) => {
                        tracing::error!("Availability check failed: {}", e);
                        None
                    }
                };
                engine.complete_availability_check(ticket, available)
            }
            (Some(_), Some(_)) => {
                engine
                    .view_mut()
                    .show_error(&SearchError::DatesWithoutDestination.to_string());
                None
            }
            _ => None,
        };

        let outcome = outcome.unwrap_or_else(|| engine.reconcile());

        tracing::info!("Search loaded: {}", outcome.summary);

        Self {
            params,
            origin,
            engine,
            outcome,
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Geocoded origin, if the location resolved
    pub fn origin(&self) -> Option<LatLng> {
        self.origin
    }

    /// Outcome of the last pass run through the session
    pub fn outcome(&self) -> &ReconcileOutcome {
        &self.outcome
    }

    pub fn engine(&self) -> &FilterEngine<M, V> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FilterEngine<M, V> {
        &mut self.engine
    }

    /// Run a pass and remember its outcome
    pub fn reconcile(&mut self) -> &ReconcileOutcome {
        self.outcome = self.engine.reconcile();
        &self.outcome
    }

    pub fn into_engine(self) -> FilterEngine<M, V> {
        self.engine
    }
}

use std::collections::HashSet;

use crate::core::criteria::{property_types, CriteriaStore, RequestTicket};
use crate::core::filters::live_only;
use crate::core::reconciler::{ReconcileOutcome, ResultsSummary, ViewportReconciler};
use crate::core::viewport::{MapView, ResultsView};
use crate::models::{FilterMode, LatLng, Listing};

/// Every trigger that leads to a reconcile pass
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    /// Map `moveend` / `zoomend`
    ViewportChanged,
    PriceMinInput(f64),
    PriceMaxInput(f64),
    TogglePropertyType(String),
    TogglePets,
    ToggleSmoking,
    ClearFilters,
}

/// Viewport filter engine
///
/// Owns the live listings and the criteria, and funnels map and filter
/// events into a single reconcile entry point. Each pass reads fresh map
/// bounds and criteria; nothing is captured between passes except the
/// fallback loop guard inside the reconciler.
pub struct FilterEngine<M, V> {
    listings: Vec<Listing>,
    criteria: CriteriaStore,
    reconciler: ViewportReconciler,
    mode: FilterMode,
    map: Option<M>,
    view: V,
}

impl<M, V> FilterEngine<M, V>
where
    M: MapView,
    V: ResultsView,
{
    /// Engine over the live subset of `listings`, in static list mode until
    /// a map is attached
    pub fn new(listings: Vec<Listing>, reconciler: ViewportReconciler, view: V) -> Self {
        let listings = live_only(listings);
        let criteria = CriteriaStore::new(&listings);

        tracing::info!(
            "Filter engine loaded {} live listings, price range ${}-${}",
            listings.len(),
            criteria.observed_price_range().min,
            criteria.observed_price_range().max
        );

        Self {
            listings,
            criteria,
            reconciler,
            mode: FilterMode::Static,
            map: None,
            view,
        }
    }

    /// Hand the ready map to the engine and switch to viewport mode
    pub fn attach_map(&mut self, map: M) {
        self.map = Some(map);
        self.mode = FilterMode::Viewport;
    }

    /// Force a mode; viewport mode without a map behaves like static
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> FilterMode {
        match (self.mode, &self.map) {
            (FilterMode::Viewport, Some(_)) => FilterMode::Viewport,
            _ => FilterMode::Static,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn property_types(&self) -> Vec<String> {
        property_types(&self.listings)
    }

    pub fn criteria(&self) -> &CriteriaStore {
        &self.criteria
    }

    /// Direct criteria access; callers reconcile afterwards
    pub fn criteria_mut(&mut self) -> &mut CriteriaStore {
        &mut self.criteria
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut M> {
        self.map.as_mut()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_parts(self) -> (Vec<Listing>, Option<M>, V) {
        (self.listings, self.map, self.view)
    }

    /// Re-evaluate every listing against the current viewport and criteria
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        let mode = self.mode();
        self.reconciler.reconcile(
            &self.listings,
            &self.criteria,
            mode,
            self.map.as_mut(),
            &mut self.view,
        )
    }

    /// Apply one event and reconcile
    pub fn handle(&mut self, event: FilterEvent) -> ReconcileOutcome {
        tracing::trace!("Filter event: {:?}", event);
        if event != FilterEvent::ViewportChanged {
            self.reconciler.reset_fallback_guard();
        }
        match event {
            FilterEvent::ViewportChanged => {}
            FilterEvent::PriceMinInput(value) => {
                self.criteria.set_price_min(value);
            }
            FilterEvent::PriceMaxInput(value) => {
                self.criteria.set_price_max(value);
            }
            FilterEvent::TogglePropertyType(property_type) => {
                self.criteria.toggle_type(&property_type);
            }
            FilterEvent::TogglePets => {
                self.criteria.toggle_pets();
            }
            FilterEvent::ToggleSmoking => {
                self.criteria.toggle_smoking();
            }
            FilterEvent::ClearFilters => self.criteria.clear_filters(),
        }
        self.reconcile()
    }

    pub fn on_viewport_changed(&mut self) -> ReconcileOutcome {
        self.handle(FilterEvent::ViewportChanged)
    }

    /// Mark an availability request as in flight
    pub fn begin_availability_check(&mut self) -> RequestTicket {
        self.view.set_results_text(&ResultsSummary::Checking.to_string());
        self.view.set_loading(true);
        self.criteria.begin_availability_check()
    }

    /// Apply an availability response (`None` for a failed request) and
    /// reconcile. Stale responses are dropped and return `None`.
    pub fn complete_availability_check(
        &mut self,
        ticket: RequestTicket,
        available: Option<HashSet<i64>>,
    ) -> Option<ReconcileOutcome> {
        match &available {
            Some(ids) => tracing::info!("Availability check returned {} properties", ids.len()),
            None => tracing::warn!("Availability check failed, treating all properties as unavailable"),
        }

        if !self.criteria.apply_availability(ticket, available) {
            return None;
        }
        self.reconciler.reset_fallback_guard();
        self.view.set_loading(false);
        Some(self.reconcile())
    }

    pub fn begin_geocode(&mut self) -> RequestTicket {
        self.criteria.begin_geocode()
    }

    /// Apply a geocode result and reconcile. Stale results return `None`.
    pub fn complete_geocode(
        &mut self,
        ticket: RequestTicket,
        origin: Option<LatLng>,
    ) -> Option<ReconcileOutcome> {
        if !self.criteria.apply_geocode(ticket, origin) {
            return None;
        }
        self.reconciler.reset_fallback_guard();
        Some(self.reconcile())
    }
}

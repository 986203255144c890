use std::fmt;

use crate::core::criteria::{AvailabilityState, CriteriaStore};
use crate::core::filters::Predicates;
use crate::core::nearest::nearest_available;
use crate::core::viewport::{MapView, ResultsView};
use crate::models::{Bounds, FilterMode, FitOptions, Listing};

/// Tunables for a reconcile pass
#[derive(Debug, Clone, Copy)]
pub struct ReconcileSettings {
    /// Listings considered by the nearest-properties fallback
    pub fallback_limit: usize,
    /// Padding and zoom cap for the fallback fit
    pub fallback_fit: FitOptions,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            fallback_limit: 10,
            fallback_fit: FitOptions {
                padding_px: 50,
                max_zoom: 11,
            },
        }
    }
}

/// Text shown in the results counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsSummary {
    Checking,
    AvailabilityFailed,
    /// Viewport mode count
    InViewport(usize),
    /// Static list mode count
    Listed { visible: usize, total: usize },
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsSummary::Checking => write!(f, "Checking availability..."),
            ResultsSummary::AvailabilityFailed => write!(f, "Failed to check availability"),
            ResultsSummary::InViewport(count) => write!(f, "{} properties", count),
            ResultsSummary::Listed { visible, total } if visible == total => {
                write!(f, "Showing all properties")
            }
            ResultsSummary::Listed { visible, total } => {
                write!(f, "Showing {} of {} properties", visible, total)
            }
        }
    }
}

/// Map fit requested by the nearest-properties fallback
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackFit {
    pub listing_ids: Vec<i64>,
    pub target: Bounds,
}

/// What a single reconcile pass decided
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub visible_ids: Vec<i64>,
    pub marker_ids: Vec<i64>,
    pub summary: ResultsSummary,
    pub fallback: Option<FallbackFit>,
    pub empty_state: bool,
}

impl ReconcileOutcome {
    pub fn visible_count(&self) -> usize {
        self.visible_ids.len()
    }
}

/// Viewport reconciler
///
/// Re-evaluates every listing against fresh viewport bounds and criteria,
/// then pushes card, marker, counter and empty-state changes out to the
/// collaborators.
#[derive(Debug, Clone, Default)]
pub struct ViewportReconciler {
    predicates: Predicates,
    settings: ReconcileSettings,
    last_fallback: Option<Bounds>,
}

impl ViewportReconciler {
    pub fn new(predicates: Predicates, settings: ReconcileSettings) -> Self {
        Self {
            predicates,
            settings,
            last_fallback: None,
        }
    }

    pub fn predicates(&self) -> &Predicates {
        &self.predicates
    }

    /// Forget the last fallback target. Called on every criteria change so
    /// the next empty pass may fit the same bounds again.
    pub fn reset_fallback_guard(&mut self) {
        self.last_fallback = None;
    }

    /// Run one pass
    ///
    /// A fallback fit is requested at most once per pass and the pass never
    /// re-runs itself; the map's next move notification triggers the
    /// following pass.
    pub fn reconcile<M, V>(
        &mut self,
        listings: &[Listing],
        criteria: &CriteriaStore,
        mode: FilterMode,
        mut map: Option<&mut M>,
        view: &mut V,
    ) -> ReconcileOutcome
    where
        M: MapView,
        V: ResultsView,
    {
        let viewport = match (mode, map.as_deref()) {
            (FilterMode::Viewport, Some(m)) => Some(m.bounds()),
            _ => None,
        };

        // Cards
        let mut visible_ids = Vec::new();
        for listing in listings {
            let visible = self.predicates.is_visible(listing, criteria, viewport.as_ref());
            view.set_card_visible(listing.id, visible);
            if visible {
                visible_ids.push(listing.id);
            }
        }

        // Markers, from the same predicates minus the geographic clause
        let mut marker_ids = Vec::new();
        if let Some(m) = map.as_deref_mut() {
            for listing in listings {
                let wanted = self.predicates.marker_visible(listing, criteria);
                let attached = m.has_marker(listing.id);
                if wanted && !attached {
                    m.attach_marker(listing.id);
                } else if !wanted && attached {
                    m.detach_marker(listing.id);
                }
                if wanted {
                    marker_ids.push(listing.id);
                }
            }
        }

        let summary = match (criteria.availability(), viewport) {
            (AvailabilityState::Failed, _) => ResultsSummary::AvailabilityFailed,
            (_, Some(_)) => ResultsSummary::InViewport(visible_ids.len()),
            (_, None) => ResultsSummary::Listed {
                visible: visible_ids.len(),
                total: listings.len(),
            },
        };
        view.set_results_text(&summary.to_string());

        tracing::debug!(
            "Reconciled {} listings: {} cards visible, {} markers",
            listings.len(),
            visible_ids.len(),
            marker_ids.len()
        );

        let mut fallback = None;
        if !visible_ids.is_empty() {
            self.last_fallback = None;
        } else if !listings.is_empty() {
            if let (Some(m), Some(_)) = (map.as_deref_mut(), viewport) {
                tracing::info!("No properties in view, searching for nearest");
                fallback = self.fit_nearest(listings, criteria, m);
            }
        }

        let empty_state = visible_ids.is_empty();
        view.set_empty_state(empty_state);

        ReconcileOutcome {
            visible_ids,
            marker_ids,
            summary,
            fallback,
            empty_state,
        }
    }

    fn fit_nearest<M: MapView>(
        &mut self,
        listings: &[Listing],
        criteria: &CriteriaStore,
        map: &mut M,
    ) -> Option<FallbackFit> {
        let nearest = nearest_available(listings, criteria, map.center(), self.settings.fallback_limit);
        let target = Bounds::from_points(nearest.iter().map(|n| n.position));

        let Some(target) = target else {
            tracing::info!("No available properties found anywhere");
            return None;
        };

        if self.last_fallback == Some(target) {
            tracing::debug!("Fallback target unchanged since last fit, showing empty state");
            return None;
        }

        tracing::info!("Fitting map to {} nearest properties", nearest.len());
        map.fit_bounds(target, self.settings.fallback_fit);
        self.last_fallback = Some(target);

        Some(FallbackFit {
            listing_ids: nearest.iter().map(|n| n.listing.id).collect(),
            target,
        })
    }
}

//! Stayfilter - viewport filter engine for property listings
//!
//! Decides which listing cards and map markers are visible for the current
//! map viewport and filter criteria, and falls back to the nearest available
//! properties when nothing is in view.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    distance::{calculate_bounding_box, haversine_distance},
    CriteriaStore, FilterEngine, FilterEvent, MapView, Predicates, ReconcileOutcome, ResultsView,
    ViewportReconciler,
};
pub use crate::models::{Bounds, FilterMode, LatLng, Listing, SearchParams};
pub use crate::session::{SearchSession, SessionServices, SessionSettings};

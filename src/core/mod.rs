// Core engine exports
pub mod criteria;
pub mod distance;
pub mod engine;
pub mod filters;
pub mod nearest;
pub mod reconciler;
pub mod search_bar;
pub mod viewport;

pub use criteria::{property_types, AvailabilityState, CriteriaStore, PriceWindow, RequestTicket};
pub use distance::{calculate_bounding_box, distance_between, haversine_distance, is_within_radius};
pub use engine::{FilterEngine, FilterEvent};
pub use filters::{is_available, live_only, passes_filters, Predicates};
pub use nearest::{nearest_available, NearbyListing};
pub use reconciler::{FallbackFit, ReconcileOutcome, ReconcileSettings, ResultsSummary, ViewportReconciler};
pub use search_bar::{SearchBar, SearchError, SearchVariant};
pub use viewport::{MapView, ResultsView};

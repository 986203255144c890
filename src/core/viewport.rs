use crate::models::{Bounds, FitOptions, LatLng};

/// Map collaborator as seen by the engine
///
/// Move and zoom notifications are delivered by the host calling
/// [`crate::core::FilterEngine::on_viewport_changed`]; the engine never
/// re-enters itself after asking the map to move.
pub trait MapView {
    /// Currently visible bounds
    fn bounds(&self) -> Bounds;

    fn center(&self) -> LatLng;

    /// Recentre the map on a point at a zoom level
    fn set_view(&mut self, center: LatLng, zoom: u8);

    /// Move the viewport so the rectangle is visible
    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions);

    fn has_marker(&self, listing_id: i64) -> bool;

    fn attach_marker(&mut self, listing_id: i64);

    fn detach_marker(&mut self, listing_id: i64);
}

/// Results page collaborator: cards, counter text and the empty state
pub trait ResultsView {
    fn set_card_visible(&mut self, listing_id: i64, visible: bool);

    fn set_results_text(&mut self, text: &str);

    /// Show or hide the "no exact matches" message
    fn set_empty_state(&mut self, visible: bool);

    /// Loading overlay on every card while availability is being checked
    fn set_loading(&mut self, loading: bool);

    /// Transient, auto-dismissing error message
    fn show_error(&mut self, message: &str);
}

use std::collections::{BTreeSet, HashSet};

use crate::models::{LatLng, Listing};

/// Inclusive price window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceWindow {
    pub min: f64,
    pub max: f64,
}

impl PriceWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Observed range over the listings, `0..=0` when there are none
    pub fn observed(listings: &[Listing]) -> Self {
        if listings.is_empty() {
            return Self::new(0.0, 0.0);
        }

        listings.iter().fold(
            Self::new(f64::INFINITY, f64::NEG_INFINITY),
            |acc, l| Self::new(acc.min.min(l.price_min), acc.max.max(l.price_max)),
        )
    }

    /// Both listing bounds must sit inside the window
    #[inline]
    pub fn admits(&self, listing: &Listing) -> bool {
        self.min <= listing.price_min && listing.price_max <= self.max
    }
}

/// Outcome of the most recent availability check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AvailabilityState {
    /// No dates searched, every listing counts as available
    #[default]
    NotChecked,
    /// Check succeeded with these listing ids
    Available(HashSet<i64>),
    /// Check failed, nothing is available
    Failed,
}

impl AvailabilityState {
    pub fn did_check(&self) -> bool {
        !matches!(self, AvailabilityState::NotChecked)
    }

    #[inline]
    pub fn is_available(&self, id: i64) -> bool {
        match self {
            AvailabilityState::NotChecked => true,
            AvailabilityState::Available(ids) => ids.contains(&id),
            AvailabilityState::Failed => false,
        }
    }
}

/// Handle for an outstanding network request
///
/// Responses are only applied while their ticket is the latest one issued
/// for that kind of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Current filter criteria, owned by the UI layer and read by the engine
#[derive(Debug, Clone)]
pub struct CriteriaStore {
    observed: PriceWindow,
    price: PriceWindow,
    selected_types: BTreeSet<String>,
    pets_required: bool,
    smoking_required: bool,
    availability: AvailabilityState,
    search_origin: Option<LatLng>,
    last_availability_ticket: u64,
    last_geocode_ticket: u64,
}

impl CriteriaStore {
    /// Fresh criteria for the given live listings: full price range, no
    /// type or amenity restriction, nothing checked
    pub fn new(listings: &[Listing]) -> Self {
        let observed = PriceWindow::observed(listings);
        Self {
            observed,
            price: observed,
            selected_types: BTreeSet::new(),
            pets_required: false,
            smoking_required: false,
            availability: AvailabilityState::NotChecked,
            search_origin: None,
            last_availability_ticket: 0,
            last_geocode_ticket: 0,
        }
    }

    pub fn observed_price_range(&self) -> PriceWindow {
        self.observed
    }

    pub fn price_window(&self) -> PriceWindow {
        self.price
    }

    pub fn selected_types(&self) -> &BTreeSet<String> {
        &self.selected_types
    }

    pub fn pets_required(&self) -> bool {
        self.pets_required
    }

    pub fn smoking_required(&self) -> bool {
        self.smoking_required
    }

    pub fn availability(&self) -> &AvailabilityState {
        &self.availability
    }

    pub fn search_origin(&self) -> Option<LatLng> {
        self.search_origin
    }

    /// A location was geocoded but no dates have been checked yet
    pub fn is_location_only(&self) -> bool {
        self.search_origin.is_some() && !self.availability.did_check()
    }

    /// Set the whole window at once, without the slider nudge
    pub fn set_price_window(&mut self, min: f64, max: f64) {
        self.price = PriceWindow::new(min, max);
    }

    /// Minimum slider moved. Returns the resulting window.
    pub fn set_price_min(&mut self, value: f64) -> PriceWindow {
        let min = self.clamp_price(value);
        self.price.min = min;
        if min >= self.price.max {
            self.price.max = self.clamp_price(min + 1.0);
        }
        self.price
    }

    /// Maximum slider moved. Returns the resulting window.
    pub fn set_price_max(&mut self, value: f64) -> PriceWindow {
        let max = self.clamp_price(value);
        self.price.max = max;
        if self.price.min >= max {
            self.price.min = self.clamp_price(max - 1.0);
        }
        self.price
    }

    fn clamp_price(&self, value: f64) -> f64 {
        value.max(self.observed.min).min(self.observed.max)
    }

    /// Toggle a property type pill, returns whether it is now selected
    pub fn toggle_type(&mut self, property_type: &str) -> bool {
        if self.selected_types.remove(property_type) {
            false
        } else {
            self.selected_types.insert(property_type.to_string());
            true
        }
    }

    pub fn select_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_types = types.into_iter().map(Into::into).collect();
    }

    pub fn toggle_pets(&mut self) -> bool {
        self.pets_required = !self.pets_required;
        self.pets_required
    }

    pub fn toggle_smoking(&mut self) -> bool {
        self.smoking_required = !self.smoking_required;
        self.smoking_required
    }

    pub fn set_amenities(&mut self, pets_required: bool, smoking_required: bool) {
        self.pets_required = pets_required;
        self.smoking_required = smoking_required;
    }

    /// Reset price to the observed range and drop type and amenity filters.
    /// Availability and search origin are search inputs, not filters, and stay.
    pub fn clear_filters(&mut self) {
        self.price = self.observed;
        self.selected_types.clear();
        self.pets_required = false;
        self.smoking_required = false;
    }

    pub fn begin_availability_check(&mut self) -> RequestTicket {
        self.last_availability_ticket += 1;
        RequestTicket(self.last_availability_ticket)
    }

    /// Apply an availability response. `None` marks a failed check.
    /// Returns false when the response was stale and ignored.
    pub fn apply_availability(&mut self, ticket: RequestTicket, available: Option<HashSet<i64>>) -> bool {
        if ticket.0 != self.last_availability_ticket {
            tracing::debug!(
                "Discarding stale availability response {} (latest {})",
                ticket.0,
                self.last_availability_ticket
            );
            return false;
        }

        self.availability = match available {
            Some(ids) => AvailabilityState::Available(ids),
            None => AvailabilityState::Failed,
        };
        true
    }

    pub fn begin_geocode(&mut self) -> RequestTicket {
        self.last_geocode_ticket += 1;
        RequestTicket(self.last_geocode_ticket)
    }

    /// Apply a geocode result; `None` disables radius filtering.
    /// Returns false when the response was stale and ignored.
    pub fn apply_geocode(&mut self, ticket: RequestTicket, origin: Option<LatLng>) -> bool {
        if ticket.0 != self.last_geocode_ticket {
            tracing::debug!(
                "Discarding stale geocode response {} (latest {})",
                ticket.0,
                self.last_geocode_ticket
            );
            return false;
        }
        self.search_origin = origin;
        true
    }
}

/// Distinct non-empty property types in first-seen order
pub fn property_types(listings: &[Listing]) -> Vec<String> {
    let mut seen = HashSet::new();
    listings
        .iter()
        .filter_map(|l| l.property_type.as_deref())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

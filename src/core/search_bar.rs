use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{PlaceSuggestion, SearchParams};

pub const MIN_GUESTS: u8 = 1;

/// Validation failures surfaced as transient messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Please enter a destination")]
    MissingDestination,

    /// Mobile only accepts a picked suggestion
    #[error("Please enter a location")]
    MissingLocation,

    #[error("Please select check-in and check-out dates")]
    MissingDates,

    #[error("Please enter a destination to search by dates")]
    DatesWithoutDestination,

    #[error("Please select check-in date first")]
    CheckinRequired,

    #[error("Checkout date must be after check-in date")]
    CheckoutNotAfterCheckin,

    #[error("Past dates cannot be selected")]
    DateInPast,
}

/// Which search bar layout is in use; mobile insists on dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchVariant {
    Desktop,
    Mobile,
}

/// Location, dates and guests as entered in the search bar
#[derive(Debug, Clone)]
pub struct SearchBar {
    variant: SearchVariant,
    location: String,
    selected_place: Option<PlaceSuggestion>,
    checkin: Option<NaiveDate>,
    checkout: Option<NaiveDate>,
    guests: u8,
    max_guests: u8,
}

impl SearchBar {
    pub fn new(variant: SearchVariant, default_guests: u8, max_guests: u8) -> Self {
        let max_guests = max_guests.max(MIN_GUESTS);
        Self {
            variant,
            location: String::new(),
            selected_place: None,
            checkin: None,
            checkout: None,
            guests: default_guests.clamp(MIN_GUESTS, max_guests),
            max_guests,
        }
    }

    /// Pre-fill from the results page URL
    pub fn with_params(mut self, params: &SearchParams) -> Self {
        self.location = params.location.clone().unwrap_or_default();
        self.checkin = params.checkin;
        self.checkout = params.checkout.filter(|out| params.checkin.is_some_and(|inn| out > &inn));
        self.guests = params.guests.clamp(MIN_GUESTS, self.max_guests);
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn selected_place(&self) -> Option<&PlaceSuggestion> {
        self.selected_place.as_ref()
    }

    pub fn checkin(&self) -> Option<NaiveDate> {
        self.checkin
    }

    pub fn checkout(&self) -> Option<NaiveDate> {
        self.checkout
    }

    pub fn guests(&self) -> u8 {
        self.guests
    }

    /// Free typing invalidates a previously picked suggestion
    pub fn set_location_text(&mut self, text: &str) {
        if self.location != text {
            self.selected_place = None;
        }
        self.location = text.to_string();
    }

    pub fn select_suggestion(&mut self, suggestion: PlaceSuggestion) {
        self.location = suggestion.description.clone();
        self.selected_place = Some(suggestion);
    }

    /// Pick a check-in day; clears any checkout
    pub fn select_checkin(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), SearchError> {
        if date < today {
            return Err(SearchError::DateInPast);
        }
        self.checkin = Some(date);
        self.checkout = None;
        Ok(())
    }

    /// Pick a checkout day, strictly after check-in
    pub fn select_checkout(&mut self, date: NaiveDate) -> Result<(), SearchError> {
        match self.checkin {
            None => Err(SearchError::CheckinRequired),
            Some(checkin) if date <= checkin => Err(SearchError::CheckoutNotAfterCheckin),
            Some(_) => {
                self.checkout = Some(date);
                Ok(())
            }
        }
    }

    pub fn clear_dates(&mut self) {
        self.checkin = None;
        self.checkout = None;
    }

    pub fn increment_guests(&mut self) -> u8 {
        if self.guests < self.max_guests {
            self.guests += 1;
        }
        self.guests
    }

    pub fn decrement_guests(&mut self) -> u8 {
        if self.guests > MIN_GUESTS {
            self.guests -= 1;
        }
        self.guests
    }

    pub fn can_increment_guests(&self) -> bool {
        self.guests < self.max_guests
    }

    pub fn can_decrement_guests(&self) -> bool {
        self.guests > MIN_GUESTS
    }

    pub fn guest_label(&self) -> String {
        if self.guests == 1 {
            "1 guest".to_string()
        } else {
            format!("{} guests", self.guests)
        }
    }

    /// Validate and produce the results page parameters
    ///
    /// Nothing is mutated on failure.
    pub fn submit(&self) -> Result<SearchParams, SearchError> {
        let location = match (self.variant, &self.selected_place) {
            (SearchVariant::Mobile, Some(place)) => place.description.trim(),
            (SearchVariant::Mobile, None) => return Err(SearchError::MissingLocation),
            (SearchVariant::Desktop, _) => self.location.trim(),
        };
        if location.is_empty() {
            return Err(SearchError::MissingDestination);
        }

        if self.variant == SearchVariant::Mobile && (self.checkin.is_none() || self.checkout.is_none()) {
            return Err(SearchError::MissingDates);
        }

        if let (Some(checkin), Some(checkout)) = (self.checkin, self.checkout) {
            if checkout <= checkin {
                return Err(SearchError::CheckoutNotAfterCheckin);
            }
        }

        Ok(SearchParams {
            location: Some(location.to_string()),
            checkin: self.checkin,
            checkout: self.checkout,
            guests: self.guests,
        })
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Bounds, LatLng};

/// Path the search bar navigates to
pub const LISTINGS_PATH: &str = "/listings";

const DEFAULT_GUESTS: u8 = 2;

/// Search parameters carried in the results page URL
///
/// Dates are local calendar dates (`YYYY-MM-DD`), never UTC instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub location: Option<String>,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
    pub guests: u8,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            location: None,
            checkin: None,
            checkout: None,
            guests: DEFAULT_GUESTS,
        }
    }
}

impl SearchParams {
    /// Parse a raw query string such as `?location=Austin&guests=4`
    ///
    /// Unknown keys are ignored, unparseable dates are dropped and a missing
    /// or non-positive guest count falls back to 2.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(raw);

            match key {
                "location" => {
                    let trimmed = value.trim();
                    params.location = (!trimmed.is_empty()).then(|| trimmed.to_string());
                }
                "checkin" => params.checkin = parse_date(key, &value),
                "checkout" => params.checkout = parse_date(key, &value),
                "guests" => {
                    params.guests = value
                        .trim()
                        .parse::<u8>()
                        .ok()
                        .filter(|g| *g > 0)
                        .unwrap_or(DEFAULT_GUESTS)
                }
                _ => {}
            }
        }

        params
    }

    /// True when both dates were supplied
    pub fn has_dates(&self) -> bool {
        self.checkin.is_some() && self.checkout.is_some()
    }

    /// Render the query string understood by [`SearchParams::from_query`]
    pub fn to_query(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(location) = &self.location {
            parts.push(format!("location={}", urlencoding::encode(location)));
        }
        if let Some(checkin) = self.checkin {
            parts.push(format!("checkin={}", checkin.format("%Y-%m-%d")));
        }
        if let Some(checkout) = self.checkout {
            parts.push(format!("checkout={}", checkout.format("%Y-%m-%d")));
        }
        parts.push(format!("guests={}", self.guests));
        parts.join("&")
    }

    /// Full navigation target for the results page
    pub fn listings_url(&self) -> String {
        format!("{}?{}", LISTINGS_PATH, self.to_query())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

fn parse_date(key: &str, value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!("Ignoring invalid {} date {:?}: {}", key, value, e);
            None
        }
    }
}

/// Query accepted by the headless listings endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListingsQuery {
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
    #[validate(range(min = 1, max = 30))]
    pub guests: Option<u8>,
    #[serde(rename = "swLat")]
    pub sw_lat: Option<f64>,
    #[serde(rename = "swLng")]
    pub sw_lng: Option<f64>,
    #[serde(rename = "neLat")]
    pub ne_lat: Option<f64>,
    #[serde(rename = "neLng")]
    pub ne_lng: Option<f64>,
    #[serde(rename = "priceMin")]
    #[validate(range(min = 0.0))]
    pub price_min: Option<f64>,
    #[serde(rename = "priceMax")]
    #[validate(range(min = 0.0))]
    pub price_max: Option<f64>,
    /// Comma separated property types
    pub types: Option<String>,
    #[serde(default)]
    pub pets: bool,
    #[serde(default)]
    pub smoking: bool,
}

impl ListingsQuery {
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            location: self
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            checkin: self.checkin,
            checkout: self.checkout,
            guests: self.guests.unwrap_or(DEFAULT_GUESTS),
        }
    }

    /// Viewport from the four corner params; all four or none must be given
    pub fn viewport(&self) -> Result<Option<Bounds>, String> {
        match (self.sw_lat, self.sw_lng, self.ne_lat, self.ne_lng) {
            (None, None, None, None) => Ok(None),
            (Some(sw_lat), Some(sw_lng), Some(ne_lat), Some(ne_lng)) => {
                let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
                let lng_ok = |v: f64| (-180.0..=180.0).contains(&v);
                if !(lat_ok(sw_lat) && lat_ok(ne_lat) && lng_ok(sw_lng) && lng_ok(ne_lng)) {
                    return Err("viewport coordinates out of range".to_string());
                }
                Ok(Some(Bounds::new(
                    LatLng::new(sw_lat, sw_lng),
                    LatLng::new(ne_lat, ne_lng),
                )))
            }
            _ => Err("swLat, swLng, neLat and neLng must be given together".to_string()),
        }
    }

    pub fn selected_types(&self) -> Vec<String> {
        self.types
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Query accepted by the autocomplete endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AutocompleteQuery {
    #[validate(length(min = 3, max = 200))]
    pub input: String,
}

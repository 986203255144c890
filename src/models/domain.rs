use geo::{BoundingRect, Coord, Intersects, MultiPoint, Point, Rect};
use serde::{Deserialize, Deserializer, Serialize};

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn coord(self) -> Coord<f64> {
        Coord { x: self.lng, y: self.lat }
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.y, lng: c.x }
    }
}

/// Rectangular geographic bounds, inclusive on every edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds(Rect<f64>);

impl Bounds {
    /// Build bounds from any two opposite corners
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self(Rect::new(a.coord(), b.coord()))
    }

    pub fn world() -> Self {
        Self::new(LatLng::new(-90.0, -180.0), LatLng::new(90.0, 180.0))
    }

    /// Smallest bounds covering every point, `None` for an empty input
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let multi: MultiPoint<f64> = points
            .into_iter()
            .map(|p| Point::from(p.coord()))
            .collect::<Vec<_>>()
            .into();
        multi.bounding_rect().map(Self)
    }

    #[inline]
    pub fn contains(&self, point: LatLng) -> bool {
        self.0.intersects(&point.coord())
    }

    pub fn center(&self) -> LatLng {
        self.0.center().into()
    }

    pub fn south(&self) -> f64 {
        self.0.min().y
    }

    pub fn west(&self) -> f64 {
        self.0.min().x
    }

    pub fn north(&self) -> f64 {
        self.0.max().y
    }

    pub fn east(&self) -> f64 {
        self.0.max().x
    }

    pub fn lat_span(&self) -> f64 {
        self.0.height()
    }

    pub fn lng_span(&self) -> f64 {
        self.0.width()
    }

    /// Grow every edge by the given margins, clamped to valid coordinates
    pub fn expand(&self, lat_margin: f64, lng_margin: f64) -> Self {
        Self::new(
            LatLng::new(
                (self.south() - lat_margin).max(-90.0),
                (self.west() - lng_margin).max(-180.0),
            ),
            LatLng::new(
                (self.north() + lat_margin).min(90.0),
                (self.east() + lng_margin).min(180.0),
            ),
        )
    }
}

/// Property listing as delivered by the listings proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "listingId", deserialize_with = "deserialize_listing_id")]
    pub id: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "priceMin", default)]
    pub price_min: f64,
    #[serde(rename = "priceMax", default)]
    pub price_max: f64,
    #[serde(rename = "propertyType", default)]
    pub property_type: Option<String>,
    #[serde(rename = "petsAllowed", default)]
    pub pets_allowed: bool,
    #[serde(rename = "smokingAllowed", default)]
    pub smoking_allowed: bool,
    #[serde(rename = "isLive", default)]
    pub is_live: bool,
}

impl Listing {
    /// Map position, if the listing carries usable coordinates
    pub fn position(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// The proxy sends ids either as numbers or as numeric strings
fn deserialize_listing_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(i64),
        Str(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => Ok(n),
        IdRepr::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid listing id: {:?}", s))),
    }
}

/// A location suggestion from the place autocomplete endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub description: String,
    #[serde(rename = "placeId")]
    pub place_id: String,
}

/// How cards are constrained geographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Cards follow the map viewport
    #[default]
    Viewport,
    /// Plain list without a map
    Static,
}

/// Constraints passed to the map when fitting a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub padding_px: u32,
    pub max_zoom: u8,
}

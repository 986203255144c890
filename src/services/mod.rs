// Service exports
pub mod cache;
pub mod map;
pub mod proxy;
pub mod results;
pub mod suggest;

pub use cache::{CacheKey, CacheStats, CachedGeocoder};
pub use map::{map_ready_channel, HeadlessMap, MapError, MapReady, MapReadySender};
pub use proxy::{AvailabilityQuery, AvailabilityService, GeocodingService, ListingSource, ProxyClient, ProxyError};
pub use results::{CardState, ResultsPage};
pub use suggest::{Debouncer, LocationAutocomplete};

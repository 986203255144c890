// Integration tests for stayfilter

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{test, web, App};
use async_trait::async_trait;
use mockito::{Matcher, Server};

use stayfilter::core::{AvailabilityState, FilterEngine, MapView, ViewportReconciler};
use stayfilter::models::{
    Bounds, FilterMode, LatLng, Listing, ListingsResponse, PlaceSuggestion, SearchParams,
    SuggestionsResponse,
};
use stayfilter::routes::{self, AppState};
use stayfilter::services::{
    map_ready_channel, AvailabilityQuery, AvailabilityService, CachedGeocoder, GeocodingService,
    HeadlessMap, ListingSource, MapReady, ProxyClient, ProxyError, ResultsPage,
};
use stayfilter::session::{SearchSession, SessionServices, SessionSettings};

const AUSTIN: LatLng = LatLng { lat: 30.2672, lng: -97.7431 };

fn create_listing(id: i64, lat: f64, lng: f64) -> Listing {
    Listing {
        id,
        latitude: Some(lat),
        longitude: Some(lng),
        price_min: 100.0 + id as f64,
        price_max: 200.0 + id as f64,
        property_type: Some("House".to_string()),
        pets_allowed: false,
        smoking_allowed: false,
        is_live: true,
    }
}

/// Five listings around downtown Austin
fn austin_listings() -> Vec<Listing> {
    vec![
        create_listing(1, 30.27, -97.74),
        create_listing(2, 30.30, -97.70),
        create_listing(3, 30.22, -97.78),
        create_listing(4, 30.25, -97.75),
        create_listing(5, 30.33, -97.72),
    ]
}

/// Stand-in for the listings proxy
struct FakeProxy {
    listings: Option<Vec<Listing>>,
    available: Option<HashSet<i64>>,
    origin: Option<LatLng>,
    availability_calls: AtomicUsize,
}

impl FakeProxy {
    fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: Some(listings),
            available: None,
            origin: Some(AUSTIN),
            availability_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ListingSource for FakeProxy {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, ProxyError> {
        self.listings.clone().ok_or(ProxyError::Status(502))
    }
}

#[async_trait]
impl AvailabilityService for FakeProxy {
    async fn check_availability(&self, _query: &AvailabilityQuery) -> Result<HashSet<i64>, ProxyError> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        self.available
            .clone()
            .ok_or_else(|| ProxyError::InvalidResponse("boom".to_string()))
    }
}

#[async_trait]
impl GeocodingService for FakeProxy {
    async fn suggest(&self, input: &str) -> Result<Vec<PlaceSuggestion>, ProxyError> {
        Ok(self
            .origin
            .map(|_| PlaceSuggestion {
                description: format!("{}, TX, USA", input),
                place_id: "austin".to_string(),
            })
            .into_iter()
            .collect())
    }

    async fn place_location(&self, _place_id: &str) -> Result<Option<LatLng>, ProxyError> {
        Ok(self.origin)
    }
}

fn services(proxy: Arc<FakeProxy>) -> SessionServices {
    SessionServices {
        listings: proxy.clone(),
        availability: proxy.clone(),
        geocoder: proxy,
    }
}

fn world_map() -> MapReady<HeadlessMap> {
    MapReady::now(HeadlessMap::new(Bounds::world(), 800, 600))
}

async fn load(
    proxy: Arc<FakeProxy>,
    query: &str,
    map: MapReady<HeadlessMap>,
    settings: &SessionSettings,
) -> SearchSession<HeadlessMap, ResultsPage> {
    SearchSession::load(
        SearchParams::from_query(query),
        &services(proxy),
        map,
        ResultsPage::default(),
        settings,
    )
    .await
}

#[tokio::test]
async fn test_end_to_end_austin_search() {
    let mut proxy = FakeProxy::new(austin_listings());
    proxy.available = Some(HashSet::from([1, 2, 3]));
    let proxy = Arc::new(proxy);

    let session = load(
        proxy.clone(),
        "?location=Austin&checkin=2025-06-01&checkout=2025-06-05&guests=4",
        world_map(),
        &SessionSettings::default(),
    )
    .await;

    assert_eq!(session.origin(), Some(AUSTIN));
    assert_eq!(session.params().guests, 4);
    assert_eq!(proxy.availability_calls.load(Ordering::SeqCst), 1);

    let engine = session.engine();
    assert_eq!(engine.mode(), FilterMode::Viewport);
    assert!(engine.map().unwrap().bounds().contains(AUSTIN));

    assert_eq!(session.outcome().visible_ids, vec![1, 2, 3]);
    assert_eq!(session.outcome().marker_ids, vec![1, 2, 3]);
    assert_eq!(engine.view().results_text(), "3 properties");
    assert!(!engine.view().empty_state_visible());
    assert!(!engine.view().is_loading());
}

#[tokio::test]
async fn test_dates_without_location_shows_message() {
    let mut proxy = FakeProxy::new(austin_listings());
    proxy.available = Some(HashSet::from([1]));
    let proxy = Arc::new(proxy);

    let session = load(
        proxy.clone(),
        "?checkin=2025-06-01&checkout=2025-06-05",
        world_map(),
        &SessionSettings::default(),
    )
    .await;

    assert_eq!(proxy.availability_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        session.engine().view().active_error(),
        Some("Please enter a destination to search by dates")
    );
    assert_eq!(session.outcome().visible_count(), 5);
}

#[tokio::test]
async fn test_availability_failure_is_fail_closed() {
    let proxy = Arc::new(FakeProxy::new(austin_listings()));

    let session = load(
        proxy,
        "?location=Austin&checkin=2025-06-01&checkout=2025-06-05",
        world_map(),
        &SessionSettings::default(),
    )
    .await;

    let engine = session.engine();
    assert_eq!(engine.criteria().availability(), &AvailabilityState::Failed);
    assert!(session.outcome().visible_ids.is_empty());
    assert!(session.outcome().marker_ids.is_empty());
    assert!(session.outcome().fallback.is_none());
    assert_eq!(engine.view().results_text(), "Failed to check availability");
    assert!(engine.view().empty_state_visible());
}

#[tokio::test]
async fn test_listings_failure_yields_empty_page() {
    let mut proxy = FakeProxy::new(Vec::new());
    proxy.listings = None;

    let session = load(Arc::new(proxy), "", world_map(), &SessionSettings::default()).await;

    assert!(session.engine().listings().is_empty());
    assert_eq!(session.engine().view().results_text(), "0 properties");
    assert!(session.outcome().fallback.is_none());
}

#[tokio::test]
async fn test_unmatched_location_disables_radius() {
    let mut listings = austin_listings();
    listings.push(create_listing(6, 29.4241, -98.4936));
    let mut proxy = FakeProxy::new(listings);
    proxy.origin = None;

    let session = load(Arc::new(proxy), "?location=Nowhere", world_map(), &SessionSettings::default()).await;

    assert_eq!(session.origin(), None);
    assert!(!session.engine().criteria().is_location_only());
    assert_eq!(session.outcome().visible_count(), 6);
    assert_eq!(session.engine().view().results_text(), "6 properties");
}

#[tokio::test(start_paused = true)]
async fn test_map_timeout_falls_back_to_static_list() {
    let mut listings = austin_listings();
    // San Antonio, outside the 30 mile radius
    listings.push(create_listing(6, 29.4241, -98.4936));
    let proxy = Arc::new(FakeProxy::new(listings));

    let (_never_ready, map_ready) = map_ready_channel::<HeadlessMap>();
    let settings = SessionSettings {
        map_ready_timeout: Duration::from_millis(50),
        ..SessionSettings::default()
    };

    let session = load(proxy, "?location=Austin", map_ready, &settings).await;

    let engine = session.engine();
    assert_eq!(engine.mode(), FilterMode::Static);
    assert!(engine.map().is_none());
    assert_eq!(session.outcome().visible_ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(engine.view().results_text(), "Showing 5 of 6 properties");
}

#[tokio::test]
async fn test_static_mode_setting_ignores_viewport() {
    let proxy = Arc::new(FakeProxy::new(austin_listings()));
    let far_away = Bounds::new(LatLng::new(40.0, -100.0), LatLng::new(41.0, -99.0));
    let settings = SessionSettings {
        mode: FilterMode::Static,
        center_on_origin: false,
        ..SessionSettings::default()
    };

    let session = load(proxy, "", MapReady::now(HeadlessMap::new(far_away, 800, 600)), &settings).await;

    assert_eq!(session.engine().mode(), FilterMode::Static);
    assert_eq!(session.engine().view().results_text(), "Showing all properties");
    assert!(session.outcome().fallback.is_none());
    // Markers are still managed while a map exists
    assert_eq!(session.engine().map().unwrap().markers().len(), 5);
}

#[::core::prelude::v1::test]
fn test_stale_availability_response_is_discarded() {
    let mut engine: FilterEngine<HeadlessMap, ResultsPage> =
        FilterEngine::new(austin_listings(), ViewportReconciler::default(), ResultsPage::default());

    let first = engine.begin_availability_check();
    let second = engine.begin_availability_check();
    assert_eq!(engine.view().results_text(), "Checking availability...");
    assert!(engine.view().is_loading());

    let outcome = engine.complete_availability_check(second, Some(HashSet::from([1])));
    assert_eq!(outcome.map(|o| o.visible_ids), Some(vec![1]));

    // The slower, older response arrives last and is ignored
    assert!(engine.complete_availability_check(first, Some(HashSet::from([2, 3]))).is_none());
    assert_eq!(
        engine.criteria().availability(),
        &AvailabilityState::Available(HashSet::from([1]))
    );
}

#[::core::prelude::v1::test]
fn test_stale_geocode_is_discarded() {
    let mut engine: FilterEngine<HeadlessMap, ResultsPage> =
        FilterEngine::new(austin_listings(), ViewportReconciler::default(), ResultsPage::default());

    let first = engine.begin_geocode();
    let second = engine.begin_geocode();
    assert!(engine.complete_geocode(second, None).is_some());
    assert!(engine.complete_geocode(first, Some(AUSTIN)).is_none());
    assert_eq!(engine.criteria().search_origin(), None);
}

async fn mock_proxy(server: &mut Server) {
    let properties = serde_json::json!({
        "properties": austin_listings()
            .iter()
            .map(|l| serde_json::json!({
                "listingId": l.id,
                "latitude": l.latitude,
                "longitude": l.longitude,
                "priceMin": l.price_min,
                "priceMax": l.price_max,
                "propertyType": l.property_type,
                "isLive": true,
            }))
            .collect::<Vec<_>>(),
    });

    server
        .mock("GET", "/api/webflow/properties")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(properties.to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/places/autocomplete")
        .match_query(Matcher::UrlEncoded("input".into(), "Austin".into()))
        .with_status(200)
        .with_body(r#"{"predictions":[{"description":"Austin, TX, USA","place_id":"p1"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/places/details")
        .match_query(Matcher::UrlEncoded("place_id".into(), "p1".into()))
        .with_status(200)
        .with_body(r#"{"result":{"geometry":{"location":{"lat":30.2672,"lng":-97.7431}}}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"available":[1,2,3]}"#)
        .create_async()
        .await;
}

fn app_state(server: &Server) -> AppState {
    let proxy = Arc::new(ProxyClient::new(server.url(), Duration::from_secs(5)).unwrap());
    let geocoder = Arc::new(CachedGeocoder::new(proxy.clone(), 100, 60));
    AppState::new(proxy, geocoder, SessionSettings::default(), Duration::from_secs(3))
}

#[actix_web::test]
async fn test_listings_endpoint_end_to_end() {
    let mut server = Server::new_async().await;
    mock_proxy(&mut server).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/listings?location=Austin&checkin=2025-06-01&checkout=2025-06-05&guests=4")
        .to_request();
    let body: ListingsResponse = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<i64> = body.properties.iter().map(|p| p.listing_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(body.markers, vec![1, 2, 3]);
    assert_eq!(body.results_text, "3 properties");
    assert!(!body.empty_state);
    assert!(!body.fallback_applied);
    assert_eq!(body.property_types, vec!["House".to_string()]);
    assert_eq!(body.price_range, [101.0, 205.0]);
    assert!(body.viewport.is_some());
}

#[actix_web::test]
async fn test_listings_endpoint_fallback_recenters() {
    let mut server = Server::new_async().await;
    mock_proxy(&mut server).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/listings?swLat=40&swLng=-100&neLat=41&neLng=-99")
        .to_request();
    let body: ListingsResponse = test::call_and_read_body_json(&app, req).await;

    assert!(body.fallback_applied);
    assert_eq!(body.properties.len(), 5);
    assert_eq!(body.results_text, "5 properties");

    let viewport = body.viewport.unwrap();
    assert!(viewport.south < 30.22 && viewport.north > 30.33);
}

#[actix_web::test]
async fn test_listings_endpoint_rejects_partial_viewport() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/listings?swLat=40&swLng=-100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/v1/listings?guests=0")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_autocomplete_endpoint() {
    let mut server = Server::new_async().await;
    mock_proxy(&mut server).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/places/autocomplete?input=Austin")
        .to_request();
    let body: SuggestionsResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.suggestions.len(), 1);
    assert_eq!(body.suggestions[0].place_id, "p1");

    let req = test::TestRequest::get()
        .uri("/api/v1/places/autocomplete?input=Au")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let server = Server::new_async().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(&server)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

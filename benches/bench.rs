// Criterion benchmarks for stayfilter

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use stayfilter::core::{
    distance::{haversine_distance, calculate_bounding_box},
    nearest::nearest_available,
    CriteriaStore, FilterEngine, Predicates, ViewportReconciler,
};
use stayfilter::models::{Bounds, LatLng, Listing};
use stayfilter::services::{HeadlessMap, ResultsPage};

fn create_listing(id: usize, lat: f64, lng: f64) -> Listing {
    Listing {
        id: id as i64,
        latitude: Some(lat),
        longitude: Some(lng),
        price_min: 50.0 + (id % 200) as f64,
        price_max: 150.0 + (id % 400) as f64,
        property_type: Some(if id % 3 == 0 { "Condo" } else { "House" }.to_string()),
        pets_allowed: id % 2 == 0,
        smoking_allowed: id % 5 == 0,
        is_live: true,
    }
}

/// Listings scattered in a ~3 degree square around Austin
fn create_listings(count: usize) -> Vec<Listing> {
    (0..count)
        .map(|i| {
            let lat = 28.8 + (i % 97) as f64 * 0.03;
            let lng = -99.2 + (i % 89) as f64 * 0.033;
            create_listing(i, lat, lng)
        })
        .collect()
}

fn austin_viewport() -> Bounds {
    Bounds::new(LatLng::new(29.9, -98.3), LatLng::new(30.6, -97.2))
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(30.2672),
                black_box(-97.7431),
                black_box(30.5083),
                black_box(-97.6789),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| calculate_bounding_box(black_box(30.2672), black_box(-97.7431), black_box(30.0)));
    });
}

fn bench_predicates(c: &mut Criterion) {
    let listings = create_listings(5000);
    let mut criteria = CriteriaStore::new(&listings);
    criteria.set_price_window(60.0, 400.0);
    criteria.select_types(["House"]);
    let predicates = Predicates::default();
    let viewport = austin_viewport();

    c.bench_function("predicates_5000", |b| {
        b.iter(|| {
            listings
                .iter()
                .filter(|l| predicates.is_visible(l, &criteria, Some(black_box(&viewport))))
                .count()
        });
    });
}

fn bench_nearest(c: &mut Criterion) {
    let listings = create_listings(5000);
    let criteria = CriteriaStore::new(&listings);

    c.bench_function("nearest_available_5000", |b| {
        b.iter(|| nearest_available(&listings, &criteria, black_box(LatLng::new(40.0, -100.0)), 10).len());
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for count in [100, 1000, 5000].iter() {
        let mut engine = FilterEngine::new(
            create_listings(*count),
            ViewportReconciler::default(),
            ResultsPage::default(),
        );
        engine.attach_map(HeadlessMap::new(austin_viewport(), 1280, 800));

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(engine.reconcile().visible_count()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_predicates,
    bench_nearest,
    bench_reconcile
);

criterion_main!(benches);

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::core::MapView;
use crate::models::{Bounds, FitOptions, LatLng};

/// Pixel size of one map tile
const TILE_SIZE_PX: f64 = 256.0;

/// Errors while waiting for the map collaborator
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("Map not ready after {0:?}")]
    Timeout(Duration),

    #[error("Map initialisation was abandoned")]
    Closed,
}

/// Sending half handed to whatever initialises the map
pub struct MapReadySender<M>(oneshot::Sender<M>);

impl<M> MapReadySender<M> {
    /// Announce the map; returns it back if nobody is waiting any more
    pub fn ready(self, map: M) -> Result<(), M> {
        self.0.send(map)
    }
}

/// Future side of the map readiness handshake
pub struct MapReady<M>(oneshot::Receiver<M>);

pub fn map_ready_channel<M>() -> (MapReadySender<M>, MapReady<M>) {
    let (tx, rx) = oneshot::channel();
    (MapReadySender(tx), MapReady(rx))
}

impl<M> MapReady<M> {
    /// Already-initialised map
    pub fn now(map: M) -> Self {
        let (tx, rx) = oneshot::channel();
        // Receiver is alive, send cannot fail
        let _ = tx.send(map);
        Self(rx)
    }

    /// Wait for the map with a bounded timeout
    pub async fn wait(self, timeout: Duration) -> Result<M, MapError> {
        match tokio::time::timeout(timeout, self.0).await {
            Ok(Ok(map)) => Ok(map),
            Ok(Err(_)) => Err(MapError::Closed),
            Err(_) => Err(MapError::Timeout(timeout)),
        }
    }
}

/// Degrees covered by `px` pixels at a zoom level (web mercator at the equator)
fn degrees_for_pixels(px: f64, zoom: u8) -> f64 {
    px * 360.0 / (TILE_SIZE_PX * 2f64.powi(i32::from(zoom)))
}

/// Map without a renderer
///
/// Tracks bounds, markers and fit requests so the engine can run server
/// side and in tests. Every view change queues one move notification that
/// the host must deliver back to the engine.
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    bounds: Bounds,
    width_px: u32,
    height_px: u32,
    markers: BTreeSet<i64>,
    fit_requests: Vec<(Bounds, FitOptions)>,
    pending_moves: usize,
}

impl HeadlessMap {
    pub fn new(bounds: Bounds, width_px: u32, height_px: u32) -> Self {
        Self {
            bounds,
            width_px: width_px.max(1),
            height_px: height_px.max(1),
            markers: BTreeSet::new(),
            fit_requests: Vec::new(),
            pending_moves: 0,
        }
    }

    /// Map centred on a point at a zoom level
    pub fn centered(center: LatLng, zoom: u8, width_px: u32, height_px: u32) -> Self {
        let mut map = Self::new(Bounds::world(), width_px, height_px);
        map.bounds = map.bounds_at(center, zoom);
        map
    }

    pub fn markers(&self) -> &BTreeSet<i64> {
        &self.markers
    }

    pub fn fit_requests(&self) -> &[(Bounds, FitOptions)] {
        &self.fit_requests
    }

    /// Consume one queued move notification
    pub fn take_pending_move(&mut self) -> bool {
        if self.pending_moves == 0 {
            return false;
        }
        self.pending_moves -= 1;
        true
    }

    /// Pan without zooming, as a user drag would
    pub fn pan_to(&mut self, center: LatLng) {
        let half_lat = self.bounds.lat_span() / 2.0;
        let half_lng = self.bounds.lng_span() / 2.0;
        self.move_to(Bounds::new(
            LatLng::new(center.lat - half_lat, center.lng - half_lng),
            LatLng::new(center.lat + half_lat, center.lng + half_lng),
        ));
    }

    fn bounds_at(&self, center: LatLng, zoom: u8) -> Bounds {
        let lng_span = degrees_for_pixels(f64::from(self.width_px), zoom);
        let lat_span = degrees_for_pixels(f64::from(self.height_px), zoom)
            * center.lat.to_radians().cos().abs().max(0.01);
        Bounds::new(
            LatLng::new(center.lat - lat_span / 2.0, center.lng - lng_span / 2.0),
            LatLng::new(center.lat + lat_span / 2.0, center.lng + lng_span / 2.0),
        )
    }

    fn move_to(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.pending_moves += 1;
    }
}

impl MapView for HeadlessMap {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn center(&self) -> LatLng {
        self.bounds.center()
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        let bounds = self.bounds_at(center, zoom);
        self.move_to(bounds);
    }

    fn fit_bounds(&mut self, target: Bounds, options: FitOptions) {
        self.fit_requests.push((target, options));

        // Padding is applied on both sides of each axis
        let pad = f64::from(options.padding_px);
        let usable_w = (f64::from(self.width_px) - 2.0 * pad).max(1.0);
        let usable_h = (f64::from(self.height_px) - 2.0 * pad).max(1.0);
        let lng_pad = target.lng_span() * pad / usable_w;
        let lat_pad = target.lat_span() * pad / usable_h;
        let padded = target.expand(lat_pad, lng_pad);

        // Never zoom in past the cap
        let capped = self.bounds_at(padded.center(), options.max_zoom);
        let lat_grow = ((capped.lat_span() - padded.lat_span()) / 2.0).max(0.0);
        let lng_grow = ((capped.lng_span() - padded.lng_span()) / 2.0).max(0.0);

        self.move_to(padded.expand(lat_grow, lng_grow));
    }

    fn has_marker(&self, listing_id: i64) -> bool {
        self.markers.contains(&listing_id)
    }

    fn attach_marker(&mut self, listing_id: i64) {
        self.markers.insert(listing_id);
    }

    fn detach_marker(&mut self, listing_id: i64) {
        self.markers.remove(&listing_id);
    }
}

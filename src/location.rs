use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context};

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;

/// A single (latitude, longitude) point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Always five decimals, `"lat, lng"`.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

impl FromStr for Coordinates {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("expected \"lat,lng\", got {s:?}"))?;
        let lat: f64 = lat.trim().parse().with_context(|| format!("bad latitude in {s:?}"))?;
        let lng: f64 = lng.trim().parse().with_context(|| format!("bad longitude in {s:?}"))?;
        Ok(Self { lat, lng })
    }
}

/// Holds at most one selected point. A later selection replaces the earlier one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationSelector {
    selected: Option<Coordinates>,
}

impl LocationSelector {
    pub fn on_point_selected(&mut self, lat: f64, lng: f64) {
        self.selected = Some(Coordinates::new(lat, lng));
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.selected
    }
}

/// Stand-in for a clickable map: a cursor over a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCursor {
    pub center: Coordinates,
    pub zoom: u8,
}

impl MapCursor {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Width of the viewport in degrees of longitude.
    pub fn span(&self) -> f64 {
        360.0 / f64::from(1u32 << self.zoom.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let half = self.span() / 2.0;
        [self.center.lng - half, self.center.lng + half]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let half = self.span() / 4.0;
        [self.center.lat - half, self.center.lat + half]
    }

    /// Point under a click, given as fractions of the viewport from its
    /// top-left corner (0.0..=1.0 on both axes).
    pub fn point_at(&self, x_frac: f64, y_frac: f64) -> Coordinates {
        let [left, right] = self.x_bounds();
        let [bottom, top] = self.y_bounds();
        Coordinates::new(
            top - y_frac.clamp(0.0, 1.0) * (top - bottom),
            left + x_frac.clamp(0.0, 1.0) * (right - left),
        )
    }

    /// Moves by a tenth of the viewport; latitude is clamped, longitude wraps.
    pub fn pan(&mut self, d_lat: i8, d_lng: i8) {
        let step = self.span() / 10.0;
        let lat = self.center.lat + f64::from(d_lat) * step;
        let mut lng = self.center.lng + f64::from(d_lng) * step;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        self.center = Coordinates::new(lat.clamp(-90.0, 90.0), lng);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.saturating_add(1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }
}

//! Longitude-sorted index over located stops.
//!
//! ## Two-Stage Filtering
//!
//! Proximity queries use a two-stage filtering approach:
//! 1. **Longitude window**: a contiguous run of the sorted order whose
//!    longitude-only distance to the query stop is within a bound
//! 2. **Haversine filter**: exact great-circle distance on the window
//!
//! The window is grown outward from the query position and stops at the first
//! stop past the bound, so a query costs the window size rather than a scan.

use geo::Point;

use crate::identifiers::StopIdentifier;
use crate::models::Stop;
use crate::spatial::queries::{longitude_bound_distance, window_bound};

#[derive(Clone, Debug)]
pub struct IndexedStop {
    /// Position of the stop in the source slice
    pub slot: usize,
    pub id: StopIdentifier,
    pub location: Point,
}

/// Located stops sorted by ascending longitude, ties by stop id.
#[derive(Clone, Debug, Default)]
pub struct LongitudeIndex {
    entries: Vec<IndexedStop>,
    max_abs_lat: f64,
}

impl LongitudeIndex {
    /// Index every stop that has a finite location; others are left out.
    pub fn build(stops: &[Stop]) -> Self {
        let mut entries: Vec<IndexedStop> = stops
            .iter()
            .enumerate()
            .filter_map(|(slot, stop)| {
                let location = stop.location?;
                if !(location.x().is_finite() && location.y().is_finite()) {
                    log::debug!("Stop {} has non-finite coordinates, not indexed", stop.id);
                    return None;
                }
                Some(IndexedStop {
                    slot,
                    id: stop.id.clone(),
                    location,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            a.location
                .x()
                .total_cmp(&b.location.x())
                .then_with(|| a.id.cmp(&b.id))
        });

        let max_abs_lat = entries
            .iter()
            .map(|e| e.location.y().abs())
            .fold(0.0, f64::max);

        Self {
            entries,
            max_abs_lat,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&IndexedStop> {
        self.entries.get(pos)
    }

    pub fn entries(&self) -> &[IndexedStop] {
        &self.entries
    }

    /// Largest absolute latitude among indexed stops.
    pub fn max_abs_lat(&self) -> f64 {
        self.max_abs_lat
    }

    /// Inclusive range of sorted positions that may hold stops within
    /// `radius_m` of the stop at `pos`. Always contains `pos` itself.
    pub fn window(&self, pos: usize, radius_m: f64) -> std::ops::RangeInclusive<usize> {
        let bound = window_bound(radius_m, self.max_abs_lat);
        let origin = self.entries[pos].location;
        let within = |other: usize| longitude_bound_distance(origin, self.entries[other].location) <= bound;

        let mut bottom = pos;
        while bottom > 0 && within(bottom - 1) {
            bottom -= 1;
        }

        let mut top = pos;
        while top + 1 < self.entries.len() && within(top + 1) {
            top += 1;
        }

        bottom..=top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(index: &LongitudeIndex) -> Vec<&str> {
        index.entries().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_longitude_then_id() {
        let stops = vec![
            Stop::at("c", "C", 47.0, 21.002),
            Stop::at("b", "B", 47.0, 21.000),
            Stop::at("a", "A", 47.1, 21.000),
            Stop::at("d", "D", 47.0, 20.999),
        ];
        let index = LongitudeIndex::build(&stops);

        assert_eq!(ids(&index), vec!["d", "a", "b", "c"]);
        assert_eq!(index.get(0).unwrap().slot, 3);
    }

    #[test]
    fn test_unlocated_stops_are_skipped() {
        let stops = vec![
            Stop::new("x", "No coordinates", None),
            Stop::at("y", "Y", 47.0, 21.0),
            Stop::at("z", "Z", f64::NAN, 21.0),
        ];
        let index = LongitudeIndex::build(&stops);

        assert_eq!(ids(&index), vec!["y"]);
    }

    #[test]
    fn test_window_is_contiguous_and_bounded() {
        // 0.001 degree of longitude at the equator is ~111 m
        let stops: Vec<Stop> = (0..10)
            .map(|i| Stop::at(format!("s{}", i), "S", 0.0, i as f64 * 0.001))
            .collect();
        let index = LongitudeIndex::build(&stops);

        assert_eq!(index.window(5, 150.0), 4..=6);
        assert_eq!(index.window(0, 150.0), 0..=1);
        assert_eq!(index.window(9, 250.0), 7..=9);
        assert_eq!(index.window(5, 10.0), 5..=5);
    }

    #[test]
    fn test_window_widens_with_latitude() {
        // Same longitudes as above, but at 60N stops are half as far apart
        let stops: Vec<Stop> = (0..10)
            .map(|i| Stop::at(format!("s{}", i), "S", 60.0, i as f64 * 0.001))
            .collect();
        let index = LongitudeIndex::build(&stops);

        let window = index.window(5, 150.0);
        assert!(*window.start() <= 3);
        assert!(*window.end() >= 7);
    }
}

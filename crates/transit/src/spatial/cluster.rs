//! Proximity clustering: merge stops within a radius into virtual stations.
//!
//! "Within radius" defines the edges of a proximity graph; each connected
//! component becomes one virtual station, a lone stop included. The relation
//! is not transitive, so components are grown with a worklist from every
//! admitted stop, recording each admission in a [`DisjointSet`].

use crate::identifiers::StopIdentifier;
use crate::models::{Result, Stop, StopMap, TransitError};
use crate::spatial::disjoint_set::DisjointSet;
use crate::spatial::index::LongitudeIndex;
use crate::spatial::queries::distance;

/// Outcome of one clustering pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterReport {
    /// Stops with usable coordinates
    pub located_stops: usize,
    /// Clusters, singletons included
    pub groups: usize,
    /// Stops given a virtual parent
    pub merged_stops: usize,
    pub stations_created: usize,
    pub stations_reused: usize,
}

/// Groups stops by geographic closeness.
#[derive(Clone, Copy, Debug)]
pub struct ProximityClusterer {
    radius_m: f64,
}

impl ProximityClusterer {
    pub fn new(radius_m: f64) -> Result<Self> {
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(TransitError::InvalidConfig(format!(
                "merge radius must be a non-negative number of meters, got {}",
                radius_m
            )));
        }
        Ok(Self { radius_m })
    }

    pub fn radius(&self) -> f64 {
        self.radius_m
    }

    /// Clusters of located stops, as slots into `stops`.
    ///
    /// Every located stop belongs to exactly one cluster: the connected
    /// component of the proximity graph containing it. A stop with no
    /// neighbor within radius forms a cluster on its own. Clusters come in
    /// longitude order of their seed; members are sorted by stop id.
    pub fn find_groups(&self, stops: &[Stop]) -> Vec<Vec<usize>> {
        let index = LongitudeIndex::build(stops);
        let entries = index.entries();

        let mut set = DisjointSet::new(entries.len());
        let mut processed = vec![false; entries.len()];
        let mut worklist = Vec::new();

        for seed in 0..entries.len() {
            if processed[seed] {
                continue;
            }
            processed[seed] = true;
            worklist.push(seed);

            while let Some(pos) = worklist.pop() {
                let origin = entries[pos].location;
                for candidate in index.window(pos, self.radius_m) {
                    if processed[candidate] {
                        continue;
                    }
                    if distance(origin, entries[candidate].location) <= self.radius_m {
                        processed[candidate] = true;
                        set.union(seed, candidate);
                        worklist.push(candidate);
                    }
                }
            }
        }

        // Every member of a cluster sits after its seed, so ordering by
        // smallest position is seed order
        set.groups()
            .into_iter()
            .map(|group| {
                let mut slots: Vec<usize> = group.into_iter().map(|pos| entries[pos].slot).collect();
                slots.sort_by(|&a, &b| stops[a].id.cmp(&stops[b].id));
                slots
            })
            .collect()
    }

    /// Give every cluster a shared virtual parent.
    ///
    /// Radius 0 leaves the map untouched. Unlocated stops are never assigned.
    pub fn cluster(&self, stops: &mut StopMap) -> ClusterReport {
        let mut report = ClusterReport {
            located_stops: stops.iter().filter(|s| s.location.is_some()).count(),
            ..Default::default()
        };

        if self.radius_m == 0.0 {
            return report;
        }

        let groups: Vec<Vec<StopIdentifier>> = {
            let slice = stops.as_slice();
            self.find_groups(slice)
                .into_iter()
                .map(|group| group.into_iter().map(|slot| slice[slot].id.clone()).collect())
                .collect()
        };

        for members in groups {
            // First member (by id) already under a virtual station keeps it
            let reused = members.iter().find_map(|id| {
                stops
                    .get(id)
                    .and_then(|s| s.parent.clone())
                    .filter(|parent| stops.is_virtual_station(parent))
            });

            let parent = match reused {
                Some(parent) => {
                    report.stations_reused += 1;
                    parent
                }
                None => {
                    report.stations_created += 1;
                    stops.add_virtual_station()
                }
            };

            log::trace!("{} stops merged into {}", members.len(), parent);

            for id in &members {
                stops.set_parent(id, parent.clone());
            }
            report.groups += 1;
            report.merged_stops += members.len();
        }

        log::debug!(
            "Radius {} m: {} of {} located stops merged into {} groups",
            self.radius_m,
            report.merged_stops,
            report.located_stops,
            report.groups
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StopIdentifier {
        StopIdentifier::new(s)
    }

    fn parent_of<'a>(map: &'a StopMap, id: &str) -> Option<&'a str> {
        map.get(&sid(id))
            .and_then(|s| s.parent.as_ref())
            .map(StopIdentifier::as_str)
    }

    // 0.0001 degree of latitude is ~11.1 m
    fn stop_north_of(id: &str, lat_steps: f64) -> Stop {
        Stop::at(id, id.to_uppercase(), 47.5 + lat_steps * 0.0001, 21.6)
    }

    #[test]
    fn test_rejects_invalid_radius() {
        assert!(ProximityClusterer::new(-1.0).is_err());
        assert!(ProximityClusterer::new(f64::NAN).is_err());
        assert!(ProximityClusterer::new(f64::INFINITY).is_err());
        assert!(ProximityClusterer::new(0.0).is_ok());
    }

    #[test]
    fn test_close_pair_merges() {
        let mut map = StopMap::from_stops(vec![stop_north_of("a", 0.0), stop_north_of("b", 0.9)]);

        let report = ProximityClusterer::new(150.0).unwrap().cluster(&mut map);

        assert_eq!(report.groups, 1);
        assert_eq!(report.stations_created, 1);
        assert_eq!(parent_of(&map, "a"), Some("Virt1"));
        assert_eq!(parent_of(&map, "b"), Some("Virt1"));
        assert_eq!(map.top_level_count(), 1);

        let virt = map.get(&sid("Virt1")).unwrap();
        assert_eq!(&*virt.name, "VirtualStation1");
        assert_eq!(virt.int_id, 2);
    }

    #[test]
    fn test_distant_pair_stays_apart() {
        // ~500 m apart
        let mut map = StopMap::from_stops(vec![stop_north_of("a", 0.0), stop_north_of("b", 45.0)]);

        let report = ProximityClusterer::new(150.0).unwrap().cluster(&mut map);

        assert_eq!(report.groups, 2);
        assert_eq!(report.stations_created, 2);
        assert_eq!(parent_of(&map, "a"), Some("Virt1"));
        assert_eq!(parent_of(&map, "b"), Some("Virt2"));
        assert_eq!(map.len(), 4);
        assert_eq!(map.top_level_count(), 2);
    }

    #[test]
    fn test_radius_zero_is_noop() {
        let mut map = StopMap::from_stops(vec![
            Stop::at("a", "A", 47.5, 21.6),
            Stop::at("b", "B", 47.5, 21.6),
        ]);

        let report = ProximityClusterer::new(0.0).unwrap().cluster(&mut map);

        assert_eq!(report.groups, 0);
        assert_eq!(report.located_stops, 2);
        assert_eq!(map.len(), 2);
        assert!(map.iter().all(|s| !s.has_parent()));
    }

    #[test]
    fn test_chain_merges_transitively() {
        // a-b and b-c are ~100 m apart, a-c ~200 m
        let mut map = StopMap::from_stops(vec![
            stop_north_of("a", 0.0),
            stop_north_of("b", 9.0),
            stop_north_of("c", 18.0),
            stop_north_of("far", 100.0),
        ]);

        let report = ProximityClusterer::new(150.0).unwrap().cluster(&mut map);

        assert_eq!(report.groups, 2);
        assert_eq!(report.merged_stops, 4);
        assert_eq!(parent_of(&map, "a"), parent_of(&map, "c"));
        assert_eq!(parent_of(&map, "b"), Some("Virt1"));
        assert_eq!(parent_of(&map, "far"), Some("Virt2"));
        assert_eq!(map.top_level_count(), 2);
    }

    #[test]
    fn test_closure_is_order_independent() {
        // Seed "m" sits in the middle; the ends only reach it through "l" and "r"
        let stops = vec![
            Stop::at("l2", "L2", 0.0, 0.0000),
            Stop::at("l1", "L1", 0.0, 0.0010),
            Stop::at("m", "M", 0.0, 0.0020),
            Stop::at("r1", "R1", 0.0, 0.0030),
            Stop::at("r2", "R2", 0.0, 0.0040),
        ];
        let clusterer = ProximityClusterer::new(120.0).unwrap();

        let groups = clusterer.find_groups(&stops);
        assert_eq!(groups, vec![vec![1, 0, 2, 3, 4]]);

        let mut reversed = stops.clone();
        reversed.reverse();
        assert_eq!(clusterer.find_groups(&reversed).len(), 1);
    }

    #[test]
    fn test_separate_components_get_separate_parents() {
        let mut map = StopMap::from_stops(vec![
            Stop::at("w1", "W1", 0.0, 10.0000),
            Stop::at("w2", "W2", 0.0, 10.0005),
            Stop::at("e1", "E1", 0.0, 11.0000),
            Stop::at("e2", "E2", 0.0, 11.0005),
        ]);

        ProximityClusterer::new(100.0).unwrap().cluster(&mut map);

        // Components are numbered in longitude order
        assert_eq!(parent_of(&map, "w1"), Some("Virt1"));
        assert_eq!(parent_of(&map, "w2"), Some("Virt1"));
        assert_eq!(parent_of(&map, "e1"), Some("Virt2"));
        assert_eq!(parent_of(&map, "e2"), Some("Virt2"));
    }

    #[test]
    fn test_real_parent_is_overridden() {
        let mut map = StopMap::from_stops(vec![
            Stop::at("station", "Station", 47.5, 21.6).with_station(true),
            stop_north_of("platform", 0.5).with_parent("station"),
        ]);

        ProximityClusterer::new(50.0).unwrap().cluster(&mut map);

        assert_eq!(parent_of(&map, "station"), Some("Virt1"));
        assert_eq!(parent_of(&map, "platform"), Some("Virt1"));
    }

    #[test]
    fn test_lone_stop_gets_own_virtual_station() {
        let mut map = StopMap::from_stops(vec![
            Stop::new("station", "Station", None).with_station(true),
            stop_north_of("platform", 0.0).with_parent("station"),
        ]);

        let report = ProximityClusterer::new(150.0).unwrap().cluster(&mut map);

        assert_eq!(report.groups, 1);
        assert_eq!(report.stations_created, 1);
        assert_eq!(parent_of(&map, "platform"), Some("Virt1"));
        assert_eq!(parent_of(&map, "station"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_shared_real_parent_does_not_join_clusters() {
        // "north" and "south" share a station but are ~1 km apart; only
        // "south" has a close neighbor
        let mut map = StopMap::from_stops(vec![
            Stop::new("station", "Station", None).with_station(true),
            stop_north_of("north", 90.0).with_parent("station"),
            stop_north_of("south", 0.0).with_parent("station"),
            stop_north_of("kiosk", 0.5),
        ]);

        let report = ProximityClusterer::new(150.0).unwrap().cluster(&mut map);

        assert_eq!(report.groups, 2);
        assert_eq!(parent_of(&map, "kiosk"), Some("Virt1"));
        assert_eq!(parent_of(&map, "south"), Some("Virt1"));
        assert_eq!(parent_of(&map, "north"), Some("Virt2"));
        // The emptied station is still a top-level node
        assert_eq!(parent_of(&map, "station"), None);
        assert_eq!(map.top_level_count(), 3);
    }

    #[test]
    fn test_existing_virtual_parent_is_reused() {
        let mut map = StopMap::from_stops(vec![stop_north_of("a", 0.0), stop_north_of("b", 1.0)]);
        let existing = map.add_virtual_station();
        map.set_parent(&sid("b"), existing.clone());

        let report = ProximityClusterer::new(150.0).unwrap().cluster(&mut map);

        assert_eq!(report.stations_reused, 1);
        assert_eq!(report.stations_created, 0);
        assert_eq!(parent_of(&map, "a"), Some(existing.as_str()));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_unlocated_stop_never_merges() {
        let mut map = StopMap::from_stops(vec![
            stop_north_of("a", 0.0),
            Stop::new("lost", "Lost", None),
            stop_north_of("b", 1.0),
        ]);

        let report = ProximityClusterer::new(1_000.0).unwrap().cluster(&mut map);

        assert_eq!(report.located_stops, 2);
        assert_eq!(parent_of(&map, "lost"), None);
        assert_eq!(parent_of(&map, "a"), Some("Virt1"));
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let stops: Vec<Stop> = (0..40)
            .map(|i| Stop::at(format!("s{:02}", i), "S", 47.5 + (i % 7) as f64 * 0.0004, 21.6 + (i / 7) as f64 * 0.0009))
            .collect();

        let run = || {
            let mut map = StopMap::from_stops(stops.clone());
            ProximityClusterer::new(60.0).unwrap().cluster(&mut map);
            map.iter()
                .map(|s| (s.id.to_string(), s.parent.as_ref().map(|p| p.to_string())))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }
}

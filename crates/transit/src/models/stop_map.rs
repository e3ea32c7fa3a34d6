//! Insertion-ordered stop mapping for a single load.
//!
//! Iteration order is load order followed by virtual stations in creation
//! order, so every order-sensitive output derived from it is reproducible.

use std::collections::HashMap;

use crate::identifiers::*;
use crate::models::types::*;

/// Mapping id → [`Stop`] that owns integer id assignment.
#[derive(Clone, Debug, Default)]
pub struct StopMap {
    stops: Vec<Stop>,
    index: HashMap<StopIdentifier, usize>,
    next_int_id: u32,
    virtual_count: u32,
}

impl StopMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from stops in load order, keeping the first of any duplicate id.
    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        let mut map = Self::new();
        for stop in stops {
            if let Err(err) = map.insert(stop) {
                log::debug!("Skipping stop: {}", err);
            }
        }
        map
    }

    /// Insert a stop, assigning the next integer id.
    ///
    /// Returns the assigned integer id, or `InvalidData` if the id is taken.
    pub fn insert(&mut self, stop: Stop) -> Result<u32> {
        if self.index.contains_key(&stop.id) {
            return Err(TransitError::InvalidData(format!(
                "duplicate stop id {}",
                stop.id
            )));
        }

        Ok(self.push(stop))
    }

    /// Append a stop whose id is known to be free.
    fn push(&mut self, mut stop: Stop) -> u32 {
        let int_id = self.next_int_id;
        stop.int_id = int_id;
        self.next_int_id += 1;

        self.index.insert(stop.id.clone(), self.stops.len());
        self.stops.push(stop);
        int_id
    }

    /// Create a fresh virtual station and return its id.
    ///
    /// Ids are `Virt<n>` with names `VirtualStation<n>`; the counter skips
    /// past any id already present in the map.
    pub fn add_virtual_station(&mut self) -> StopIdentifier {
        let (id, name) = loop {
            self.virtual_count += 1;
            let id = StopIdentifier::new(format!("Virt{}", self.virtual_count));
            if !self.index.contains_key(&id) {
                break (id, format!("VirtualStation{}", self.virtual_count));
            }
        };

        let mut station = Stop::new(id.clone(), name, None).with_station(true);
        station.is_virtual = true;

        self.push(station);
        id
    }

    pub fn get(&self, id: &StopIdentifier) -> Option<&Stop> {
        self.index.get(id).map(|&i| &self.stops[i])
    }

    pub fn get_mut(&mut self, id: &StopIdentifier) -> Option<&mut Stop> {
        self.index.get(id).map(|&i| &mut self.stops[i])
    }

    pub fn contains(&self, id: &StopIdentifier) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Stops by load position; positions are stable for the map's lifetime.
    pub(crate) fn as_slice(&self) -> &[Stop] {
        &self.stops
    }

    /// Point `id` at `parent`. Returns false if `id` is unknown.
    pub fn set_parent(&mut self, id: &StopIdentifier, parent: StopIdentifier) -> bool {
        match self.get_mut(id) {
            Some(stop) => {
                stop.parent = Some(parent);
                true
            }
            None => false,
        }
    }

    /// Whether `id` names a virtual station in this map.
    pub fn is_virtual_station(&self, id: &StopIdentifier) -> bool {
        self.get(id).is_some_and(|s| s.is_virtual)
    }

    /// Follow parent references from `id` to the stop that has none.
    ///
    /// Returns `None` if `id` is unknown, a parent along the way is unknown,
    /// or the parent chain loops.
    pub fn top_level(&self, id: &StopIdentifier) -> Option<&StopIdentifier> {
        let mut current = self.get(id)?;
        for _ in 0..self.stops.len() {
            match &current.parent {
                None => return Some(&current.id),
                Some(parent) => current = self.get(parent)?,
            }
        }
        None
    }

    /// Number of stops without a parent reference.
    pub fn top_level_count(&self) -> usize {
        self.stops.iter().filter(|s| !s.has_parent()).count()
    }

    /// Number of directed edges leaving top-level stops.
    pub fn edge_count(&self) -> usize {
        self.stops
            .iter()
            .filter(|s| !s.has_parent())
            .map(|s| s.neighbors.len())
            .sum()
    }

    /// Drop parent references that do not resolve to a stop in this map.
    ///
    /// Returns how many were cleared.
    pub fn clear_dangling_parents(&mut self) -> usize {
        let dangling: Vec<usize> = self
            .stops
            .iter()
            .enumerate()
            .filter(|(_, s)| s.parent.as_ref().is_some_and(|p| !self.index.contains_key(p)))
            .map(|(i, _)| i)
            .collect();

        for &i in &dangling {
            let stop = &mut self.stops[i];
            log::debug!(
                "Stop {} references unknown parent {}, treating as top-level",
                stop.id,
                stop.parent.as_ref().map(StopIdentifier::as_str).unwrap_or_default()
            );
            stop.parent = None;
        }
        dangling.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StopIdentifier {
        StopIdentifier::new(s)
    }

    #[test]
    fn test_int_ids_follow_insertion_order() {
        let mut map = StopMap::new();
        assert_eq!(map.insert(Stop::at("b", "B", 0.0, 0.0)).unwrap(), 0);
        assert_eq!(map.insert(Stop::at("a", "A", 0.0, 0.0)).unwrap(), 1);

        let virt = map.add_virtual_station();
        let station = map.get(&virt).unwrap();
        assert_eq!(station.int_id, 2);
        assert!(station.is_virtual);
        assert!(station.is_station);
        assert_eq!(station.location, None);

        let order: Vec<&str> = map.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "Virt1"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut map = StopMap::new();
        map.insert(Stop::at("a", "First", 0.0, 0.0)).unwrap();
        assert!(matches!(
            map.insert(Stop::at("a", "Second", 1.0, 1.0)),
            Err(TransitError::InvalidData(_))
        ));

        assert_eq!(map.len(), 1);
        assert_eq!(&*map.get(&sid("a")).unwrap().name, "First");
    }

    #[test]
    fn test_virtual_names_skip_existing_ids() {
        let mut map = StopMap::from_stops(vec![Stop::at("Virt1", "Real stop", 0.0, 0.0)]);

        let virt = map.add_virtual_station();
        assert_eq!(virt.as_str(), "Virt2");
        assert_eq!(&*map.get(&virt).unwrap().name, "VirtualStation2");
        assert_eq!(map.len(), 2);

        // The stored real stop is untouched
        assert_eq!(&*map.get(&sid("Virt1")).unwrap().name, "Real stop");
        assert!(!map.is_virtual_station(&sid("Virt1")));
    }

    #[test]
    fn test_top_level_follows_chain() {
        let map = StopMap::from_stops(vec![
            Stop::at("platform", "Platform", 0.0, 0.0).with_parent("station"),
            Stop::at("station", "Station", 0.0, 0.0).with_parent("complex"),
            Stop::at("complex", "Complex", 0.0, 0.0),
        ]);

        assert_eq!(map.top_level(&sid("platform")), Some(&sid("complex")));
        assert_eq!(map.top_level(&sid("complex")), Some(&sid("complex")));
        assert_eq!(map.top_level(&sid("missing")), None);
        assert_eq!(map.top_level_count(), 1);
    }

    #[test]
    fn test_top_level_detects_cycles() {
        let map = StopMap::from_stops(vec![
            Stop::at("a", "A", 0.0, 0.0).with_parent("b"),
            Stop::at("b", "B", 0.0, 0.0).with_parent("a"),
        ]);

        assert_eq!(map.top_level(&sid("a")), None);
    }

    #[test]
    fn test_clear_dangling_parents() {
        let mut map = StopMap::from_stops(vec![
            Stop::at("a", "A", 0.0, 0.0).with_parent("gone"),
            Stop::at("b", "B", 0.0, 0.0).with_parent("c"),
            Stop::at("c", "C", 0.0, 0.0),
        ]);

        assert_eq!(map.clear_dangling_parents(), 1);
        assert!(!map.get(&sid("a")).unwrap().has_parent());
        assert!(map.get(&sid("b")).unwrap().has_parent());
        assert_eq!(map.top_level_count(), 2);
    }
}

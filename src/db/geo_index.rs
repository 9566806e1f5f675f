// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! H3 cell index over driver locations.
//!
//! Drivers are bucketed by their resolution-7 cell. A radius query expands
//! the pickup cell into a grid disk wide enough to cover the radius and
//! returns every driver bucketed there. The result is a superset; callers
//! filter by exact distance against the authoritative driver record.

use crate::models::GeoPoint;
use dashmap::DashMap;
use h3o::{CellIndex, LatLng, Resolution};
use std::collections::HashSet;
use uuid::Uuid;

const INDEX_RESOLUTION: Resolution = Resolution::Seven;

/// Lower bound on the spacing between neighbouring resolution-7 cell
/// centers, in km. Used to size the grid disk for a radius query.
const MIN_RING_SPACING_KM: f64 = 1.0;

#[derive(Debug, Default)]
pub struct DriverGeoIndex {
    drivers_by_cell: DashMap<CellIndex, HashSet<Uuid>>,
    cell_by_driver: DashMap<Uuid, CellIndex>,
}

impl DriverGeoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_for(point: &GeoPoint) -> Option<CellIndex> {
        LatLng::new(point.lat, point.lng)
            .ok()
            .map(|ll| ll.to_cell(INDEX_RESOLUTION))
    }

    /// Move a driver to the cell containing `point`.
    ///
    /// Returns false (and leaves the index unchanged) for invalid coordinates.
    pub fn upsert(&self, driver_id: Uuid, point: &GeoPoint) -> bool {
        let Some(cell) = Self::cell_for(point) else {
            return false;
        };

        let previous = self.cell_by_driver.insert(driver_id, cell);
        match previous {
            Some(old) if old == cell => {}
            Some(old) => {
                self.remove_from_cell(old, driver_id);
                self.drivers_by_cell.entry(cell).or_default().insert(driver_id);
            }
            None => {
                self.drivers_by_cell.entry(cell).or_default().insert(driver_id);
            }
        }
        true
    }

    fn remove_from_cell(&self, cell: CellIndex, driver_id: Uuid) {
        if let Some(mut drivers) = self.drivers_by_cell.get_mut(&cell) {
            drivers.remove(&driver_id);
        }
        self.drivers_by_cell.remove_if(&cell, |_, drivers| drivers.is_empty());
    }

    /// Driver ids bucketed within (at least) `radius_km` of `center`.
    pub fn candidates_within(&self, center: &GeoPoint, radius_km: f64) -> Vec<Uuid> {
        let Some(origin) = Self::cell_for(center) else {
            return Vec::new();
        };
        let k = (radius_km / MIN_RING_SPACING_KM).ceil().max(0.0) as u32 + 1;

        origin
            .grid_disk::<Vec<_>>(k)
            .into_iter()
            .filter_map(|cell| self.drivers_by_cell.get(&cell))
            .flat_map(|drivers| drivers.iter().copied().collect::<Vec<_>>())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cell_by_driver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_by_driver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nairobi CBD
    const CENTER: GeoPoint = GeoPoint {
        lat: -1.2864,
        lng: 36.8172,
    };

    /// Point `km` kilometres north of CENTER.
    fn north_of_center(km: f64) -> GeoPoint {
        GeoPoint::new(CENTER.lat + km / 111.195, CENTER.lng)
    }

    #[test]
    fn test_upsert_and_query() {
        let index = DriverGeoIndex::new();
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        index.upsert(near, &north_of_center(2.0));
        index.upsert(far, &north_of_center(40.0));

        let found = index.candidates_within(&CENTER, 5.0);
        assert!(found.contains(&near));
        assert!(!found.contains(&far));
    }

    #[test]
    fn test_query_covers_radius_edge() {
        let index = DriverGeoIndex::new();
        let edge = Uuid::new_v4();
        index.upsert(edge, &north_of_center(4.9));

        assert!(index.candidates_within(&CENTER, 5.0).contains(&edge));
    }

    #[test]
    fn test_move_between_cells() {
        let index = DriverGeoIndex::new();
        let driver = Uuid::new_v4();
        index.upsert(driver, &north_of_center(40.0));
        index.upsert(driver, &north_of_center(1.0));

        let found = index.candidates_within(&CENTER, 5.0);
        assert_eq!(found, vec![driver]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_invalid_point_ignored() {
        let index = DriverGeoIndex::new();
        assert!(!index.upsert(Uuid::new_v4(), &GeoPoint::new(f64::NAN, 0.0)));
        assert!(index.is_empty());
    }
}

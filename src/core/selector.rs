use crate::core::distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
use crate::models::{Coordinate, Place};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from proximity selection
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("invalid coordinate: lat={latitude}, lon={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("no place named '{0}'")]
    NotFound(String),
}

/// A place chosen by the selector, with its distance to the reference point
#[derive(Debug, Clone)]
pub struct SelectedPlace {
    pub place: Place,
    pub distance_km: f64,
}

/// Result of a selection pass
#[derive(Debug)]
pub struct SelectionResult {
    pub places: Vec<SelectedPlace>,
    pub total_catalog: usize,
}

/// Proximity selector: picks the places nearest a reference coordinate
/// and merges them additively with a previous selection.
///
/// "Additive" means a previously selected id that is still a valid catalog
/// entry is never dropped; moving the reference point only discovers new
/// places. Ids that have vanished from the catalog are dropped.
#[derive(Debug, Clone)]
pub struct Selector {
    radius_km: f64,
    max_results: usize,
}

impl Selector {
    pub fn new(radius_km: f64, max_results: usize) -> Self {
        Self { radius_km, max_results }
    }

    /// Select places near `reference`, merged with `previous_ids`.
    ///
    /// Ordering is deterministic: distance ascending, ties broken by id.
    /// Calling twice with identical inputs yields identical output, so a
    /// second pass over a stable catalog is a no-op.
    pub fn select(
        &self,
        reference: Coordinate,
        catalog: &HashMap<String, Place>,
        previous_ids: &[String],
    ) -> Result<SelectionResult, SelectionError> {
        if !reference.is_valid() {
            return Err(SelectionError::InvalidCoordinate {
                latitude: reference.latitude,
                longitude: reference.longitude,
            });
        }

        let total_catalog = catalog.len();
        let bbox = calculate_bounding_box(reference, self.radius_km);

        // Stage 1: bounding box pre-filter, then exact haversine cut
        let mut nearby: Vec<SelectedPlace> = catalog
            .values()
            .filter(|place| is_within_bounding_box(place.coordinate(), &bbox))
            .filter_map(|place| {
                let distance_km = haversine_distance(reference, place.coordinate());
                if distance_km <= self.radius_km {
                    Some(SelectedPlace {
                        place: place.clone(),
                        distance_km,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Nearest first when capping, ties broken by id for stable output
        sort_by_distance(&mut nearby);
        nearby.truncate(self.max_results);

        // Stage 2: additive merge with the carried-over selection
        let mut selected: HashMap<String, SelectedPlace> = previous_ids
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|place| {
                let distance_km = haversine_distance(reference, place.coordinate());
                (
                    place.id.clone(),
                    SelectedPlace {
                        place: place.clone(),
                        distance_km,
                    },
                )
            })
            .collect();

        for entry in nearby {
            selected.entry(entry.place.id.clone()).or_insert(entry);
        }

        let mut places: Vec<SelectedPlace> = selected.into_values().collect();
        sort_by_distance(&mut places);

        Ok(SelectionResult {
            places,
            total_catalog,
        })
    }

    /// Resolve a place name to its catalog entry, case-insensitively.
    ///
    /// When several places share a name, the lowest id wins so resolution
    /// is deterministic.
    pub fn resolve_by_name<'a>(
        &self,
        name: &str,
        catalog: &'a HashMap<String, Place>,
    ) -> Result<&'a Place, SelectionError> {
        let needle = name.trim().to_lowercase();

        catalog
            .values()
            .filter(|place| place.name.to_lowercase() == needle)
            .min_by(|a, b| a.id.cmp(&b.id))
            .ok_or_else(|| SelectionError::NotFound(name.to_string()))
    }
}

fn sort_by_distance(places: &mut [SelectedPlace]) {
    places.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.place.id.cmp(&b.place.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_place(id: &str, name: &str, lat: f64, lon: f64) -> Place {
        Place {
            id: id.to_string(),
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            category_tags: vec!["restaurant".to_string()],
            rating: 0.0,
            rating_count: 0,
            updated_at: None,
        }
    }

    fn make_catalog(places: Vec<Place>) -> HashMap<String, Place> {
        places.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    #[test]
    fn test_select_nearby_only() {
        let selector = Selector::new(5.0, 50);
        let center = Coordinate::new(34.0689, -118.4452);

        let catalog = make_catalog(vec![
            make_place("a", "Close One", 34.07, -118.44),
            make_place("b", "Far One", 34.5, -118.0), // ~60km away
        ]);

        let result = selector.select(center, &catalog, &[]).unwrap();

        assert_eq!(result.places.len(), 1);
        assert_eq!(result.places[0].place.id, "a");
        assert_eq!(result.total_catalog, 2);
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let selector = Selector::new(5.0, 50);
        let catalog = make_catalog(vec![make_place("a", "Close One", 34.07, -118.44)]);

        let err = selector
            .select(Coordinate::new(f64::NAN, 0.0), &catalog, &[])
            .unwrap_err();

        assert!(matches!(err, SelectionError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_additive_merge_keeps_previous() {
        let selector = Selector::new(5.0, 50);
        let catalog = make_catalog(vec![
            make_place("a", "Westwood Cafe", 34.07, -118.44),
            make_place("b", "Downtown Bar", 34.05, -118.25),
        ]);

        // First pass near a
        let first = selector
            .select(Coordinate::new(34.0689, -118.4452), &catalog, &[])
            .unwrap();
        assert_eq!(first.places.len(), 1);
        let ids: Vec<String> = first.places.iter().map(|s| s.place.id.clone()).collect();

        // Second pass near b, carrying the first selection
        let second = selector
            .select(Coordinate::new(34.05, -118.25), &catalog, &ids)
            .unwrap();
        let ids: Vec<String> = second.places.iter().map(|s| s.place.id.clone()).collect();

        assert!(ids.contains(&"a".to_string()), "previous selection must survive");
        assert!(ids.contains(&"b".to_string()));
    }

    #[test]
    fn test_previous_id_gone_from_catalog_dropped() {
        let selector = Selector::new(5.0, 50);
        let catalog = make_catalog(vec![make_place("a", "Still Here", 34.07, -118.44)]);

        let result = selector
            .select(
                Coordinate::new(34.0689, -118.4452),
                &catalog,
                &["zombie".to_string()],
            )
            .unwrap();

        let ids: Vec<&str> = result.places.iter().map(|s| s.place.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_select_idempotent_on_stable_catalog() {
        let selector = Selector::new(5.0, 50);
        let center = Coordinate::new(34.0689, -118.4452);
        let catalog = make_catalog(vec![
            make_place("a", "One", 34.07, -118.44),
            make_place("b", "Two", 34.068, -118.446),
            make_place("c", "Three", 34.066, -118.443),
        ]);

        let first = selector.select(center, &catalog, &[]).unwrap();
        let prev: Vec<String> = first.places.iter().map(|s| s.place.id.clone()).collect();
        let second = selector.select(center, &catalog, &prev).unwrap();

        let first_ids: Vec<&str> = first.places.iter().map(|s| s.place.id.as_str()).collect();
        let second_ids: Vec<&str> = second.places.iter().map(|s| s.place.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_equidistant_ties_break_by_id() {
        let selector = Selector::new(5.0, 50);
        let center = Coordinate::new(34.0, -118.0);

        // Same coordinates, so identical distances
        let catalog = make_catalog(vec![
            make_place("b", "Twin B", 34.01, -118.0),
            make_place("a", "Twin A", 34.01, -118.0),
        ]);

        let result = selector.select(center, &catalog, &[]).unwrap();
        let ids: Vec<&str> = result.places.iter().map(|s| s.place.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_max_results_cap_takes_nearest() {
        let selector = Selector::new(50.0, 2);
        let center = Coordinate::new(34.0, -118.0);
        let catalog = make_catalog(vec![
            make_place("near", "Near", 34.001, -118.0),
            make_place("mid", "Mid", 34.05, -118.0),
            make_place("edge", "Edge", 34.2, -118.0),
        ]);

        let result = selector.select(center, &catalog, &[]).unwrap();
        let ids: Vec<&str> = result.places.iter().map(|s| s.place.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
    }

    #[test]
    fn test_resolve_by_name() {
        let selector = Selector::new(5.0, 50);
        let catalog = make_catalog(vec![
            make_place("a", "Powell Library", 34.0716, -118.4422),
            make_place("b", "Epicuria", 34.0697, -118.4532),
        ]);

        let place = selector.resolve_by_name("powell library", &catalog).unwrap();
        assert_eq!(place.id, "a");

        let err = selector.resolve_by_name("Nowhere", &catalog).unwrap_err();
        assert!(matches!(err, SelectionError::NotFound(_)));
    }
}

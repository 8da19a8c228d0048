use std::collections::HashMap;

use tracing::debug;

use super::types::{Area, Conflict, ConflictReason, RequestMap, UnitKey};

/// Lists every request whose target is not seated in the requester's area.
///
/// Sharing an area is the only guarantee, so a different table in the same
/// area is not a conflict. Parts of a split unit are checked on their own.
pub fn generate_conflict_report(areas: &[Area], requests: &RequestMap) -> Vec<Conflict> {
    let mut location: HashMap<&UnitKey, (usize, usize)> = HashMap::new();
    for (area_idx, area) in areas.iter().enumerate() {
        for (table_idx, table) in area.tables().iter().enumerate() {
            for unit in table.units() {
                location.insert(&unit.key, (area_idx, table_idx));
            }
        }
    }

    let mut conflicts = Vec::new();
    for request in requests.iter() {
        let requester_area = location.get(&request.requester.key).map(|&(area, _)| area);

        for target in &request.targets {
            let reason = match location.get(&target.key) {
                None => ConflictReason::NotFound,
                Some(&(area, _)) if Some(area) != requester_area => ConflictReason::DifferentArea,
                Some(_) => continue,
            };
            debug!(
                requester = %request.requester.key,
                requested = %target.key,
                %reason,
                "unmet request"
            );
            conflicts.push(Conflict {
                requester: request.requester.clone(),
                requested: target.clone(),
                reason,
            });
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::tables::place_cluster_into_area;
    use crate::seating::testing::family;

    fn area_of(units: &[crate::seating::Unit]) -> Area {
        let mut area = Area::new(10);
        place_cluster_into_area(units, &mut area, &RequestMap::new());
        area
    }

    #[test]
    fn test_conflict_report_detects_unmet_requests() {
        let smith = family("Smith", 4);
        let jones = family("Jones", 4);
        let mut requests = RequestMap::new();
        requests.insert(smith.clone(), vec![jones.clone()]);
        requests.insert(jones.clone(), vec![]);

        let areas = vec![area_of(&[smith.clone()]), area_of(&[jones.clone()])];
        let conflicts = generate_conflict_report(&areas, &requests);

        assert_eq!(
            conflicts,
            vec![Conflict {
                requester: smith,
                requested: jones,
                reason: ConflictReason::DifferentArea,
            }]
        );
    }

    #[test]
    fn test_missing_target_reported() {
        let smith = family("Smith", 4);
        let gone = family("Gone", 2);
        let mut requests = RequestMap::new();
        requests.insert(smith.clone(), vec![gone.clone()]);

        let conflicts = generate_conflict_report(&[area_of(&[smith])], &requests);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].requested, gone);
        assert_eq!(conflicts[0].reason, ConflictReason::NotFound);
        assert_eq!(conflicts[0].reason.to_string(), "Requested family not found");
    }

    #[test]
    fn test_same_area_different_table_is_fine() {
        let a = family("A", 10);
        let b = family("B", 10);
        let mut requests = RequestMap::new();
        requests.insert(a.clone(), vec![b.clone()]);

        let area = area_of(&[a, b]);
        assert_eq!(area.tables().len(), 2);
        assert!(generate_conflict_report(&[area], &requests).is_empty());
    }

    #[test]
    fn test_conflicts_follow_request_order() {
        let a = family("A", 1);
        let b = family("B", 1);
        let c = family("C", 1);
        let mut requests = RequestMap::new();
        requests.insert(b.clone(), vec![c.clone(), a.clone()]);
        requests.insert(a.clone(), vec![c.clone()]);

        let areas = vec![area_of(&[a.clone()]), area_of(&[b.clone()]), area_of(&[c.clone()])];
        let pairs: Vec<(String, String)> = generate_conflict_report(&areas, &requests)
            .into_iter()
            .map(|c| (c.requester.last_name, c.requested.last_name))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("B".to_string(), "C".to_string()),
                ("B".to_string(), "A".to_string()),
                ("A".to_string(), "C".to_string()),
            ]
        );
    }
}

use tracing::debug;

use super::types::{Area, Unit};

/// Picks the area a cluster goes into, opening a new one when needed.
///
/// An area that already has room for the whole cluster wins, tightest fit
/// first. Failing that, an area that can absorb the cluster with strictly
/// fewer added tables than a fresh area would need is reused (fewest added
/// tables, then lowest index). Otherwise a new area is appended.
///
/// Returns the index of the chosen area in `areas`.
pub fn assign_cluster_to_area(cluster: &[Unit], areas: &mut Vec<Area>, table_size: u32) -> usize {
    let cluster_size: u32 = cluster.iter().map(|u| u.size).sum();
    let fresh_tables = cluster_size.div_ceil(table_size);

    debug!(
        members = cluster.len(),
        cluster_size, "deciding area for cluster"
    );

    // (extra tables, remaining seats, index)
    let mut best: Option<(u32, u32, usize)> = None;
    for (idx, area) in areas.iter().enumerate() {
        let remaining = area.remaining();
        let extra = extra_tables(cluster_size, remaining, table_size);

        debug!(
            area = idx,
            tables = area.tables().len(),
            used = area.used(),
            remaining,
            extra,
            "area candidate"
        );

        let tighter = match best {
            None => true,
            Some((best_extra, best_remaining, _)) => {
                extra < best_extra || (extra == 0 && best_extra == 0 && remaining < best_remaining)
            }
        };
        if tighter {
            best = Some((extra, remaining, idx));
        }
    }

    match best {
        Some((extra, _, idx)) if extra == 0 || extra < fresh_tables => {
            debug!(area = idx, extra, "reusing existing area");
            idx
        }
        _ => {
            areas.push(Area::new(table_size));
            let idx = areas.len() - 1;
            debug!(area = idx, tables = fresh_tables, "opening new area");
            idx
        }
    }
}

fn extra_tables(cluster_size: u32, remaining: u32, table_size: u32) -> u32 {
    if remaining >= cluster_size {
        0
    } else {
        (cluster_size - remaining).div_ceil(table_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::testing::family;

    /// Area with one table per entry of `used`, each filled to that many seats.
    fn area_with(table_size: u32, used: &[u32]) -> Area {
        let mut area = Area::new(table_size);
        for (i, &seats) in used.iter().enumerate() {
            let idx = area.open_table();
            if seats > 0 {
                area.tables_mut()[idx].seat(family(&format!("Filler{}", i), seats));
            }
            area.record_used(seats);
        }
        area
    }

    #[test]
    fn test_first_cluster_opens_area() {
        let mut areas = Vec::new();
        let idx = assign_cluster_to_area(&[family("Smith", 6), family("Jones", 6)], &mut areas, 10);
        assert_eq!(idx, 0);
        assert_eq!(areas.len(), 1);
    }

    #[test]
    fn test_reuses_area_with_room() {
        let mut areas = vec![area_with(10, &[8, 0])];
        let idx = assign_cluster_to_area(&[family("Brown", 4)], &mut areas, 10);
        assert_eq!(idx, 0);
        assert_eq!(areas.len(), 1);
    }

    #[test]
    fn test_tightest_fit_wins() {
        let mut areas = vec![area_with(10, &[2]), area_with(10, &[6]), area_with(10, &[6])];
        let idx = assign_cluster_to_area(&[family("Brown", 4)], &mut areas, 10);
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_full_areas_lose_to_new_area_on_equal_tables() {
        // both areas are full: reusing either needs 2 tables, same as a fresh area
        let mut areas = vec![area_with(10, &[10]), area_with(10, &[10])];
        let idx = assign_cluster_to_area(&[family("A", 6), family("B", 6)], &mut areas, 10);
        assert_eq!(idx, 2);
        assert_eq!(areas.len(), 3);
    }

    #[test]
    fn test_fewest_extra_tables_then_lowest_index() {
        // a 12-seat cluster: areas 0 and 1 each need one more table, area 2 needs two
        let mut areas = vec![area_with(10, &[7]), area_with(10, &[5]), area_with(10, &[10])];
        let idx = assign_cluster_to_area(&[family("A", 6), family("B", 6)], &mut areas, 10);
        assert_eq!(idx, 0);
        assert_eq!(areas.len(), 3);
    }

    #[test]
    fn test_extra_tables() {
        assert_eq!(extra_tables(12, 12, 10), 0);
        assert_eq!(extra_tables(12, 3, 10), 1);
        assert_eq!(extra_tables(12, 0, 10), 2);
        assert_eq!(extra_tables(21, 0, 10), 3);
    }
}

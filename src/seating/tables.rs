use std::collections::HashSet;

use tracing::debug;

use super::types::{Area, RequestMap, Unit, UnitKey};

/// Seats each unit of a cluster at a table of `area`, in cluster order.
///
/// A unit goes to the table with room that already holds the most of its
/// requested units, earliest table on ties (so with no matches anywhere it
/// lands at the first table with room). A new table is opened only when no
/// table has room. Units already seated are never moved.
pub fn place_cluster_into_area(cluster: &[Unit], area: &mut Area, requests: &RequestMap) {
    for unit in cluster {
        let wanted: HashSet<&UnitKey> = requests.targets(&unit.key).iter().map(|u| &u.key).collect();

        // (table index, score)
        let mut best: Option<(usize, usize)> = None;
        for (idx, table) in area.tables().iter().enumerate() {
            if !table.fits(unit) {
                continue;
            }
            let score = table
                .units()
                .iter()
                .filter(|seated| wanted.contains(&seated.key))
                .count();
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        let table_idx = match best {
            Some((idx, score)) => {
                debug!(unit = %unit.key, table = idx, matched = score, "placed at table");
                idx
            }
            None => {
                let idx = area.open_table();
                debug!(unit = %unit.key, table = idx, "no table had space; opened new table");
                idx
            }
        };
        area.tables_mut()[table_idx].seat(unit.clone());
    }
}

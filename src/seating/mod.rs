pub mod types;
pub mod matching;
pub mod requests;
pub mod clusters;
pub mod split;
pub mod areas;
pub mod tables;
pub mod conflicts;

#[cfg(test)]
pub mod testing;

use tracing::{debug, info};

use crate::display::render_layout;

pub use types::{numbered_tables, Area, Conflict, RequestMap, Unit};
pub use matching::{matcher_for, FuzzyToken, NameMatcher};
pub use requests::{build_request_map, Directory, RequestResolver};
pub use clusters::build_clusters;
pub use split::split_oversized;
pub use areas::assign_cluster_to_area;
pub use tables::place_cluster_into_area;
pub use conflicts::generate_conflict_report;

/// Result of one seating run.
#[derive(Debug, Clone, Default)]
pub struct SeatingPlan {
    pub areas: Vec<Area>,
    pub conflicts: Vec<Conflict>,
    pub layout: String,
}

impl SeatingPlan {
    pub fn table_count(&self) -> usize {
        self.areas.iter().map(|a| a.tables().len()).sum()
    }

    pub fn seated_guests(&self) -> u32 {
        self.areas.iter().map(Area::used).sum()
    }
}

/// Runs the whole engine: clusters, splitting, area choice, table placement,
/// conflict report and layout.
///
/// `units` should already be in submission order; the same input always
/// produces the same plan. `table_size` must be at least 1.
pub fn create_seating_plan(units: &[Unit], requests: &RequestMap, table_size: u32) -> SeatingPlan {
    debug_assert!(table_size > 0, "table size must be validated before seating");

    let mut requests = requests.clone();
    let clusters = build_clusters(units, &requests);
    info!(
        units = units.len(),
        clusters = clusters.len(),
        requests = requests.edge_count(),
        "built clusters"
    );

    let mut areas: Vec<Area> = Vec::new();
    for cluster in &clusters {
        let cluster = split_oversized(cluster, table_size, &mut requests);
        let area_idx = assign_cluster_to_area(&cluster, &mut areas, table_size);
        let area = &mut areas[area_idx];
        place_cluster_into_area(&cluster, area, &requests);
        area.record_used(cluster.iter().map(|u| u.size).sum());
        debug!(area = area_idx, members = cluster.len(), "cluster seated");
    }

    let conflicts = generate_conflict_report(&areas, &requests);
    let layout = render_layout(&areas);

    let plan = SeatingPlan {
        areas,
        conflicts,
        layout,
    };
    info!(
        areas = plan.areas.len(),
        tables = plan.table_count(),
        guests = plan.seated_guests(),
        conflicts = plan.conflicts.len(),
        "seating plan complete"
    );
    plan
}

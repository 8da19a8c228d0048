use tracing::info;

use crate::config::SeatingConfig;
use crate::parser::Family;
use crate::seating::{build_request_map, create_seating_plan, Directory, RequestResolver, SeatingPlan, Unit};

/// Seats families: orders them by submission, resolves their request text
/// against each other and runs the seating engine.
pub fn plan_families(families: &[Family], config: &SeatingConfig) -> SeatingPlan {
    let mut ordered: Vec<&Family> = families.iter().collect();
    ordered.sort_by(|a, b| a.submitted.cmp(&b.submitted).then_with(|| a.email.cmp(&b.email)));

    let units: Vec<Unit> = ordered.iter().map(|f| f.to_unit()).collect();
    let directory = Directory::from_units(&units);
    let matcher = config.matcher();
    let resolver = RequestResolver::new(&directory, matcher.as_ref());

    let requests = build_request_map(
        units.iter().zip(ordered.iter().map(|f| f.requests.as_str())),
        &resolver,
    );
    info!(
        families = units.len(),
        requests = requests.edge_count(),
        fuzzy = config.fuzzy,
        "resolved seating requests"
    );

    create_seating_plan(&units, &requests, config.table_size)
}

use tracing::debug;

use super::clusters::Cluster;
use super::types::{RequestMap, Unit};

/// Replaces every unit larger than a table with table-sized parts.
///
/// Parts are numbered from 0 and each one takes over the original unit's
/// request list, so every part can still pull its requested units towards
/// it. Units that fit a table pass through untouched.
pub fn split_oversized(cluster: &[Unit], table_size: u32, requests: &mut RequestMap) -> Cluster {
    let mut parts = Vec::with_capacity(cluster.len());

    for unit in cluster {
        if unit.size <= table_size {
            parts.push(unit.clone());
            continue;
        }

        let inherited = requests.targets(&unit.key).to_vec();
        let mut remaining = unit.size;
        let mut index = 0;
        while remaining > 0 {
            let size = remaining.min(table_size);
            let part = unit.part(index, size);
            requests.insert(part.clone(), inherited.clone());
            parts.push(part);
            remaining -= size;
            index += 1;
        }

        debug!(
            unit = %unit.key,
            size = unit.size,
            table_size,
            parts = index,
            "split oversized unit"
        );
    }

    parts
}

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::types::{RequestMap, Unit, UnitKey};

/// One connected component of the request graph, in discovery order.
pub type Cluster = Vec<Unit>;

/// Groups units into connected components of the undirected request graph.
///
/// Clusters come out in the order their seed unit appears in `units`.
/// Requests naming a unit outside `units` add no edge; those surface later
/// as conflicts.
pub fn build_clusters(units: &[Unit], requests: &RequestMap) -> Vec<Cluster> {
    let present: HashMap<&UnitKey, &Unit> = units.iter().map(|u| (&u.key, u)).collect();
    let mut graph: HashMap<&UnitKey, Vec<&Unit>> = HashMap::new();

    for unit in units {
        for target in requests.targets(&unit.key) {
            let Some(&other) = present.get(&target.key) else {
                continue;
            };
            link(&mut graph, unit, other);
            link(&mut graph, other, unit);
        }
    }

    let mut visited: HashSet<&UnitKey> = HashSet::new();
    let mut clusters = Vec::new();

    for unit in units {
        if !visited.insert(&unit.key) {
            continue;
        }
        let mut queue = VecDeque::from([unit]);
        let mut cluster = vec![unit.clone()];

        while let Some(current) = queue.pop_front() {
            for &neighbor in graph.get(&current.key).into_iter().flatten() {
                if visited.insert(&neighbor.key) {
                    queue.push_back(neighbor);
                    cluster.push(neighbor.clone());
                }
            }
        }

        debug!(
            seed = %unit.key,
            members = cluster.len(),
            seats = cluster.iter().map(|u| u.size).sum::<u32>(),
            "built cluster"
        );
        clusters.push(cluster);
    }

    clusters
}

fn link<'a>(graph: &mut HashMap<&'a UnitKey, Vec<&'a Unit>>, from: &'a Unit, to: &'a Unit) {
    let neighbors = graph.entry(&from.key).or_default();
    if !neighbors.iter().any(|n| n.key == to.key) {
        neighbors.push(to);
    }
}

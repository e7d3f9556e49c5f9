use bandmap_scanner::Band;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Two bands that share personnel, weighted by how many people they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub weight: usize,
}

/// Compares every pair of bands and links those that share at least one person.
///
/// Pairs are visited as `(i, j)` with `i < j` in pool order, so the earlier
/// band is always the source and the output is reproducible for the same
/// input. Quadratic in the pool size.
pub fn build_connections(bands: &[Band]) -> Vec<Connection> {
    let rosters: Vec<HashSet<&str>> = bands.iter().map(Band::personnel_ids).collect();
    let mut connections = Vec::new();

    for i in 0..bands.len() {
        for j in (i + 1)..bands.len() {
            if bands[i].id == bands[j].id {
                continue;
            }
            let shared = rosters[i].intersection(&rosters[j]).count();
            if shared > 0 {
                connections.push(Connection {
                    source: bands[i].id.clone(),
                    target: bands[j].id.clone(),
                    weight: shared,
                });
            }
        }
    }

    connections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(id: &str, members: &[&str], supporting: &[&str]) -> Band {
        let mut band = Band::new(id, id.to_uppercase());
        for m in members {
            band.add_member(m.to_uppercase(), *m);
        }
        for s in supporting {
            band.add_supporting_musician(s.to_uppercase(), *s);
        }
        band
    }

    #[test]
    fn test_single_shared_member() {
        let bands = vec![band("g", &["a", "b"], &[]), band("h", &["a"], &[])];
        assert_eq!(
            build_connections(&bands),
            vec![Connection {
                source: "g".to_string(),
                target: "h".to_string(),
                weight: 1
            }]
        );
    }

    #[test]
    fn test_two_shared_members_make_one_edge() {
        let bands = vec![band("g", &["a", "b", "c"], &[]), band("h", &["b", "a"], &[])];
        let connections = build_connections(&bands);
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].weight, 2);
    }

    #[test]
    fn test_supporting_musicians_count_across_roles() {
        let bands = vec![band("g", &["a"], &["x"]), band("h", &["x"], &["a"])];
        assert_eq!(build_connections(&bands)[0].weight, 2);
    }

    #[test]
    fn test_person_listed_twice_counts_once() {
        let bands = vec![band("g", &["a"], &["a"]), band("h", &["a", "a"], &[])];
        assert_eq!(build_connections(&bands)[0].weight, 1);
    }

    #[test]
    fn test_empty_ids_never_link_bands() {
        let bands = vec![band("g", &[""], &[]), band("h", &[""], &[])];
        assert!(build_connections(&bands).is_empty());
    }

    #[test]
    fn test_no_shared_personnel() {
        let bands = vec![band("g", &["a"], &[]), band("h", &["b"], &[]), band("k", &[], &[])];
        assert!(build_connections(&bands).is_empty());
    }

    #[test]
    fn test_pair_order_follows_pool_order() {
        let bands = vec![
            band("k", &["c"], &[]),
            band("g", &["a", "c"], &[]),
            band("h", &["a", "c"], &[]),
        ];
        let connections = build_connections(&bands);
        let pairs: Vec<(&str, &str, usize)> = connections
            .iter()
            .map(|c| (c.source.as_str(), c.target.as_str(), c.weight))
            .collect();
        assert_eq!(pairs, vec![("k", "g", 1), ("k", "h", 1), ("g", "h", 2)]);
    }

    #[test]
    fn test_empty_pool() {
        assert!(build_connections(&[]).is_empty());
    }
}

use crate::export::AggregateResult;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// A band and how strongly it is tied to a neighbour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbour {
    pub id: String,
    pub name: String,
    pub weight: usize,
}

/// Undirected view over an aggregate: bands as nodes, shared-personnel counts as edge weights.
pub struct BandGraph {
    graph: UnGraph<(String, String), usize>,
    index: HashMap<String, NodeIndex>,
}

impl BandGraph {
    pub fn from_result(result: &AggregateResult) -> Self {
        let mut graph: UnGraph<(String, String), usize> =
            UnGraph::with_capacity(result.bands.len(), result.connections.len());
        let mut index = HashMap::with_capacity(result.bands.len());

        for band in &result.bands {
            index
                .entry(band.id.clone())
                .or_insert_with(|| graph.add_node((band.id.clone(), band.name.clone())));
        }

        for connection in &result.connections {
            if let (Some(&a), Some(&b)) = (
                index.get(&connection.source),
                index.get(&connection.target),
            ) {
                graph.add_edge(a, b, connection.weight);
            }
        }

        Self { graph, index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of islands of bands with no shared personnel between them.
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Neighbours of `id`, strongest first, ties broken by name.
    pub fn neighbours(&self, id: &str) -> Vec<Neighbour> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };

        let mut neighbours: Vec<Neighbour> = self
            .graph
            .edges(node)
            .map(|edge| {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                let (id, name) = &self.graph[other];
                Neighbour {
                    id: id.clone(),
                    name: name.clone(),
                    weight: *edge.weight(),
                }
            })
            .collect();

        neighbours.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.name.cmp(&b.name)));
        neighbours
    }

    /// Up to `limit` links as `(source name, target name, weight)`, heaviest first.
    pub fn strongest(&self, limit: usize) -> Vec<(String, String, usize)> {
        let mut edges: Vec<(String, String, usize)> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((
                    self.graph[a].1.clone(),
                    self.graph[b].1.clone(),
                    self.graph[e],
                ))
            })
            .collect();

        edges.sort_by(|x, y| {
            y.2.cmp(&x.2)
                .then_with(|| x.0.cmp(&y.0))
                .then_with(|| x.1.cmp(&y.1))
        });
        edges.truncate(limit);
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::build_connections;
    use crate::export::export;
    use bandmap_scanner::Band;

    fn result() -> AggregateResult {
        let mut g = Band::new("g", "Green River");
        g.add_member("Jeff", "jeff");
        g.add_member("Stone", "stone");
        g.add_member("Mark", "mark");
        let mut m = Band::new("m", "Mother Love Bone");
        m.add_member("Jeff", "jeff");
        m.add_member("Stone", "stone");
        let mut mh = Band::new("mh", "Mudhoney");
        mh.add_member("Mark", "mark");
        let lonely = Band::new("x", "Lonely");

        let bands = vec![g, m, mh, lonely];
        let connections = build_connections(&bands);
        export(bands, connections)
    }

    #[test]
    fn test_counts_and_components() {
        let graph = BandGraph::from_result(&result());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.component_count(), 2);
    }

    #[test]
    fn test_neighbours_sorted_by_weight() {
        let graph = BandGraph::from_result(&result());
        let neighbours = graph.neighbours("g");
        assert_eq!(neighbours.len(), 2);
        assert_eq!(neighbours[0].id, "m");
        assert_eq!(neighbours[0].weight, 2);
        assert_eq!(neighbours[1].id, "mh");
        assert!(graph.neighbours("x").is_empty());
        assert!(graph.neighbours("nope").is_empty());
    }

    #[test]
    fn test_strongest() {
        let graph = BandGraph::from_result(&result());
        let top = graph.strongest(1);
        assert_eq!(
            top,
            vec![("Green River".to_string(), "Mother Love Bone".to_string(), 2)]
        );
    }
}

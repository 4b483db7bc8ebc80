//! The derived dependency graph and its algorithms.
//!
//! A [`DependencyGraph`] is computed from a snapshot of symbols and
//! connections; it is never persisted. Construction is deterministic:
//! nodes enter the underlying petgraph in ascending symbol-id order, so
//! cycle detection and topological ordering always come out the same for
//! the same snapshot.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::connection::{Connection, ConnectionId};
use crate::symbol::{AbstractionLevel, ComponentSymbol, SymbolId, SymbolKind};

/// A node in the dependency graph, keyed by symbol id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// The symbol this node stands for.
    pub id: SymbolId,
    /// Symbol name, for display.
    pub name: String,
    /// Abstraction tier.
    pub level: AbstractionLevel,
    /// Symbol kind.
    pub kind: SymbolKind,
}

/// Why an edge exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEdgeKind {
    /// An explicit connection between two ports.
    Wire {
        connection: ConnectionId,
        from_port: String,
        to_port: String,
    },
    /// A structural reference: `port`'s type mentions the target symbol.
    TypeRef { port: String },
}

/// A directed edge from its keying source symbol to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Edge destination.
    pub target: SymbolId,
    /// Edge provenance.
    pub kind: GraphEdgeKind,
}

/// Aggregate statistics over a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub node_count: usize,
    /// Number of edges.
    pub edge_count: usize,
    /// Nodes with no incoming edges.
    pub root_count: usize,
    /// Nodes with no outgoing edges.
    pub leaf_count: usize,
    /// Weakly-connected components.
    pub component_count: usize,
    /// Whether any cycle was detected.
    pub has_cycles: bool,
    /// Nodes on the longest path. For a cyclic graph this is the longest
    /// path found while keeping visited nodes on a stack, so traversal
    /// terminates.
    pub max_depth: usize,
}

/// Directed dependency graph derived from symbols and connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Nodes keyed by symbol id.
    pub nodes: BTreeMap<SymbolId, GraphNode>,
    /// Outgoing edges keyed by source symbol id.
    pub edges: BTreeMap<SymbolId, Vec<GraphEdge>>,
    /// Detected cycles, each an ordered symbol-id list whose last element
    /// connects back to the first. Rotated to start at the smallest
    /// member; sorted by that member.
    pub cycles: Vec<Vec<SymbolId>>,
    /// Kahn ordering with ties broken by ascending symbol id, or `None`
    /// when the graph is cyclic. `None` here and a non-empty `cycles`
    /// always agree.
    pub topological_order: Option<Vec<SymbolId>>,
}

impl DependencyGraph {
    /// Build the graph for a snapshot: one node per symbol, one wire edge
    /// per connection, and (optionally) one structural edge per distinct
    /// port-type reference.
    ///
    /// Connections naming symbols absent from the snapshot are skipped;
    /// referential integrity is the repository's concern, not the
    /// builder's.
    pub fn build(
        symbols: &[ComponentSymbol],
        connections: &[Connection],
        include_type_edges: bool,
    ) -> Self {
        let mut nodes = BTreeMap::new();
        for symbol in symbols {
            nodes.insert(
                symbol.id.clone(),
                GraphNode {
                    id: symbol.id.clone(),
                    name: symbol.name.clone(),
                    level: symbol.level,
                    kind: symbol.kind,
                },
            );
        }

        let mut edges: BTreeMap<SymbolId, Vec<GraphEdge>> = BTreeMap::new();
        for connection in connections {
            if nodes.contains_key(&connection.from_symbol)
                && nodes.contains_key(&connection.to_symbol)
            {
                edges
                    .entry(connection.from_symbol.clone())
                    .or_default()
                    .push(GraphEdge {
                        target: connection.to_symbol.clone(),
                        kind: GraphEdgeKind::Wire {
                            connection: connection.id.clone(),
                            from_port: connection.from_port.clone(),
                            to_port: connection.to_port.clone(),
                        },
                    });
            }
        }

        if include_type_edges {
            for symbol in symbols {
                for port in &symbol.ports {
                    for target in port.ty.referenced_symbols() {
                        if target != symbol.id && nodes.contains_key(&target) {
                            edges.entry(symbol.id.clone()).or_default().push(GraphEdge {
                                target,
                                kind: GraphEdgeKind::TypeRef {
                                    port: port.name.clone(),
                                },
                            });
                        }
                    }
                }
            }
        }

        Self::assemble(nodes, edges)
    }

    fn assemble(
        nodes: BTreeMap<SymbolId, GraphNode>,
        edges: BTreeMap<SymbolId, Vec<GraphEdge>>,
    ) -> Self {
        let (cycles, topological_order) = analyze(&nodes, &edges);
        Self {
            nodes,
            edges,
            cycles,
            topological_order,
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Whether any cycle was detected.
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Outgoing edges of a node.
    pub fn edges_from(&self, id: &SymbolId) -> &[GraphEdge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Extract the induced subgraph of every ancestor and descendant of
    /// `root`, including `root` itself. `None` if the root is unknown.
    pub fn subgraph(&self, root: &SymbolId) -> Option<DependencyGraph> {
        if !self.nodes.contains_key(root) {
            return None;
        }

        let mut reverse: HashMap<&SymbolId, Vec<&SymbolId>> = HashMap::new();
        for (source, list) in &self.edges {
            for edge in list {
                reverse.entry(&edge.target).or_default().push(source);
            }
        }

        let mut keep: BTreeSet<SymbolId> = BTreeSet::new();
        keep.insert(root.clone());

        // Descendants.
        let mut queue: VecDeque<&SymbolId> = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for edge in self.edges_from(current) {
                if keep.insert(edge.target.clone()) {
                    queue.push_back(&edge.target);
                }
            }
        }

        // Ancestors.
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            if let Some(sources) = reverse.get(current) {
                for &source in sources {
                    if keep.insert(source.clone()) {
                        queue.push_back(source);
                    }
                }
            }
        }

        let nodes: BTreeMap<SymbolId, GraphNode> = self
            .nodes
            .iter()
            .filter(|(id, _)| keep.contains(*id))
            .map(|(id, node)| (id.clone(), node.clone()))
            .collect();
        let edges: BTreeMap<SymbolId, Vec<GraphEdge>> = self
            .edges
            .iter()
            .filter(|(source, _)| keep.contains(*source))
            .map(|(source, list)| {
                (
                    source.clone(),
                    list.iter()
                        .filter(|edge| keep.contains(&edge.target))
                        .cloned()
                        .collect::<Vec<_>>(),
                )
            })
            .filter(|(_, list): &(_, Vec<GraphEdge>)| !list.is_empty())
            .collect();

        Some(Self::assemble(nodes, edges))
    }

    /// Compute aggregate statistics.
    pub fn stats(&self) -> GraphStats {
        let mut in_degree: BTreeMap<&SymbolId, usize> = BTreeMap::new();
        let mut out_degree: BTreeMap<&SymbolId, usize> = BTreeMap::new();
        for id in self.nodes.keys() {
            in_degree.insert(id, 0);
            out_degree.insert(id, 0);
        }
        for (source, list) in &self.edges {
            *out_degree.get_mut(source).expect("edge source is a node") += list.len();
            for edge in list {
                *in_degree.get_mut(&edge.target).expect("edge target is a node") += 1;
            }
        }

        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            root_count: in_degree.values().filter(|&&d| d == 0).count(),
            leaf_count: out_degree.values().filter(|&&d| d == 0).count(),
            component_count: self.weak_component_count(),
            has_cycles: self.has_cycles(),
            max_depth: self.max_depth(),
        }
    }

    fn weak_component_count(&self) -> usize {
        let ids: Vec<&SymbolId> = self.nodes.keys().collect();
        let index: HashMap<&SymbolId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut parent: Vec<usize> = (0..ids.len()).collect();

        fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for (source, list) in &self.edges {
            for edge in list {
                let a = find(&mut parent, index[source]);
                let b = find(&mut parent, index[&edge.target]);
                if a != b {
                    parent[a] = b;
                }
            }
        }

        (0..ids.len())
            .map(|i| find(&mut parent, i))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Nodes on the longest path. Empty graph → 0; an isolated node
    /// counts as a path of length 1.
    pub fn max_depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        match &self.topological_order {
            Some(order) => {
                // Acyclic: exact longest path by dynamic programming in
                // reverse topological order.
                let mut depth: HashMap<&SymbolId, usize> = HashMap::new();
                for id in order.iter().rev() {
                    let below = self
                        .edges_from(id)
                        .iter()
                        .map(|edge| depth.get(&edge.target).copied().unwrap_or(1))
                        .max()
                        .unwrap_or(0);
                    depth.insert(id, 1 + below);
                }
                depth.values().copied().max().unwrap_or(1)
            }
            None => {
                // Cyclic: depth-first search that skips nodes already on
                // the current stack, so traversal terminates.
                let mut best = 0;
                let mut on_stack: HashSet<SymbolId> = HashSet::new();
                for start in self.nodes.keys() {
                    best = best.max(self.depth_from(start, &mut on_stack));
                }
                best
            }
        }
    }

    fn depth_from(&self, id: &SymbolId, on_stack: &mut HashSet<SymbolId>) -> usize {
        on_stack.insert(id.clone());
        let mut deepest = 0;
        for edge in self.edges_from(id) {
            if !on_stack.contains(&edge.target) {
                deepest = deepest.max(self.depth_from(&edge.target, on_stack));
            }
        }
        on_stack.remove(id);
        1 + deepest
    }
}

/// Run cycle detection and topological ordering over the edge relation.
fn analyze(
    nodes: &BTreeMap<SymbolId, GraphNode>,
    edges: &BTreeMap<SymbolId, Vec<GraphEdge>>,
) -> (Vec<Vec<SymbolId>>, Option<Vec<SymbolId>>) {
    let mut graph: DiGraph<SymbolId, ()> = DiGraph::new();
    let mut index_of: HashMap<&SymbolId, NodeIndex> = HashMap::new();
    // BTreeMap iteration gives ascending symbol ids, which fixes the
    // visitation order of everything downstream.
    for id in nodes.keys() {
        let idx = graph.add_node(id.clone());
        index_of.insert(id, idx);
    }
    for (source, list) in edges {
        for edge in list {
            graph.add_edge(index_of[source], index_of[&edge.target], ());
        }
    }

    // Strongly connected components; a component is a cycle when it has
    // more than one member or a self edge.
    let mut cycles: Vec<Vec<SymbolId>> = Vec::new();
    for scc in tarjan_scc(&graph) {
        let is_cycle = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
        if is_cycle {
            let members: BTreeSet<SymbolId> = scc.iter().map(|&idx| graph[idx].clone()).collect();
            cycles.push(order_cycle(&members, edges));
        }
    }
    cycles.sort_by(|a, b| a[0].cmp(&b[0]));

    // Kahn's algorithm with a min-heap so ties break by ascending id.
    let mut in_degree: HashMap<NodeIndex, usize> = graph.node_indices().map(|i| (i, 0)).collect();
    for idx in graph.node_indices() {
        for neighbor in graph.neighbors_directed(idx, Direction::Outgoing) {
            *in_degree.get_mut(&neighbor).expect("neighbor is a node") += 1;
        }
    }
    let mut ready: BinaryHeap<Reverse<(SymbolId, NodeIndex)>> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&idx, _)| Reverse((graph[idx].clone(), idx)))
        .collect();
    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((id, idx))) = ready.pop() {
        order.push(id);
        for neighbor in graph.neighbors_directed(idx, Direction::Outgoing) {
            let degree = in_degree.get_mut(&neighbor).expect("neighbor is a node");
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse((graph[neighbor].clone(), neighbor)));
            }
        }
    }

    let topological_order = if order.len() == graph.node_count() {
        Some(order)
    } else {
        None
    };

    (cycles, topological_order)
}

/// Arrange a cycle's members along its edges, starting from the smallest
/// id. For a simple cycle this reproduces the true cyclic order; for a
/// denser strongly connected component it walks edges greedily and
/// appends any stragglers in ascending order.
fn order_cycle(
    members: &BTreeSet<SymbolId>,
    edges: &BTreeMap<SymbolId, Vec<GraphEdge>>,
) -> Vec<SymbolId> {
    let start = members.iter().next().expect("cycle has members").clone();
    let mut ordered = vec![start.clone()];
    let mut visited: BTreeSet<SymbolId> = BTreeSet::from([start.clone()]);
    let mut current = start;

    while ordered.len() < members.len() {
        let next = edges
            .get(&current)
            .into_iter()
            .flatten()
            .map(|edge| &edge.target)
            .filter(|target| members.contains(*target) && !visited.contains(*target))
            .min()
            .cloned();
        match next {
            Some(next) => {
                visited.insert(next.clone());
                ordered.push(next.clone());
                current = next;
            }
            None => {
                for id in members {
                    if !visited.contains(id) {
                        ordered.push(id.clone());
                    }
                }
                break;
            }
        }
    }

    ordered
}

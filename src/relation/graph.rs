use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::document::{
    Keyed, LtpBody, LtpDocument, LtpMixture, LtpSet, NewLtpDocument, PartialKeyed, SetHeader, SetReferenced,
    VersionedDocument,
};
use crate::process::{ProcessInfo, ReferenceKey};
use crate::species::{ComponentSummaries, ComponentSummary, SerializedSpecies, Species, StateSummary};
use crate::validation::FieldPath;

/// Kind of entity a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NodeKind {
    /// A process of the document
    Process,
    /// A dataset
    Set,
    /// A species state, or one of its less specific ancestors
    State,
    /// A bibliographic reference
    Reference,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Process => "process",
            NodeKind::Set => "set",
            NodeKind::State => "state",
            NodeKind::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// Typed node identity: the same key may name entities of different kinds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId {
    /// Entity kind
    pub kind: NodeKind,
    /// Key of the entity within its kind
    pub key: String,
}

impl NodeId {
    /// Create a node identity.
    pub fn new(kind: NodeKind, key: impl Into<String>) -> Self {
        Self { kind, key: key.into() }
    }

    /// A process node.
    pub fn process(key: impl Into<String>) -> Self {
        Self::new(NodeKind::Process, key)
    }

    /// A set node.
    pub fn set(key: impl Into<String>) -> Self {
        Self::new(NodeKind::Set, key)
    }

    /// A state node.
    pub fn state(key: impl Into<String>) -> Self {
        Self::new(NodeKind::State, key)
    }

    /// A reference node.
    pub fn reference(key: impl Into<String>) -> Self {
        Self::new(NodeKind::Reference, key)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.kind, self.key)
    }
}

/// Named directed relation between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EdgeKind {
    /// Process → set it belongs to
    IsPartOf,
    /// Process → state on the left-hand side of its reaction
    Consumes,
    /// Process → state on the right-hand side of its reaction
    Produces,
    /// Less specific state → more specific state
    HasDirectSubstate,
    /// Component state → compound state listing it
    InCompound,
    /// Process or set → cited reference
    References,
}

impl EdgeKind {
    /// Every edge kind.
    pub const ALL: [EdgeKind; 6] = [
        EdgeKind::IsPartOf,
        EdgeKind::Consumes,
        EdgeKind::Produces,
        EdgeKind::HasDirectSubstate,
        EdgeKind::InCompound,
        EdgeKind::References,
    ];

    /// Node kinds the edge may start from.
    pub fn source_kinds(self) -> &'static [NodeKind] {
        match self {
            EdgeKind::IsPartOf | EdgeKind::Consumes | EdgeKind::Produces => &[NodeKind::Process],
            EdgeKind::HasDirectSubstate | EdgeKind::InCompound => &[NodeKind::State],
            EdgeKind::References => &[NodeKind::Process, NodeKind::Set],
        }
    }

    /// The node kind the edge must point at.
    pub fn target_kind(self) -> NodeKind {
        match self {
            EdgeKind::IsPartOf => NodeKind::Set,
            EdgeKind::Consumes | EdgeKind::Produces | EdgeKind::HasDirectSubstate | EdgeKind::InCompound => {
                NodeKind::State
            }
            EdgeKind::References => NodeKind::Reference,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A directed, typed edge together with the field that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    /// Relation
    pub kind: EdgeKind,
    /// Source node
    pub from: NodeId,
    /// Target node
    pub to: NodeId,
    /// Field that declared the edge; root for hand-built graphs
    pub origin: FieldPath,
}

/// Entities and their relations, checked by [`validate_relations`](super::validate_relations).
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    nodes: BTreeMap<NodeId, FieldPath>,
    edges: Vec<Edge>,
}

impl RelationGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node; declaring it again keeps the first origin.
    pub fn add_node(&mut self, node: NodeId) {
        self.add_node_at(node, FieldPath::root());
    }

    /// Declare a node declared by the field at `origin`.
    pub fn add_node_at(&mut self, node: NodeId, origin: FieldPath) {
        self.nodes.entry(node).or_insert(origin);
    }

    /// Add an edge; endpoints need not be declared (yet).
    pub fn add_edge(&mut self, kind: EdgeKind, from: NodeId, to: NodeId) {
        self.add_edge_at(kind, from, to, FieldPath::root());
    }

    /// Add an edge declared by the field at `origin`.
    pub fn add_edge_at(&mut self, kind: EdgeKind, from: NodeId, to: NodeId, origin: FieldPath) {
        self.edges.push(Edge { kind, from, to, origin });
    }

    /// Returns true if `node` has been declared.
    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Declared nodes in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Field that declared `node`.
    pub fn node_origin(&self, node: &NodeId) -> Option<&FieldPath> {
        self.nodes.get(node)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges of one kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Number of declared nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// Building from documents
// =============================================================================

/// A state entry that can be decomposed into substates.
pub trait StateNode {
    /// Rendering used to key the state's ancestors.
    fn state_summary(&self) -> Cow<'_, StateSummary>;
}

impl StateNode for Species {
    fn state_summary(&self) -> Cow<'_, StateSummary> {
        Cow::Owned(self.render())
    }
}

impl StateNode for SerializedSpecies {
    fn state_summary(&self) -> Cow<'_, StateSummary> {
        Cow::Borrowed(self.serialized())
    }
}

/// A process info entry with outgoing relations.
pub trait InfoNode {
    /// Keys into the `references` map cited by the entry.
    fn reference_keys(&self) -> Vec<&str>;

    /// Keys into the `sets` map the entry belongs to.
    fn set_keys(&self) -> &[String] {
        &[]
    }
}

impl<R: ReferenceKey> InfoNode for ProcessInfo<R> {
    fn reference_keys(&self) -> Vec<&str> {
        self.references().iter().map(ReferenceKey::reference_key).collect()
    }
}

impl<I: InfoNode> InfoNode for SetReferenced<I> {
    fn reference_keys(&self) -> Vec<&str> {
        self.item.reference_keys()
    }

    fn set_keys(&self) -> &[String] {
        &self.is_part_of
    }
}

impl<I: InfoNode> InfoNode for Keyed<I> {
    fn reference_keys(&self) -> Vec<&str> {
        self.item().reference_keys()
    }

    fn set_keys(&self) -> &[String] {
        self.item().set_keys()
    }
}

impl<I: InfoNode> InfoNode for PartialKeyed<I> {
    fn reference_keys(&self) -> Vec<&str> {
        self.item().reference_keys()
    }

    fn set_keys(&self) -> &[String] {
        self.item().set_keys()
    }
}

impl<I: InfoNode> InfoNode for VersionedDocument<I> {
    fn reference_keys(&self) -> Vec<&str> {
        self.body().reference_keys()
    }

    fn set_keys(&self) -> &[String] {
        self.body().set_keys()
    }
}

/// `base{p1{p2{...}}}`, the plain-text form of a partially specified state.
fn nest(base: &str, parts: &[&str]) -> String {
    let mut out = String::from(base);
    for part in parts {
        out.push('{');
        out.push_str(part);
    }
    out.extend(std::iter::repeat('}').take(parts.len()));
    out
}

struct StateDecomposer<'g> {
    graph: &'g mut RelationGraph,
    /// Document key of every state, by the summary it renders to
    by_summary: BTreeMap<String, String>,
    /// States sharing ancestors add the same edges again
    linked: HashSet<(EdgeKind, NodeId, NodeId)>,
}

impl StateDecomposer<'_> {
    fn node(&self, summary: &str) -> NodeId {
        NodeId::state(self.by_summary.get(summary).map(String::as_str).unwrap_or(summary))
    }

    fn link(&mut self, kind: EdgeKind, from: NodeId, to: NodeId, origin: &FieldPath) {
        self.graph.add_node_at(from.clone(), origin.clone());
        self.graph.add_node_at(to.clone(), origin.clone());
        if from != to && self.linked.insert((kind, from.clone(), to.clone())) {
            self.graph.add_edge_at(kind, from, to, origin.clone());
        }
    }

    /// Add the ancestor chain of the state `key` and its compound components.
    fn decompose(&mut self, key: &str, summary: &StateSummary, origin: &FieldPath) {
        let leaf = NodeId::state(key);
        let base = summary.composition.summary.as_str();
        let mut parts: Vec<&str> = Vec::new();
        let mut level = summary.electronic.as_ref();

        while let Some(summaries) = level {
            let parent = self.node(&nest(base, &parts));
            match summaries {
                ComponentSummaries::Singular(component) => {
                    parts.push(&component.summary);
                    let next = nested(component);
                    if next.is_none() {
                        self.link(EdgeKind::HasDirectSubstate, parent, leaf.clone(), origin);
                    } else {
                        let child = self.node(&nest(base, &parts));
                        self.link(EdgeKind::HasDirectSubstate, parent, child, origin);
                    }
                    level = next;
                }
                ComponentSummaries::Compound(components) => {
                    self.link(EdgeKind::HasDirectSubstate, parent.clone(), leaf.clone(), origin);
                    for component in components {
                        let mut with_component = parts.clone();
                        with_component.push(&component.summary);
                        let member = self.node(&nest(base, &with_component));
                        self.link(EdgeKind::HasDirectSubstate, parent.clone(), member.clone(), origin);
                        self.link(EdgeKind::InCompound, member, leaf.clone(), origin);
                    }
                    level = None;
                }
            }
        }
    }
}

fn nested(component: &ComponentSummary) -> Option<&ComponentSummaries> {
    component.vibrational.as_deref().or(component.rotational.as_deref())
}

impl RelationGraph {
    /// Add the states, references and processes of `body`.
    ///
    /// Every process gets `Consumes`/`Produces` edges to its participants,
    /// `References` edges to the sources its infos cite and `IsPartOf` edges
    /// to the sets its infos list. States are decomposed into their less
    /// specific ancestors, keyed by canonical summary.
    pub fn add_body<St: StateNode, I: InfoNode>(&mut self, body: &LtpBody<St, I>) {
        let root = FieldPath::root();

        for key in body.references.keys() {
            self.add_node_at(NodeId::reference(key.as_str()), root.field("references").field(key));
        }

        let summaries: Vec<(&String, Cow<'_, StateSummary>, FieldPath)> = body
            .states
            .iter()
            .map(|(key, state)| (key, state.state_summary(), root.field("states").field(key)))
            .collect();
        for (key, _, origin) in &summaries {
            self.add_node_at(NodeId::state(key.as_str()), origin.clone());
        }

        let mut decomposer = StateDecomposer {
            by_summary: summaries
                .iter()
                .rev()
                .map(|(key, summary, _)| (summary.summary.clone(), (*key).clone()))
                .collect(),
            linked: HashSet::new(),
            graph: self,
        };
        for (key, summary, origin) in &summaries {
            decomposer.decompose(key, summary, origin);
        }

        for (p, process) in body.processes.iter().enumerate() {
            let origin = root.field("processes").index(p);
            let node = NodeId::process(origin.to_string());
            self.add_node_at(node.clone(), origin.clone());

            let reaction = origin.field("reaction");
            for (side, kind, entries) in [
                ("lhs", EdgeKind::Consumes, &process.reaction.lhs),
                ("rhs", EdgeKind::Produces, &process.reaction.rhs),
            ] {
                for (i, entry) in entries.iter().enumerate() {
                    let at = reaction.field(side).index(i).field("state");
                    self.add_edge_at(kind, node.clone(), NodeId::state(entry.state.as_str()), at);
                }
            }

            for (i, info) in process.info.iter().enumerate() {
                let info_path = origin.field("info").index(i);
                for (r, key) in info.reference_keys().into_iter().enumerate() {
                    let at = info_path.field("references").index(r);
                    self.add_edge_at(EdgeKind::References, node.clone(), NodeId::reference(key), at);
                }
                for (s, key) in info.set_keys().iter().enumerate() {
                    let at = info_path.field("isPartOf").index(s);
                    self.add_edge_at(EdgeKind::IsPartOf, node.clone(), NodeId::set(key.as_str()), at);
                }
            }
        }
    }

    /// Add a set node for `header`, citing its `publishedIn` reference.
    pub fn add_set<C>(&mut self, key: &str, header: &SetHeader<C>, origin: FieldPath) {
        let node = NodeId::set(key);
        self.add_node_at(node.clone(), origin.clone());
        if let Some(published_in) = &header.published_in {
            self.add_edge_at(
                EdgeKind::References,
                node,
                NodeId::reference(published_in.as_str()),
                origin.field("publishedIn"),
            );
        }
    }

    /// Graph of a single dataset stored under `key`: every process is part of it.
    fn single_set<C, St: StateNode, I: InfoNode>(key: &str, set: &LtpSet<C, St, I>) -> Self {
        let mut graph = Self::new();
        graph.add_set(key, &set.header, FieldPath::root());
        graph.add_body(&set.body);
        for p in 0..set.body.processes.len() {
            let origin = FieldPath::root().field("processes").index(p);
            graph.add_edge_at(EdgeKind::IsPartOf, NodeId::process(origin.to_string()), NodeId::set(key), origin);
        }
        graph
    }

    /// Graph of a freshly authored dataset; the set is keyed by its name.
    pub fn from_new_document(document: &NewLtpDocument) -> Self {
        Self::single_set(&document.header.name, document)
    }

    /// Graph of a dataset as authored, keyed or not.
    pub fn from_set<C, St: StateNode, I: InfoNode>(key: &str, set: &LtpSet<C, St, I>) -> Self {
        Self::single_set(key, set)
    }

    /// Graph of a stored dataset, keyed by its document key.
    pub fn from_document(document: &LtpDocument) -> Self {
        Self::single_set(document.key(), document.body())
    }

    /// Graph of a mixture: sets come from the `sets` map and processes
    /// declare their memberships through `isPartOf`.
    pub fn from_mixture(mixture: &LtpMixture) -> Self {
        let mut graph = Self::new();
        for (key, set) in &mixture.sets {
            graph.add_set(key, set.body(), FieldPath::root().field("sets").field(key));
        }
        graph.add_body(&mixture.body);
        graph
    }
}

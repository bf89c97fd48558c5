//! Skill prerequisite graph and catalog.
//!
//! Prerequisites form a directed acyclic graph: an edge runs from a
//! prerequisite to every skill that requires it, so a topological order is a
//! valid learning order. A catalog that would contain a cycle is rejected at
//! construction, since no skill on the cycle could ever be learned.

use super::{SkillBook, SkillDefinition, SkillPowerResolver};
use crate::error::SkillError;
use crate::ids::SkillId;
use crate::profile::AttributeProfile;
use crate::stat_set::DerivedStatSet;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Directed graph of skill prerequisites.
///
/// # Examples
///
/// ```rust
/// use statforge::skill::graph::PrerequisiteGraph;
/// use statforge::SkillId;
///
/// let mut graph = PrerequisiteGraph::new();
/// let slash = SkillId::from_str("slash");
/// let cleave = SkillId::from_str("cleave");
///
/// // cleave requires slash
/// graph.add_requirement(cleave.clone(), slash.clone());
///
/// let order = graph.topological_sort().unwrap();
/// let slash_pos = order.iter().position(|s| s == &slash).unwrap();
/// let cleave_pos = order.iter().position(|s| s == &cleave).unwrap();
/// assert!(slash_pos < cleave_pos);
/// ```
#[derive(Debug, Clone)]
pub struct PrerequisiteGraph {
    graph: DiGraph<SkillId, ()>,
    node_map: HashMap<SkillId, NodeIndex>,
}

impl PrerequisiteGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a skill node, returning the existing index if already present.
    pub fn add_node(&mut self, skill: SkillId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&skill) {
            idx
        } else {
            let idx = self.graph.add_node(skill.clone());
            self.node_map.insert(skill, idx);
            idx
        }
    }

    /// Record that `skill` requires `prerequisite`.
    pub fn add_requirement(&mut self, skill: SkillId, prerequisite: SkillId) {
        let skill_idx = self.add_node(skill);
        let prereq_idx = self.add_node(prerequisite);
        self.graph.add_edge(prereq_idx, skill_idx, ());
    }

    /// Whether `skill` has a node.
    pub fn contains(&self, skill: &SkillId) -> bool {
        self.node_map.contains_key(skill)
    }

    /// Number of skill nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Find a prerequisite cycle, if any.
    ///
    /// The reported path is closed: its first and last entries are the same
    /// skill, and only skills on the cycle appear in it.
    pub fn detect_cycles(&self) -> Result<(), SkillError> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();

        for node in self.graph.node_indices() {
            if !visited.contains(&node) {
                let mut path = Vec::new();
                if let Some(cycle) = self.find_cycle(node, &mut visited, &mut on_stack, &mut path)
                {
                    return Err(SkillError::PrerequisiteCycle { path: cycle });
                }
            }
        }
        Ok(())
    }

    fn find_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<SkillId>> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&next) {
                if let Some(cycle) = self.find_cycle(next, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack.contains(&next) {
                let start = path.iter().position(|idx| *idx == next).unwrap_or(0);
                let mut cycle: Vec<SkillId> =
                    path[start..].iter().map(|idx| self.graph[*idx].clone()).collect();
                cycle.push(self.graph[next].clone());
                return Some(cycle);
            }
        }

        on_stack.remove(&node);
        path.pop();
        None
    }

    /// Every skill, prerequisites before the skills that need them.
    pub fn topological_sort(&self) -> Result<Vec<SkillId>, SkillError> {
        self.detect_cycles()?;

        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .map_err(|cycle| SkillError::PrerequisiteCycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            })
    }

    /// Every skill transitively required by `skill`, excluding itself.
    pub fn ancestors(&self, skill: &SkillId) -> HashSet<SkillId> {
        let mut found = HashSet::new();
        let Some(&start) = self.node_map.get(skill) else {
            return found;
        };

        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for prereq in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if found.insert(self.graph[prereq].clone()) {
                    stack.push(prereq);
                }
            }
        }
        found
    }
}

impl Default for PrerequisiteGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated set of skill definitions.
///
/// Every prerequisite names a registered skill and the prerequisite graph is
/// acyclic. Both hold for the lifetime of the catalog.
///
/// # Examples
///
/// ```rust
/// use statforge::skill::{SkillCatalog, SkillDefinition};
///
/// let catalog = SkillCatalog::build([
///     SkillDefinition::new("cleave").requires_skill("slash", 2),
///     SkillDefinition::new("slash"),
/// ])
/// .unwrap();
///
/// let order = catalog.learn_order().unwrap();
/// assert_eq!(order[0].as_str(), "slash");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    definitions: BTreeMap<SkillId, SkillDefinition>,
    graph: PrerequisiteGraph,
}

impl SkillCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and index a batch of definitions.
    ///
    /// Definitions may appear in any order; prerequisites are resolved
    /// against the whole batch.
    ///
    /// # Arguments
    ///
    /// * `definitions` - Every skill in the catalog
    ///
    /// # Returns
    ///
    /// * `Ok(SkillCatalog)` - All ids unique, all prerequisites known, no cycles
    /// * `Err(SkillError::DuplicateSkill)` - Two definitions share an id
    /// * `Err(SkillError::UnknownPrerequisite)` - A prerequisite is not in the batch
    /// * `Err(SkillError::PrerequisiteCycle)` - Prerequisites form a cycle
    pub fn build(
        definitions: impl IntoIterator<Item = SkillDefinition>,
    ) -> Result<Self, SkillError> {
        let mut by_id = BTreeMap::new();
        for def in definitions {
            if by_id.contains_key(&def.id) {
                return Err(SkillError::DuplicateSkill(def.id));
            }
            by_id.insert(def.id.clone(), def);
        }

        let mut graph = PrerequisiteGraph::new();
        for def in by_id.values() {
            graph.add_node(def.id.clone());
            for prereq in &def.prerequisites {
                if !by_id.contains_key(&prereq.skill_id) {
                    return Err(SkillError::UnknownPrerequisite {
                        skill: def.id.clone(),
                        missing: prereq.skill_id.clone(),
                    });
                }
                graph.add_requirement(def.id.clone(), prereq.skill_id.clone());
            }
        }
        graph.detect_cycles()?;

        Ok(Self {
            definitions: by_id,
            graph,
        })
    }

    /// Add one definition.
    ///
    /// Its prerequisites must already be registered. On error the catalog is
    /// unchanged.
    pub fn register(&mut self, def: SkillDefinition) -> Result<(), SkillError> {
        if self.definitions.contains_key(&def.id) {
            return Err(SkillError::DuplicateSkill(def.id));
        }

        let mut graph = self.graph.clone();
        graph.add_node(def.id.clone());
        for prereq in &def.prerequisites {
            if prereq.skill_id != def.id && !self.definitions.contains_key(&prereq.skill_id) {
                return Err(SkillError::UnknownPrerequisite {
                    skill: def.id.clone(),
                    missing: prereq.skill_id.clone(),
                });
            }
            graph.add_requirement(def.id.clone(), prereq.skill_id.clone());
        }
        graph.detect_cycles()?;

        self.graph = graph;
        self.definitions.insert(def.id.clone(), def);
        Ok(())
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &SkillId) -> Option<&SkillDefinition> {
        self.definitions.get(id)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &SkillId) -> bool {
        self.definitions.contains_key(id)
    }

    /// Number of registered skills.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no skills are registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.definitions.values()
    }

    /// All skill ids, every prerequisite before its dependents.
    pub fn learn_order(&self) -> Result<Vec<SkillId>, SkillError> {
        self.graph.topological_sort()
    }

    /// Skills `id` transitively depends on, in learning order.
    pub fn prerequisite_chain(&self, id: &SkillId) -> Result<Vec<SkillId>, SkillError> {
        let ancestors = self.graph.ancestors(id);
        Ok(self
            .learn_order()?
            .into_iter()
            .filter(|skill| ancestors.contains(skill))
            .collect())
    }

    /// Skills not yet in `book` that the entity could learn right now,
    /// in learning order.
    pub fn available_to_learn(
        &self,
        profile: &AttributeProfile,
        stats: &DerivedStatSet,
        book: &SkillBook,
    ) -> Result<Vec<&SkillDefinition>, SkillError> {
        Ok(self
            .learn_order()?
            .iter()
            .filter_map(|id| self.definitions.get(id))
            .filter(|def| {
                SkillPowerResolver::learn_rejection(def, profile, stats, book).is_none()
            })
            .collect())
    }
}

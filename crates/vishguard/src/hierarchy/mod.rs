//! Department hierarchy selection for campaign audience building.
//!
//! The HR connector supplies a tree of departments where a parent's
//! `employee_count` overlaps its children's counts, so subtree headcounts
//! cannot be summed naively. Selection state lives outside the tree and the
//! aggregation walks the tree with a deterministic prefer-children rule.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Identifier wrapper for department nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartmentId(pub String);

/// One node of the HR department tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentNode {
    pub id: DepartmentId,
    pub name: String,
    /// This node's own headcount. When children exist it overlaps their
    /// counts; see [`DepartmentSelection::aggregate_headcount`].
    pub employee_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DepartmentNode>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_restricted: bool,
}

impl DepartmentNode {
    pub fn leaf(id: &str, name: &str, employee_count: u32) -> Self {
        Self {
            id: DepartmentId(id.to_string()),
            name: name.to_string(),
            employee_count,
            children: Vec::new(),
            is_restricted: false,
        }
    }
}

/// Arena over a department tree, indexed by id, built once per tree so that
/// selection operations do not rebuild ad hoc closures per call.
pub struct DepartmentIndex<'a> {
    by_id: HashMap<&'a DepartmentId, &'a DepartmentNode>,
}

impl<'a> DepartmentIndex<'a> {
    pub fn build(tree: &'a [DepartmentNode]) -> Self {
        let mut by_id = HashMap::new();
        let mut stack: Vec<&'a DepartmentNode> = tree.iter().collect();
        while let Some(node) = stack.pop() {
            by_id.insert(&node.id, node);
            stack.extend(node.children.iter());
        }
        Self { by_id }
    }

    pub fn get(&self, id: &DepartmentId) -> Option<&'a DepartmentNode> {
        self.by_id.get(id).copied()
    }
}

/// Collect a node's id together with every descendant id.
fn subtree_ids(node: &DepartmentNode) -> Vec<DepartmentId> {
    let mut ids = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        ids.push(current.id.clone());
        stack.extend(current.children.iter());
    }
    ids
}

/// Mutable selection state over a department tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentSelection {
    selected: BTreeSet<DepartmentId>,
}

impl DepartmentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &DepartmentId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> Vec<DepartmentId> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Toggle a node in or out of the selection, cascading to descendants.
    ///
    /// Deselecting removes the node and its whole subtree. Selecting adds the
    /// node and its subtree, silently skipping ids missing from the
    /// `accessible` allow-list. Restricted nodes never enter the selection,
    /// regardless of the allow-list: toggling one is a no-op, and a restricted
    /// descendant is skipped during a cascade.
    pub fn toggle(
        &mut self,
        id: &DepartmentId,
        index: &DepartmentIndex<'_>,
        accessible: &HashSet<DepartmentId>,
    ) {
        let Some(node) = index.get(id) else {
            return;
        };

        if node.is_restricted {
            return;
        }

        if self.selected.contains(id) {
            for descendant in subtree_ids(node) {
                self.selected.remove(&descendant);
            }
            return;
        }

        for candidate in subtree_ids(node) {
            let Some(candidate_node) = index.get(&candidate) else {
                continue;
            };
            if candidate_node.is_restricted || !accessible.contains(&candidate) {
                continue;
            }
            self.selected.insert(candidate);
        }
    }

    /// Derived indicator for tri-state checkboxes: some but not all direct
    /// children selected.
    pub fn is_partially_selected(&self, node: &DepartmentNode) -> bool {
        if node.children.is_empty() {
            return false;
        }
        let selected_children = node
            .children
            .iter()
            .filter(|child| self.selected.contains(&child.id))
            .count();
        selected_children > 0 && selected_children < node.children.len()
    }

    /// Headcount of the selection without double counting.
    ///
    /// A selected node with at least one selected child contributes only
    /// through its children, because the parent's own count overlaps theirs.
    /// A selected node with no selected children contributes its own count
    /// and the walk stops there. An unselected node is only a corridor to
    /// selected descendants.
    pub fn aggregate_headcount(&self, tree: &[DepartmentNode]) -> u32 {
        tree.iter().map(|node| self.headcount_of(node)).sum()
    }

    fn headcount_of(&self, node: &DepartmentNode) -> u32 {
        let children_total: u32 = node
            .children
            .iter()
            .map(|child| self.headcount_of(child))
            .sum();

        if !self.selected.contains(&node.id) {
            return children_total;
        }

        let any_child_selected = node
            .children
            .iter()
            .any(|child| self.selected.contains(&child.id));

        if any_child_selected {
            children_total
        } else {
            node.employee_count
        }
    }
}

// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::modules::label::entity::Label;
use crate::modules::label::payload::LabelNode;

/// Parent id -> child ids, built from the parent pointers of one user's labels.
///
/// Labels whose parent is missing are treated as roots (key `None`).
/// Children are ordered by lower-cased name.
pub struct LabelIndex<'a> {
    labels: HashMap<u64, &'a Label>,
    children: BTreeMap<Option<u64>, Vec<u64>>,
}

impl<'a> LabelIndex<'a> {
    pub fn new(labels: &'a [Label]) -> Self {
        let by_id: HashMap<u64, &Label> = labels.iter().map(|label| (label.id, label)).collect();
        let mut children: BTreeMap<Option<u64>, Vec<u64>> = BTreeMap::new();
        for label in labels {
            let parent = label.parent_id.filter(|id| by_id.contains_key(id));
            children.entry(parent).or_default().push(label.id);
        }
        for ids in children.values_mut() {
            ids.sort_by_key(|id| {
                by_id
                    .get(id)
                    .map(|label| label.name.to_lowercase())
                    .unwrap_or_default()
            });
        }
        Self {
            labels: by_id,
            children,
        }
    }

    pub fn get(&self, id: u64) -> Option<&'a Label> {
        self.labels.get(&id).copied()
    }

    fn children_of(&self, parent: Option<u64>) -> &[u64] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `root` and all of its descendants, every child listed before its parent.
    pub fn subtree_deepest_first(&self, root: u64) -> Vec<u64> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.children_of(Some(id)).iter().copied());
        }
        order.reverse();
        order
    }

    /// Whether `ancestor` appears on the parent chain starting at `start` (inclusive).
    pub fn is_ancestor_or_self(&self, ancestor: u64, start: u64) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.get(id).and_then(|label| label.parent_id);
        }
        false
    }

    /// Nested nodes for every root, children in name order.
    pub fn build_tree(&self) -> Vec<LabelNode> {
        // pre-order walk, then assemble bottom-up so no recursion is needed
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<u64> = self.children_of(None).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.children_of(Some(id)).iter().rev().copied());
        }

        let mut built: HashMap<u64, LabelNode> = HashMap::new();
        for id in order.iter().rev() {
            let Some(label) = self.get(*id) else {
                continue;
            };
            let mut node = LabelNode::from(label);
            node.children = self
                .children_of(Some(*id))
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(*id, node);
        }
        self.children_of(None)
            .iter()
            .filter_map(|id| built.remove(id))
            .collect()
    }
}

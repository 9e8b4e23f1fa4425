use crate::types::{ID_ATTR, Node};
use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-batch serial mixed into generated ids so that nodes created by
/// separate load operations never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BatchSerial(u64);

impl BatchSerial {
    /// Serial derived from the wall clock (milliseconds since the Unix epoch).
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    pub const fn fixed(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// Pre-order, depth-first, left-to-right iterator over a tree, root first.
pub struct Preorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

pub fn preorder(root: &Node) -> Preorder<'_> {
    Preorder { stack: vec![root] }
}

/// Give every node without an id the id `"{tag}{index}-{serial}"`, where
/// `index` is the node's pre-order position. A node whose id already appeared
/// earlier in pre-order gets a fresh id the same way.
///
/// Unique ids are left alone, so a second run over the same tree is a no-op.
pub fn assign_ids(root: &mut Node, serial: BatchSerial) -> usize {
    let mut taken: HashSet<String> = preorder(root)
        .filter_map(|n| n.id().map(str::to_string))
        .collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut assigned = 0usize;
    let mut stack: Vec<&mut Node> = vec![root];
    let mut index = 0usize;

    while let Some(node) = stack.pop() {
        let keep = match node.id() {
            Some(id) => seen.insert(id.to_string()),
            None => false,
        };
        if !keep {
            if let Some(dup) = node.id() {
                log::warn!(target: "script.identity", "duplicate id {dup:?} on <{}>, re-assigning", node.tag());
            }
            let base = format!("{}{}-{:x}", node.tag(), index, serial.as_raw());
            let mut candidate = base.clone();
            let mut bump = 1usize;
            while taken.contains(&candidate) {
                candidate = format!("{base}-{bump}");
                bump += 1;
            }
            taken.insert(candidate.clone());
            seen.insert(candidate.clone());
            node.set_attr(ID_ATTR.to_string(), candidate);
            assigned += 1;
        }
        index += 1;
        stack.extend(node.children_mut().iter_mut().rev());
    }

    if assigned > 0 {
        log::debug!(target: "script.identity", "assigned {assigned} ids (batch {:x})", serial.as_raw());
    }
    assigned
}

pub fn find_node_by_id<'a>(node: &'a Node, id: &str) -> Option<&'a Node> {
    preorder(node).find(|n| n.id() == Some(id))
}

pub fn find_node_by_id_mut<'a>(node: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        if node.id() == Some(id) {
            return Some(node);
        }
        stack.extend(node.children_mut().iter_mut().rev());
    }
    None
}

/// Detach the node with `id` (and its subtree) from below `node`.
///
/// The node passed in is never removed itself.
pub fn remove_node_by_id(node: &mut Node, id: &str) -> Option<Node> {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        let children = node.children_mut();
        if let Some(pos) = children.iter().position(|c| c.id() == Some(id)) {
            return Some(children.remove(pos));
        }
        stack.extend(children.iter_mut().rev());
    }
    None
}

/// Nesting level of the node with `id`, the root being level 1.
pub fn depth_of(root: &Node, id: &str) -> Option<usize> {
    let mut stack = vec![(root, 1usize)];
    while let Some((node, depth)) = stack.pop() {
        if node.id() == Some(id) {
            return Some(depth);
        }
        stack.extend(node.children().iter().rev().map(|c| (c, depth + 1)));
    }
    None
}

/// Map every identified node by id. Later duplicates do not replace earlier
/// ones; trees that went through [`assign_ids`] have none.
pub fn index_tree(root: &Node) -> HashMap<&str, &Node> {
    let mut out = HashMap::new();
    for node in preorder(root) {
        if let Some(id) = node.id() {
            out.entry(id).or_insert(node);
        }
    }
    out
}

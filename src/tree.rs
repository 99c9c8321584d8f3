//! Prerequisite forest construction
//!
//! The server returns a session's prerequisite nodes as a flat list in which
//! each node may reference its parent by id. [`build_forest`] turns that list
//! into owned trees for rendering.
//!
//! Guarantees:
//!
//! - Every input node appears exactly once in the output, either as a root or
//!   as the child of exactly one parent.
//! - Roots and each `children` list keep the relative order of the input.
//! - A node whose `parent_id` is missing from the input, or equal to its own
//!   id, is a root.
//! - Nodes caught in a parent cycle with no path to a root are reattached by
//!   promoting the cycle member that comes first in the input to a root.
//!
//! Depth is unbounded. Construction, traversal, cloning, comparison and
//! dropping are all iterative, so arbitrarily deep chains do not grow the
//! call stack.

use std::collections::HashMap;
use std::fmt;

use crate::models::PrerequisiteNode;

/// A prerequisite node together with its resolved children.
pub struct TreeNode {
    pub node: PrerequisiteNode,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            total += 1;
            stack.extend(current.children.iter());
        }
        total
    }

    /// Depth-first, pre-order walk calling `visit(node, depth)` for every node.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&TreeNode, usize),
    {
        for (current, depth) in self.preorder() {
            visit(current, depth);
        }
    }

    /// Every node of this subtree in pre-order, paired with its depth
    /// relative to `self`.
    pub fn preorder(&self) -> Vec<(&TreeNode, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(self, 0usize)];
        while let Some((current, depth)) = stack.pop() {
            out.push((current, depth));
            // Reverse so the first child is visited first.
            for child in current.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        // `open[d]` is the node being filled at depth `d` on the current path.
        let mut open: Vec<TreeNode> = Vec::new();
        for (current, depth) in self.preorder() {
            close_path(&mut open, depth);
            open.push(TreeNode {
                node: current.node.clone(),
                children: Vec::with_capacity(current.children.len()),
            });
        }
        close_path(&mut open, 1);
        match open.pop() {
            Some(root) => root,
            None => TreeNode {
                node: self.node.clone(),
                children: Vec::new(),
            },
        }
    }
}

/// Shorten the open path to `len` nodes (never below the root), attaching
/// each finished node to its parent.
fn close_path(open: &mut Vec<TreeNode>, len: usize) {
    while open.len() > len.max(1) {
        if let Some(done) = open.pop() {
            if let Some(parent) = open.last_mut() {
                parent.children.push(done);
            }
        }
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let left = self.preorder();
        let right = other.preorder();
        left.len() == right.len()
            && left
                .iter()
                .zip(right.iter())
                .all(|((a, da), (b, db))| da == db && a.node == b.node)
    }
}

impl Eq for TreeNode {}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("node", &self.node)
            .field("children", &self.children.len())
            .field("size", &self.size())
            .finish()
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Total number of nodes in a forest.
pub fn count_nodes(forest: &[TreeNode]) -> usize {
    forest.iter().map(TreeNode::size).sum()
}

/// Build a forest from a flat, parent-referenced node list.
///
/// # Examples
///
/// ```
/// use learnmap::models::PrerequisiteNode;
/// use learnmap::tree::build_forest;
///
/// let node = |id, name: &str, parent_id| PrerequisiteNode {
///     id,
///     name: name.to_string(),
///     description: None,
///     parent_id,
///     wikipedia_summary: None,
///     wikipedia_url: None,
/// };
///
/// let forest = build_forest(&[
///     node(1, "Algebra", None),
///     node(2, "Calculus", Some(1)),
///     node(4, "Orphan", Some(99)),
/// ]);
///
/// assert_eq!(forest.len(), 2);
/// assert_eq!(forest[0].children[0].node.name, "Calculus");
/// ```
pub fn build_forest(nodes: &[PrerequisiteNode]) -> Vec<TreeNode> {
    if nodes.is_empty() {
        return Vec::new();
    }

    // id -> index of the first node carrying that id
    let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        index_of.entry(node.id).or_insert(idx);
    }

    let mut parent: Vec<Option<usize>> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            node.parent_id
                .and_then(|pid| index_of.get(&pid).copied())
                .filter(|&pidx| pidx != idx)
        })
        .collect();

    break_cycles(&mut parent);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (idx, p) in parent.iter().enumerate() {
        match p {
            Some(pidx) => children[*pidx].push(idx),
            None => roots.push(idx),
        }
    }

    // Post-order so every child is assembled before its parent.
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((idx, expanded)) = stack.pop() {
        if expanded {
            order.push(idx);
            continue;
        }
        stack.push((idx, true));
        for &child in children[idx].iter().rev() {
            stack.push((child, false));
        }
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; nodes.len()];
    for idx in order {
        let kids = children[idx]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[idx] = Some(TreeNode {
            node: nodes[idx].clone(),
            children: kids,
        });
    }

    roots.into_iter().filter_map(|r| built[r].take()).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Detach one member of every parent cycle so that all chains end at a root.
fn break_cycles(parent: &mut [Option<usize>]) {
    let mut mark = vec![Mark::Unvisited; parent.len()];
    let mut path = Vec::new();

    for start in 0..parent.len() {
        if mark[start] != Mark::Unvisited {
            continue;
        }

        let mut current = Some(start);
        while let Some(idx) = current {
            match mark[idx] {
                Mark::Done => break,
                Mark::OnPath => {
                    let pos = path.iter().position(|&p| p == idx).unwrap_or(0);
                    if let Some(&first) = path[pos..].iter().min() {
                        parent[first] = None;
                    }
                    break;
                }
                Mark::Unvisited => {
                    mark[idx] = Mark::OnPath;
                    path.push(idx);
                    current = parent[idx];
                }
            }
        }

        for idx in path.drain(..) {
            mark[idx] = Mark::Done;
        }
    }
}

//! Read-only traversals over the include graph.

use std::collections::VecDeque;

use crate::node::NodeId;
use crate::store::NodeStore;

impl NodeStore {
    /// Every node reachable from `start` through include edges, excluding
    /// `start` itself unless it lies on a cycle back to itself.
    ///
    /// Breadth-first, so nearer includes come first; ties follow dependency
    /// order.
    pub fn transitive_dependencies(&self, start: NodeId) -> Vec<NodeId> {
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::new();
        let mut out = Vec::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for dep in self.node(current).dependencies() {
                if !seen[dep.index()] {
                    seen[dep.index()] = true;
                    out.push(dep);
                    queue.push_back(dep);
                }
            }
        }
        out
    }

    /// Nodes with a direct edge to `target`, in insertion order.
    pub fn dependents(&self, target: NodeId) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.node(id).depends_on(target))
            .collect()
    }

    /// Nodes that reach `target` through one or more edges, in insertion
    /// order. These are the files that must be rebuilt when `target` changes.
    pub fn transitive_dependents(&self, target: NodeId) -> Vec<NodeId> {
        let mut reverse: Vec<Vec<NodeId>> = vec![Vec::new(); self.len()];
        for id in self.ids() {
            for dep in self.node(id).dependencies() {
                reverse[dep.index()].push(id);
            }
        }

        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::from([target]);
        while let Some(current) = queue.pop_front() {
            for &parent in &reverse[current.index()] {
                if !seen[parent.index()] {
                    seen[parent.index()] = true;
                    queue.push_back(parent);
                }
            }
        }
        self.ids().filter(|id| seen[id.index()]).collect()
    }

    /// Returns one include cycle if the graph has any.
    ///
    /// The cycle is listed from its entry node along the edges that form it;
    /// the last node has an edge back to the first. A self-include is a
    /// one-node cycle. Roots are tried in insertion order.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.len()];
        // (node, index of the next dependency to visit)
        let mut path: Vec<(NodeId, usize)> = Vec::new();

        for root in self.ids() {
            if marks[root.index()] != Mark::Unvisited {
                continue;
            }
            marks[root.index()] = Mark::OnPath;
            path.push((root, 0));

            while let Some(top) = path.last_mut() {
                let (node, next) = *top;
                let Some(dep) = self.node(node).dependencies().nth(next) else {
                    marks[node.index()] = Mark::Done;
                    path.pop();
                    continue;
                };
                top.1 += 1;

                match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::OnPath;
                        path.push((dep, 0));
                    }
                    Mark::OnPath => {
                        let start = path.iter().position(|&(id, _)| id == dep)?;
                        return Some(path[start..].iter().map(|&(id, _)| id).collect());
                    }
                    Mark::Done => {}
                }
            }
        }
        None
    }

    /// The `.c` file paired with header `header`, found by basename anywhere
    /// in the store.
    ///
    /// `foo.h` pairs with the first `foo.c` in [`find_by_name`] order. Returns
    /// `None` for nodes that are not headers.
    ///
    /// [`find_by_name`]: NodeStore::find_by_name
    pub fn companion_source(&self, header: NodeId) -> Option<NodeId> {
        let stem = self.node(header).name().strip_suffix(".h")?;
        self.find_by_name(&format!("{stem}.c"))
    }
}

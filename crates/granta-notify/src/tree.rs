//! Cycle-guarded traversal over the organizational tree.
//!
//! Parent references are plain nullable ids, so nothing at write time
//! proves the relation acyclic. Traversal is iterative breadth-first
//! with an explicit visited set: a revisit means the start node sits
//! inside a cycle (or the data is corrupt), and the walk fails with
//! [`GrantaError::HierarchyCycle`] instead of looping.

use std::collections::{HashSet, VecDeque};

use granta_core::error::{GrantaError, GrantaResult};
use granta_core::models::hierarchy::HierarchyNode;
use granta_core::repository::HierarchyNodeRepository;
use uuid::Uuid;

/// Read-only traversal over hierarchy nodes.
#[derive(Clone)]
pub struct HierarchyWalker<H: HierarchyNodeRepository> {
    nodes: H,
}

impl<H: HierarchyNodeRepository> HierarchyWalker<H> {
    pub fn new(nodes: H) -> Self {
        Self { nodes }
    }

    /// Direct children of the node. An absent node yields an empty
    /// set, not an error: the node may have been deleted after
    /// something referenced it.
    pub async fn children(&self, node_id: Uuid) -> GrantaResult<Vec<HierarchyNode>> {
        self.nodes.children(node_id).await
    }

    /// Every node id transitively under `node_id`, excluding the node
    /// itself, in breadth-first order.
    pub async fn descendants(&self, node_id: Uuid) -> GrantaResult<Vec<Uuid>> {
        let mut visited: HashSet<Uuid> = HashSet::from([node_id]);
        let mut queue: VecDeque<Uuid> = VecDeque::from([node_id]);
        let mut collected = Vec::new();

        while let Some(current) = queue.pop_front() {
            for child in self.nodes.children(current).await? {
                if !visited.insert(child.id) {
                    return Err(GrantaError::HierarchyCycle { node_id: child.id });
                }
                collected.push(child.id);
                queue.push_back(child.id);
            }
        }

        Ok(collected)
    }
}

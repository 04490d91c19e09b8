//! # Scene Interface Module
//!
//! This module defines the narrow seam between the placement toolkit and the
//! host application's scene graph. The toolkit never owns scene nodes; it
//! refers to them through opaque [`NodeId`] handles and mutates them through
//! the [`SceneDelegate`] trait the host implements.
//!
//! ## Key Components
//!
//! - [`NodeId`] - Opaque, non-owning handle to a host scene node
//! - [`SceneDelegate`] - Scene mutation and node position access
//! - [`SceneError`] - Errors the host can report at the seam
//!
//! ## Usage
//!
//! ```no_run
//! use maquette::gfx::scene::{NodeId, SceneDelegate, SceneError};
//! use cgmath::Vector3;
//!
//! struct MyScene { /* host scene graph */ }
//!
//! impl SceneDelegate for MyScene {
//!     fn add_node(&mut self, node: NodeId) -> Result<(), SceneError> { Ok(()) }
//!     fn remove_node(&mut self, node: NodeId) -> Result<(), SceneError> { Ok(()) }
//!     fn node_position(&self, node: NodeId) -> Option<Vector3<f32>> { None }
//!     fn set_node_position(&mut self, node: NodeId, position: Vector3<f32>) -> bool { false }
//!     fn node_ids(&self) -> Vec<NodeId> { Vec::new() }
//! }
//! ```

use cgmath::Vector3;
use thiserror::Error;

use crate::gfx::picking::Aabb;

/// Opaque handle to a node owned by the host scene graph.
///
/// Handles are non-owning: the host may drop the node at any time, after which
/// the handle is stale. Stale handles are routinely skipped by the toolkit,
/// never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Errors a [`SceneDelegate`] implementation can report.
///
/// These are logged by the toolkit rather than propagated; a failed scene
/// mutation during interactive use degrades to a no-op.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The handle does not refer to a live node in the scene.
    #[error("node {0:?} is not part of the scene")]
    UnknownNode(NodeId),
    /// The node is already registered with the scene.
    #[error("node {0:?} is already part of the scene")]
    DuplicateNode(NodeId),
}

/// Scene mutation interface implemented by the host.
///
/// This is the only way the toolkit touches the scene graph: explicit
/// add/remove plus a position get/set capability for placeable nodes. Nodes
/// without a world position (or stale handles) answer `None`/`false` and are
/// skipped by selection and drag logic.
pub trait SceneDelegate {
    /// Registers a node handle (previously produced by the host's node
    /// creation callback) with the scene.
    fn add_node(&mut self, node: NodeId) -> Result<(), SceneError>;

    /// Removes a node from the scene.
    fn remove_node(&mut self, node: NodeId) -> Result<(), SceneError>;

    /// World position of a node, or `None` if the handle is stale or the node
    /// has no position.
    fn node_position(&self, node: NodeId) -> Option<Vector3<f32>>;

    /// Moves a node to a world position. Returns `false` for stale or
    /// non-positionable handles.
    fn set_node_position(&mut self, node: NodeId, position: Vector3<f32>) -> bool;

    /// World-space bounds of a node, used for click picking. Hosts without
    /// bounds information can leave the default.
    fn node_bounds(&self, _node: NodeId) -> Option<Aabb> {
        None
    }

    /// All live node handles, used for picking traversal.
    fn node_ids(&self) -> Vec<NodeId>;
}

/// Host callback producing a new node at a world position.
///
/// Single registration, matching the one-listener-per-event design of the
/// toolkit. The host returns the handle of the node it created, or an error
/// (logged, not propagated) when creation fails.
pub type NodeCreationCallback = Box<dyn FnMut(Vector3<f32>) -> anyhow::Result<NodeId>>;

/// Host callback invoked when the active selection changes to a node.
pub type NodeSelectionCallback = Box<dyn FnMut(NodeId)>;

/// Host callback invoked for each node moved by a drag update.
pub type NodeMovedCallback = Box<dyn FnMut(NodeId, Vector3<f32>)>;

/// Host callback invoked whenever the placement cursor moves.
pub type CursorMovedCallback = Box<dyn FnMut(Vector3<f32>)>;

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use cgmath::Vector3;

    use super::{NodeId, SceneDelegate, SceneError};
    use crate::gfx::picking::Aabb;

    /// Minimal in-memory scene used across the crate's unit tests.
    pub struct TestScene {
        nodes: BTreeMap<u64, (Vector3<f32>, Option<Aabb>)>,
        pub added: Vec<NodeId>,
        pub removed: Vec<NodeId>,
    }

    impl TestScene {
        pub fn new() -> Self {
            Self {
                nodes: BTreeMap::new(),
                added: Vec::new(),
                removed: Vec::new(),
            }
        }

        pub fn insert(&mut self, id: u64, position: Vector3<f32>) -> NodeId {
            self.nodes.insert(id, (position, None));
            NodeId(id)
        }

        pub fn insert_with_bounds(
            &mut self,
            id: u64,
            position: Vector3<f32>,
            half_extent: f32,
        ) -> NodeId {
            let half = Vector3::new(half_extent, half_extent, half_extent);
            self.nodes
                .insert(id, (position, Some(Aabb::new(position - half, position + half))));
            NodeId(id)
        }

        pub fn position(&self, id: NodeId) -> Vector3<f32> {
            self.nodes[&id.0].0
        }
    }

    impl SceneDelegate for TestScene {
        fn add_node(&mut self, node: NodeId) -> Result<(), SceneError> {
            if self.nodes.contains_key(&node.0) {
                return Err(SceneError::DuplicateNode(node));
            }
            self.nodes.insert(node.0, (Vector3::new(0.0, 0.0, 0.0), None));
            self.added.push(node);
            Ok(())
        }

        fn remove_node(&mut self, node: NodeId) -> Result<(), SceneError> {
            self.nodes
                .remove(&node.0)
                .ok_or(SceneError::UnknownNode(node))?;
            self.removed.push(node);
            Ok(())
        }

        fn node_position(&self, node: NodeId) -> Option<Vector3<f32>> {
            self.nodes.get(&node.0).map(|(position, _)| *position)
        }

        fn set_node_position(&mut self, node: NodeId, position: Vector3<f32>) -> bool {
            match self.nodes.get_mut(&node.0) {
                Some(entry) => {
                    entry.0 = position;
                    true
                }
                None => false,
            }
        }

        fn node_bounds(&self, node: NodeId) -> Option<Aabb> {
            self.nodes.get(&node.0).and_then(|(_, bounds)| *bounds)
        }

        fn node_ids(&self) -> Vec<NodeId> {
            self.nodes.keys().map(|&id| NodeId(id)).collect()
        }
    }
}

//! Directed, mutable assembly of a kinematic tree. Joints can be added in any order as long as
//! their parent exists. [JointTreeBuilder::build] sorts the arena in depth-first order and freezes
//! it into a [KinematicTree].

use super::{utils::invert_permutation, utils::sort_by_indices, Joint, JointIndex, KinematicTree, UNIVERSE};
use crate::{
    joint::{Inertia, JointKind},
    registry::LieGroupRegistry,
    KinematicsError,
};
use itertools::Itertools;
use nalgebra::Isometry3;
use std::collections::HashMap;
use tracing::debug;
use tracing_attributes::instrument;

/// A node of the builder's arena. Fields are used to speed up the depth-first freeze
#[derive(Debug)]
pub(super) struct BuilderNode {
    name: String,
    kind: JointKind,
    placement: Isometry3<f64>,
    inertia: Inertia,
    /// Index in the arena allocation
    index: JointIndex,
    /// references for children
    children: Vec<JointIndex>,
    /// Size of the subtree rooted at this node (the node included)
    width: usize,
    /// Depth in the tree
    depth: usize,
    parent_ref: Option<JointIndex>,
}

/// Mutable tree of joints. The root is the universe, which has no degrees of freedom and no mass.
#[derive(Debug)]
pub struct JointTreeBuilder {
    nodes: Vec<BuilderNode>,
    max_depth: usize,
    lookup: HashMap<String, JointIndex>,
}

impl JointTreeBuilder {
    pub fn new() -> Self {
        let universe = BuilderNode {
            name: UNIVERSE.to_string(),
            kind: JointKind::Composite(vec![]),
            placement: Isometry3::identity(),
            inertia: Inertia::zero(),
            index: 0,
            children: vec![],
            width: 1,
            depth: 0,
            parent_ref: None,
        };
        JointTreeBuilder {
            nodes: vec![universe],
            max_depth: 0,
            lookup: HashMap::from([(UNIVERSE.to_string(), 0)]),
        }
    }

    /// Number of joints added so far (universe included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the universe is present from the start
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a joint below `parent` (use [UNIVERSE] for the root joint(s)).
    ///
    /// `placement` is the joint frame relative to the parent joint frame and `inertia` describes the
    /// body attached to the joint. Returns the name of the new joint, which can be used as a parent.
    pub fn add(
        &mut self,
        name: &str,
        kind: JointKind,
        placement: Isometry3<f64>,
        inertia: Inertia,
        parent: &str,
    ) -> Result<String, KinematicsError> {
        let parent_index = *self
            .lookup
            .get(parent)
            .ok_or_else(|| KinematicsError::UnknownJoint(parent.to_string()))?;

        // First check whether we can add the node (name not used yet)
        if self.lookup.contains_key(name) {
            return Err(KinematicsError::NotUnique(name.to_string()));
        }
        let index = self.nodes.len();

        let mut node = self
            .nodes
            .get_mut(parent_index)
            .ok_or(KinematicsError::ReferenceOutOfBound(parent_index))?;
        node.children.push(index);
        node.width += 1;
        let depth = node.depth + 1;

        // update the width of all ancestors
        while let Some(parent_ref) = node.parent_ref {
            node = self
                .nodes
                .get_mut(parent_ref)
                .ok_or(KinematicsError::ReferenceOutOfBound(parent_ref))?;
            node.width += 1;
        }

        self.max_depth = self.max_depth.max(depth);
        self.lookup.insert(name.to_string(), index);
        self.nodes.push(BuilderNode {
            name: name.to_string(),
            kind,
            placement,
            inertia,
            index,
            children: vec![],
            width: 1,
            depth,
            parent_ref: Some(parent_index),
        });
        Ok(name.to_string())
    }

    /// Given an arena, update the references to other nodes when the arena is reordered. `order[i]`
    /// is the old index of the node that moves to position `i`.
    fn update_indices(nodes: &mut [BuilderNode], order: &[JointIndex]) {
        let new_index = invert_permutation(order);
        nodes.iter_mut().for_each(|node| {
            node.children.iter_mut().for_each(|child| *child = new_index[*child]);
            node.parent_ref = node.parent_ref.map(|parent| new_index[parent]);
            node.index = new_index[node.index];
        });
    }

    /// Sorts the joints in depth-first order and freezes the tree. Every joint kind is resolved to
    /// its Lie group operation through `registry` and the joint limits are set to the defaults of
    /// these operations.
    #[instrument(skip_all)]
    pub fn build(mut self, registry: &LieGroupRegistry) -> Result<KinematicTree, KinematicsError> {
        let optimal_order = DepthFirstIterator::new(&self, 0).map(|node| node.index).collect_vec();
        if optimal_order.len() != self.nodes.len() {
            return Err(KinematicsError::RootNotSet);
        }
        Self::update_indices(&mut self.nodes, &optimal_order);
        sort_by_indices(&mut self.nodes, optimal_order);

        let (mut nq, mut nv) = (0, 0);
        let mut joints = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            let operation = registry.operation(&node.kind)?;
            let q = nq..nq + operation.nq();
            let v = nv..nv + operation.nv();
            (nq, nv) = (q.end, v.end);
            joints.push(Joint {
                name: node.name,
                index: node.index,
                kind: node.kind,
                operation,
                placement: node.placement,
                inertia: node.inertia,
                parent: node.parent_ref.unwrap_or(0),
                depth: node.depth,
                last_descendant: node.index + node.width - 1,
                children: node.children,
                q,
                v,
            });
        }

        let mut lower = vec![0.0; nq];
        let mut upper = vec![0.0; nq];
        for joint in &joints {
            joint
                .operation
                .default_bounds(&mut lower[joint.q.clone()], &mut upper[joint.q.clone()])?;
        }

        let lookup = joints.iter().map(|joint| (joint.name.clone(), joint.index)).collect();
        debug!(
            "Built kinematic tree with {} joints (nq = {nq}, nv = {nv}, depth = {})",
            joints.len(),
            self.max_depth
        );
        Ok(KinematicTree {
            joints,
            lookup,
            nq,
            nv,
            lower,
            upper,
        })
    }
}

impl Default for JointTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iteration over the (unsorted) arena of a builder
struct DepthFirstIterator<'a> {
    builder: &'a JointTreeBuilder,
    stack: Vec<std::slice::Iter<'a, JointIndex>>,
    root: Option<JointIndex>,
}

impl<'a> DepthFirstIterator<'a> {
    fn new(builder: &'a JointTreeBuilder, root: JointIndex) -> Self {
        DepthFirstIterator {
            builder,
            stack: Vec::with_capacity(builder.max_depth + 1),
            root: Some(root),
        }
    }
}

impl<'a> Iterator for DepthFirstIterator<'a> {
    type Item = &'a BuilderNode;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            let root = &self.builder.nodes[root];
            self.stack.push(root.children.iter());
            return Some(root);
        }
        loop {
            let last = self.stack.last_mut()?;
            if let Some(child_ref) = last.next() {
                let node = &self.builder.nodes[*child_ref];
                self.stack.push(node.children.iter());
                return Some(node);
            }
            self.stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Axis;

    fn revolute(builder: &mut JointTreeBuilder, name: &str, parent: &str) {
        builder
            .add(name, JointKind::Revolute(Axis::Z), Isometry3::identity(), Inertia::zero(), parent)
            .unwrap();
    }

    #[test_log::test]
    fn test_adding() {
        let mut builder = JointTreeBuilder::new();
        revolute(&mut builder, "a", UNIVERSE);
        revolute(&mut builder, "b", "a");
        revolute(&mut builder, "c", "universe");
        revolute(&mut builder, "d", "b");
        assert_eq!(builder.len(), 5);
        assert_eq!(builder.nodes[0].width, 5);
        assert_eq!(builder.nodes[1].width, 3);
        assert_eq!(builder.nodes[4].depth, 3);

        assert!(matches!(
            builder.add("e", JointKind::Spherical, Isometry3::identity(), Inertia::zero(), "x"),
            Err(KinematicsError::UnknownJoint(name)) if name == "x"
        ));
        assert!(matches!(
            builder.add("a", JointKind::Spherical, Isometry3::identity(), Inertia::zero(), "c"),
            Err(KinematicsError::NotUnique(name)) if name == "a"
        ));
    }

    #[test_log::test]
    fn test_depth_first_iteration() {
        // universe - a - b - d
        //          \ c - e
        //              \ f
        let mut builder = JointTreeBuilder::new();
        revolute(&mut builder, "a", UNIVERSE);
        revolute(&mut builder, "c", UNIVERSE);
        revolute(&mut builder, "e", "c");
        revolute(&mut builder, "b", "a");
        revolute(&mut builder, "f", "c");
        revolute(&mut builder, "d", "b");

        let names = DepthFirstIterator::new(&builder, 0)
            .map(|node| node.name.as_str())
            .collect_vec();
        assert_eq!(names, vec![UNIVERSE, "a", "b", "d", "c", "e", "f"]);

        let names = DepthFirstIterator::new(&builder, 2)
            .map(|node| node.name.as_str())
            .collect_vec();
        assert_eq!(names, vec!["c", "e", "f"]);
    }

    #[test_log::test]
    fn test_unregistered_kind_aborts_build() {
        let mut builder = JointTreeBuilder::new();
        builder
            .add("ball", JointKind::Spherical, Isometry3::identity(), Inertia::zero(), UNIVERSE)
            .unwrap();
        let registry = LieGroupRegistry::empty();
        assert!(matches!(
            builder.build(&registry),
            Err(KinematicsError::UnsupportedJointKind(_))
        ));
    }
}

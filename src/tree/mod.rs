//! Kinematic trees stored in an arena sorted in depth-first order.
//!
//! A tree is assembled with a [JointTreeBuilder] and frozen into a [KinematicTree]. Freezing
//! renumbers the joints such that every subtree occupies a contiguous index range
//! `[id, last_descendant(id)]` and a parent always precedes its children. The universe (the fixed
//! base) has index 0. The configuration and velocity vectors of the whole tree are the
//! concatenation of the joints' vectors in the same order.

pub mod builder;
mod utils;

pub use builder::JointTreeBuilder;

use crate::{
    errors::check_size,
    joint::{Inertia, JointKind, Motion},
    liegroup::OperationRef,
    KinematicsError,
};
use itertools::izip;
use nalgebra::Isometry3;
use std::{collections::HashMap, ops::Range, ops::RangeInclusive};

/// Index of a joint in a [KinematicTree]
pub type JointIndex = usize;

/// Name of the root of every tree
pub const UNIVERSE: &str = "universe";

/// A joint and the body attached to it. Read-only after the tree is built.
#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    index: JointIndex,
    kind: JointKind,
    operation: OperationRef,
    placement: Isometry3<f64>,
    inertia: Inertia,
    parent: JointIndex,
    depth: usize,
    last_descendant: JointIndex,
    children: Vec<JointIndex>,
    q: Range<usize>,
    v: Range<usize>,
}

impl Joint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> JointIndex {
        self.index
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    /// The Lie group operation acting on this joint's configuration
    pub fn operation(&self) -> &OperationRef {
        &self.operation
    }

    /// Motion subspace in the joint frame, consistent with the joint's operation
    /// (see [JointKind::motion_subspace_for])
    pub fn motion_subspace(&self, q: &[f64], out: &mut [Motion]) -> Result<(), KinematicsError> {
        self.kind.motion_subspace_for(self.operation.as_ref(), q, out)
    }

    /// Joint frame relative to the parent joint frame (for a neutral configuration)
    pub fn placement(&self) -> &Isometry3<f64> {
        &self.placement
    }

    pub fn inertia(&self) -> &Inertia {
        &self.inertia
    }

    /// Index of the parent. The universe is its own parent.
    pub fn parent(&self) -> JointIndex {
        self.parent
    }

    /// The parent joint unless the parent is the universe
    pub fn parent_joint(&self) -> Option<JointIndex> {
        (self.parent != 0).then_some(self.parent)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn last_descendant(&self) -> JointIndex {
        self.last_descendant
    }

    pub fn children(&self) -> &[JointIndex] {
        &self.children
    }

    /// Size of the configuration vector
    pub fn nq(&self) -> usize {
        self.q.len()
    }

    /// Number of degrees of freedom
    pub fn nv(&self) -> usize {
        self.v.len()
    }

    /// Slice of the joint in the tree's configuration vector
    pub fn config_range(&self) -> Range<usize> {
        self.q.clone()
    }

    /// Slice of the joint in the tree's velocity vector
    pub fn velocity_range(&self) -> Range<usize> {
        self.v.clone()
    }

    /// Whether `other` is in the subtree rooted at this joint (this joint included)
    pub fn contains(&self, other: JointIndex) -> bool {
        self.index <= other && other <= self.last_descendant
    }
}

/// Immutable tree of joints sorted in depth-first order. Only the joint limits can be changed.
#[derive(Debug, Clone)]
pub struct KinematicTree {
    joints: Vec<Joint>,
    lookup: HashMap<String, JointIndex>,
    nq: usize,
    nv: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl KinematicTree {
    /// Number of joints (universe included)
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Always false: the universe is part of every tree
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Size of the configuration vector
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Size of the velocity vector
    pub fn nv(&self) -> usize {
        self.nv
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, id: JointIndex) -> Result<&Joint, KinematicsError> {
        self.joints.get(id).ok_or(KinematicsError::ReferenceOutOfBound(id))
    }

    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.lookup.get(name).map(|&id| &self.joints[id])
    }

    pub fn parent_of(&self, id: JointIndex) -> Result<JointIndex, KinematicsError> {
        Ok(self.joint(id)?.parent)
    }

    pub fn children_of(&self, id: JointIndex) -> Result<&[JointIndex], KinematicsError> {
        Ok(&self.joint(id)?.children)
    }

    /// Largest index in the subtree rooted at `id`
    pub fn subtree_last_descendant(&self, id: JointIndex) -> Result<JointIndex, KinematicsError> {
        Ok(self.joint(id)?.last_descendant)
    }

    /// All indices of the subtree rooted at `id`
    pub fn subtree(&self, id: JointIndex) -> Result<RangeInclusive<JointIndex>, KinematicsError> {
        Ok(id..=self.subtree_last_descendant(id)?)
    }

    pub fn config_range(&self, id: JointIndex) -> Result<Range<usize>, KinematicsError> {
        Ok(self.joint(id)?.config_range())
    }

    pub fn velocity_range(&self, id: JointIndex) -> Result<Range<usize>, KinematicsError> {
        Ok(self.joint(id)?.velocity_range())
    }

    /// Configuration with every joint at its neutral element
    pub fn neutral_configuration(&self) -> Result<Vec<f64>, KinematicsError> {
        let mut result = vec![0.0; self.nq];
        for joint in &self.joints {
            joint.operation.neutral(&mut result[joint.config_range()])?;
        }
        Ok(result)
    }

    /// Moves the configuration `q` of the whole tree along `v`, joint by joint.
    pub fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, q.len())?;
        check_size(self.nv, v.len())?;
        check_size(self.nq, out.len())?;
        self.joints.iter().try_for_each(|joint| {
            joint
                .operation
                .integrate(&q[joint.config_range()], &v[joint.velocity_range()], &mut out[joint.config_range()])
        })
    }

    /// Velocity `v` such that `integrate(q0, v) == q1`
    pub fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, q1.len())?;
        check_size(self.nq, q0.len())?;
        check_size(self.nv, out.len())?;
        self.joints.iter().try_for_each(|joint| {
            joint.operation.difference(
                &q1[joint.config_range()],
                &q0[joint.config_range()],
                &mut out[joint.velocity_range()],
            )
        })
    }

    pub fn interpolate(&self, q0: &[f64], q1: &[f64], alpha: f64, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, q0.len())?;
        check_size(self.nq, q1.len())?;
        check_size(self.nq, out.len())?;
        self.joints.iter().try_for_each(|joint| {
            joint.operation.interpolate(
                &q0[joint.config_range()],
                &q1[joint.config_range()],
                alpha,
                &mut out[joint.config_range()],
            )
        })
    }

    /// Combined distance `sqrt(Σ d_j²)` over the joints
    pub fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        check_size(self.nq, q0.len())?;
        check_size(self.nq, q1.len())?;
        let mut result = 0.0;
        for joint in &self.joints {
            let d = joint
                .operation
                .distance(&q0[joint.config_range()], &q1[joint.config_range()])?;
            result += d * d;
        }
        Ok(result.sqrt())
    }

    /// Sets the limits of joint `id`. Both slices span the joint's configuration only.
    /// Nothing is written unless both have the joint's size.
    pub fn set_bounds(&mut self, id: JointIndex, lower: &[f64], upper: &[f64]) -> Result<(), KinematicsError> {
        let joint = self.joints.get(id).ok_or(KinematicsError::ReferenceOutOfBound(id))?;
        check_size(joint.nq(), lower.len())?;
        check_size(joint.nq(), upper.len())?;
        joint.operation.set_bound(lower, &mut self.lower[joint.q.clone()])?;
        joint.operation.set_bound(upper, &mut self.upper[joint.q.clone()])
    }

    /// Sets the lower limit of coordinate `rank` of joint `id`
    pub fn set_lower_bound(&mut self, id: JointIndex, rank: usize, value: f64) -> Result<(), KinematicsError> {
        let index = self.coordinate(id, rank)?;
        self.lower[index] = value;
        Ok(())
    }

    /// Sets the upper limit of coordinate `rank` of joint `id`
    pub fn set_upper_bound(&mut self, id: JointIndex, rank: usize, value: f64) -> Result<(), KinematicsError> {
        let index = self.coordinate(id, rank)?;
        self.upper[index] = value;
        Ok(())
    }

    /// Removes the limits of coordinate `rank` of joint `id`
    pub fn unbound(&mut self, id: JointIndex, rank: usize) -> Result<(), KinematicsError> {
        let index = self.coordinate(id, rank)?;
        self.lower[index] = f64::NEG_INFINITY;
        self.upper[index] = f64::INFINITY;
        Ok(())
    }

    /// Whether coordinate `rank` of joint `id` has finite limits
    pub fn is_bounded(&self, id: JointIndex, rank: usize) -> Result<bool, KinematicsError> {
        let index = self.coordinate(id, rank)?;
        Ok(self.lower[index].is_finite() && self.upper[index].is_finite())
    }

    pub fn lower_bound(&self, id: JointIndex, rank: usize) -> Result<f64, KinematicsError> {
        Ok(self.lower[self.coordinate(id, rank)?])
    }

    pub fn upper_bound(&self, id: JointIndex, rank: usize) -> Result<f64, KinematicsError> {
        Ok(self.upper[self.coordinate(id, rank)?])
    }

    /// Lower limits of the whole configuration vector
    pub fn lower_limits(&self) -> &[f64] {
        &self.lower
    }

    /// Upper limits of the whole configuration vector
    pub fn upper_limits(&self) -> &[f64] {
        &self.upper
    }

    /// Whether every coordinate of `q` lies within the limits
    pub fn within_limits(&self, q: &[f64]) -> Result<bool, KinematicsError> {
        check_size(self.nq, q.len())?;
        Ok(izip!(q, &self.lower, &self.upper).all(|(x, lower, upper)| lower <= x && x <= upper))
    }

    /// Index of coordinate `rank` of joint `id` in the configuration vector
    fn coordinate(&self, id: JointIndex, rank: usize) -> Result<usize, KinematicsError> {
        let range = self.config_range(id)?;
        if rank < range.len() {
            Ok(range.start + rank)
        } else {
            Err(KinematicsError::ReferenceOutOfBound(rank))
        }
    }
}

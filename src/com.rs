/*! Center of mass and its Jacobian restricted to a selection of subtrees.
 *
 * Only the bodies of the tracked subtrees contribute to the center of mass. Subtrees are registered by
 * their root joint ([CenterOfMassComputation::add_subtree_root]) and must not overlap. The computation is a
 * backward accumulation over the depth-first ordered tree: the masses and mass-weighted positions of
 * the tracked bodies are propagated towards the universe, along every joint that carries them. Ancestors
 * shared by several subtrees are visited once.
 *
 * The Jacobian is stored in a flat column-major `Vec<f64>` (3 rows, one column per
 * degree of freedom) that backends can view without copying.
 */

use crate::{
    errors::check_size,
    forward::Forward,
    joint::Motion,
    tree::JointIndex,
    KinematicTree, KinematicsError,
};
use nalgebra::{Isometry3, Matrix3xX, Point3, Vector3};
use tracing::{debug, trace};
use tracing_attributes::instrument;

/// What [CenterOfMassComputation::compute] computes. The Jacobian always requires the center of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeSelection {
    Com,
    ComAndJacobian,
}

impl ComputeSelection {
    /// Bit requesting the center of mass
    pub const COM: u8 = 1;
    /// Bit requesting the Jacobian
    pub const JACOBIAN: u8 = 2;

    /// Converts a combination of [ComputeSelection::COM] and [ComputeSelection::JACOBIAN] flags.
    pub fn from_bits(bits: u8) -> Result<Self, KinematicsError> {
        match bits {
            Self::COM => Ok(ComputeSelection::Com),
            bits if bits == Self::COM | Self::JACOBIAN => Ok(ComputeSelection::ComAndJacobian),
            Self::JACOBIAN => Err(KinematicsError::InvalidComputeRequest(
                "the Jacobian cannot be computed without the center of mass".to_string(),
            )),
            bits => Err(KinematicsError::InvalidComputeRequest(format!(
                "unknown selection flags {bits:#04b}"
            ))),
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            ComputeSelection::Com => Self::COM,
            ComputeSelection::ComAndJacobian => Self::COM | Self::JACOBIAN,
        }
    }

    fn jacobian(&self) -> bool {
        *self == ComputeSelection::ComAndJacobian
    }
}

/// Stateful computation of the center of mass of a set of subtrees. Buffers are allocated once and
/// reused by every call to [CenterOfMassComputation::compute].
#[derive(Debug, Clone)]
pub struct CenterOfMassComputation<'a> {
    tree: &'a KinematicTree,
    /// Registered subtree roots, ascending
    roots: Vec<JointIndex>,
    /// Accumulated mass per joint
    mass: Vec<f64>,
    /// Accumulated mass-weighted position (first moment) per joint
    moment: Vec<Vector3<f64>>,
    /// Scratch for a joint's motion subspace
    subspace: Vec<Motion>,
    /// Column-major 3 × nv
    jacobian: Vec<f64>,
    com: Vector3<f64>,
}

impl<'a> CenterOfMassComputation<'a> {
    pub fn new(tree: &'a KinematicTree) -> Self {
        let max_nv = tree.joints().iter().map(|joint| joint.nv()).max().unwrap_or(0);
        Self {
            tree,
            roots: vec![],
            mass: vec![0.0; tree.len()],
            moment: vec![Vector3::zeros(); tree.len()],
            subspace: vec![Motion::zeros(); max_nv],
            jacobian: vec![0.0; 3 * tree.nv()],
            com: Vector3::zeros(),
        }
    }

    pub fn tree(&self) -> &KinematicTree {
        self.tree
    }

    /// Registers the subtree rooted at joint `id`.
    ///
    /// Fails with [KinematicsError::OverlappingSubtreeRoot] if the joint belongs to a registered subtree
    /// or if a registered root belongs to its subtree. The universe cannot be registered (use its
    /// children instead) and unknown indices are rejected with [KinematicsError::ReferenceOutOfBound].
    pub fn add_subtree_root(&mut self, id: JointIndex) -> Result<(), KinematicsError> {
        if id == 0 {
            return Err(KinematicsError::ReferenceOutOfBound(id));
        }
        let joint = self.tree.joint(id)?;
        for &root in &self.roots {
            let registered = self.tree.joint(root)?;
            if registered.contains(id) {
                return Err(KinematicsError::OverlappingSubtreeRoot {
                    joint: id,
                    name: joint.name().to_string(),
                    root,
                    last: registered.last_descendant(),
                });
            }
            if joint.contains(root) {
                return Err(KinematicsError::OverlappingSubtreeRoot {
                    joint: id,
                    name: joint.name().to_string(),
                    root,
                    last: registered.last_descendant(),
                });
            }
        }
        let position = self.roots.partition_point(|&root| root < id);
        self.roots.insert(position, id);
        debug!("Tracking subtree [{id}, {}] of joint {}", joint.last_descendant(), joint.name());
        Ok(())
    }

    /// Registered subtree roots in ascending order
    pub fn roots(&self) -> &[JointIndex] {
        &self.roots
    }

    /// Computes the center of mass (and its Jacobian) of the tracked subtrees for configuration `q`.
    /// `transforms` are the world transforms of the joint frames for `q` (see [Forward]).
    #[instrument(skip_all)]
    pub fn compute(
        &mut self,
        selection: ComputeSelection,
        q: &[f64],
        transforms: &[Isometry3<f64>],
    ) -> Result<(), KinematicsError> {
        check_size(self.tree.nq(), q.len())?;
        check_size(self.tree.len(), transforms.len())?;
        if self.roots.is_empty() {
            return Err(KinematicsError::InvalidComputeRequest(
                "no subtree root registered".to_string(),
            ));
        }

        // Mass and first moment of every body, in the world frame
        for (joint, transform) in self.tree.joints().iter().zip(transforms) {
            let inertia = joint.inertia();
            self.mass[joint.index()] = inertia.mass;
            self.moment[joint.index()] = inertia.mass * (transform * Point3::from(inertia.lever)).coords;
        }

        // Discard the bodies outside of the tracked subtrees
        let mut next = 0;
        for &root in &self.roots {
            self.mass[next..root].fill(0.0);
            self.moment[next..root].fill(Vector3::zeros());
            next = self.tree.subtree_last_descendant(root)? + 1;
        }
        self.mass[next..].fill(0.0);
        self.moment[next..].fill(Vector3::zeros());

        let jacobian = selection.jacobian();
        if jacobian {
            self.jacobian.fill(0.0);
        }

        // Backward accumulation, highest subtree first. The ancestors of a subtree are visited up to
        // (excluding) the previous root: older ancestors are shared with lower subtrees.
        for k in (0..self.roots.len()).rev() {
            let root = self.roots[k];
            let lower = if k == 0 { 0 } else { self.roots[k - 1] };
            let last = self.tree.subtree_last_descendant(root)?;
            for id in (root..=last).rev() {
                self.backward_step(id, q, transforms, jacobian)?;
            }
            let mut id = self.tree.parent_of(root)?;
            while id > lower {
                self.backward_step(id, q, transforms, jacobian)?;
                id = self.tree.parent_of(id)?;
            }
        }

        let total = self.mass[0];
        if total <= 0.0 {
            return Err(KinematicsError::InvalidComputeRequest(
                "the tracked subtrees have no mass".to_string(),
            ));
        }
        self.com = self.moment[0] / total;
        if jacobian {
            self.jacobian.iter_mut().for_each(|x| *x /= total);
        }
        trace!("Center of mass {:?} of mass {total}", self.com);
        Ok(())
    }

    /// Solves `forward` for `q` and computes the center of mass from its transforms.
    pub fn compute_forward<F: Forward>(
        &mut self,
        selection: ComputeSelection,
        forward: &mut F,
        q: &[f64],
    ) -> Result<(), KinematicsError> {
        forward.solve(self.tree, q)?;
        self.compute(selection, forward.configuration(), forward.transforms())
    }

    /// Writes the Jacobian columns of joint `id` and adds its accumulated mass and moment to the parent.
    fn backward_step(
        &mut self,
        id: JointIndex,
        q: &[f64],
        transforms: &[Isometry3<f64>],
        jacobian: bool,
    ) -> Result<(), KinematicsError> {
        let joint = self.tree.joint(id)?;
        let (mass, moment) = (self.mass[id], self.moment[id]);
        if jacobian {
            let subspace = &mut self.subspace[..joint.nv()];
            joint.motion_subspace(&q[joint.config_range()], subspace)?;
            for (column, motion) in joint.velocity_range().zip(subspace.iter()) {
                // the tracked points move with `linear + angular × p`
                let motion = motion.transformed(&transforms[id]);
                let value = mass * motion.linear - moment.cross(&motion.angular);
                self.jacobian[3 * column..3 * column + 3].copy_from_slice(value.as_slice());
            }
        }
        let parent = joint.parent();
        self.mass[parent] += mass;
        self.moment[parent] += moment;
        Ok(())
    }

    /// Center of mass of the tracked subtrees in the world frame
    pub fn com(&self) -> &Vector3<f64> {
        &self.com
    }

    /// Total mass of the tracked subtrees
    pub fn mass(&self) -> f64 {
        self.mass[0]
    }

    /// Tracked mass accumulated at joint `id` by the last computation
    pub fn subtree_mass(&self, id: JointIndex) -> Result<f64, KinematicsError> {
        self.mass.get(id).copied().ok_or(KinematicsError::ReferenceOutOfBound(id))
    }

    /// Flat (column-major) Jacobian of the center of mass. 3 rows, one column per degree of freedom.
    pub fn jacobian(&self) -> &[f64] {
        &self.jacobian
    }

    pub fn jacobian_matrix(&self) -> Matrix3xX<f64> {
        Matrix3xX::from_column_slice(&self.jacobian)
    }

    /// Dimensions of the Jacobian
    pub fn dims(&self) -> (usize, usize) {
        (3, self.tree.nv())
    }
}
